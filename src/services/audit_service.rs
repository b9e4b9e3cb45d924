// src/services/audit_service.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::{error::AppError, pagination::PageInfo},
    db::AuditRepository,
    models::{
        audit::{
            ActionLog, ActionLogFilter, AuditAction, LogPage, LogStats, MovementFilter, MovementKind,
            MovementLog,
        },
        auth::Identity,
    },
};

// Bitácora de acciones y movimientos de inventario.
//
// `record` y `record_movement` son de mejor esfuerzo: corren después de la
// mutación principal y un fallo solo queda en el log del servidor. Sin
// identidad no se registra nada. `record_in` forma parte de la transacción
// del llamador y sí propaga el error.
#[derive(Clone)]
pub struct AuditRecorder {
    repo: AuditRepository,
    pool: sqlx::PgPool,
}

impl AuditRecorder {
    pub fn new(repo: AuditRepository, pool: sqlx::PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn record(&self, actor: Option<&Identity>, action: AuditAction, module: &str) {
        let Some(actor) = actor else {
            return;
        };
        if let Err(e) = self
            .repo
            .insert_action(&self.pool, actor.id, action.as_str(), module)
            .await
        {
            tracing::warn!(
                "No se pudo registrar la acción {} en {} (usuario {}): {}",
                action.as_str(),
                module,
                actor.id,
                e
            );
        }
    }

    pub async fn record_movement(
        &self,
        actor: Option<&Identity>,
        product_type: &str,
        product_ref: &str,
        kind: MovementKind,
    ) {
        let Some(actor) = actor else {
            return;
        };
        if let Err(e) = self
            .repo
            .insert_movement(&self.pool, product_type, product_ref, actor.id, kind.as_str())
            .await
        {
            tracing::warn!(
                "No se pudo registrar el movimiento {} de {} {}: {}",
                kind.as_str(),
                product_type,
                product_ref,
                e
            );
        }
    }

    pub async fn record_in<'e, E>(
        &self,
        executor: E,
        actor: Option<&Identity>,
        action: AuditAction,
        module: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if let Some(actor) = actor {
            self.repo
                .insert_action(executor, actor.id, action.as_str(), module)
                .await?;
        }
        Ok(())
    }

    // ---
    // Consultas
    // ---

    pub async fn actions(&self, filter: ActionLogFilter) -> Result<LogPage<ActionLog>, AppError> {
        let window = PageInfo::new(filter.page, filter.limit, 0);
        let (data, total) = self.repo.list_actions(&filter, window.limit, window.offset()).await?;
        Ok(LogPage {
            success: true,
            data,
            pagination: PageInfo::new(filter.page, filter.limit, total),
        })
    }

    pub async fn movements(&self, filter: MovementFilter) -> Result<LogPage<MovementLog>, AppError> {
        let window = PageInfo::new(filter.page, filter.limit, 0);
        let (data, total) = self
            .repo
            .list_movements(&filter, window.limit, window.offset())
            .await?;
        Ok(LogPage {
            success: true,
            data,
            pagination: PageInfo::new(filter.page, filter.limit, total),
        })
    }

    pub async fn stats(&self) -> Result<LogStats, AppError> {
        let (estadisticas, acciones_frecuentes) =
            tokio::try_join!(self.repo.module_stats(), self.repo.frequent_actions())?;
        Ok(LogStats {
            estadisticas,
            acciones_frecuentes,
        })
    }
}
