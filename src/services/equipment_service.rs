// src/services/equipment_service.rs

use serde_json::{json, Value};
use sqlx::PgPool;

use crate::{
    common::{error::AppError, pagination::ListQuery},
    db::{EquipmentRepository, HistoryRepository},
    models::{
        audit::AuditAction,
        auth::Identity,
        equipment::{EQUIPMENT, EQUIPMENT_HISTORY, EQUIPMENT_INTERVAL},
    },
    services::audit_service::AuditRecorder,
};

#[derive(Clone)]
pub struct EquipmentService {
    repo: EquipmentRepository,
    history: HistoryRepository,
    audit: AuditRecorder,
    pool: PgPool,
}

impl EquipmentService {
    pub fn new(repo: EquipmentRepository, history: HistoryRepository, audit: AuditRecorder, pool: PgPool) -> Self {
        Self { repo, history, audit, pool }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Vec<Value>, AppError> {
        Ok(self.repo.list_with_sheet(query.search(), query.window()).await?)
    }

    pub async fn summary(&self, codigo: &str) -> Result<Value, AppError> {
        self.repo
            .summary(codigo)
            .await?
            .ok_or_else(|| AppError::not_found(EQUIPMENT.messages.not_found))
    }

    /// Borra historial, intervalos, ficha técnica y hoja de vida en una sola
    /// transacción, junto con la bitácora. Si el equipo no existe no se borra nada.
    pub async fn delete_cascade(&self, codigo: &str, actor: Option<&Identity>) -> Result<Value, AppError> {
        let mut tx = self.pool.begin().await?;

        self.history.delete_for_parent(&mut *tx, &EQUIPMENT_HISTORY, codigo).await?;
        self.history.delete_for_parent(&mut *tx, &EQUIPMENT_INTERVAL, codigo).await?;
        self.repo.delete_sheet(&mut *tx, codigo).await?;
        let deleted = self.repo.delete_equipment(&mut *tx, codigo).await?;

        if deleted == 0 {
            tx.rollback().await?;
            return Err(AppError::not_found(EQUIPMENT.messages.not_found));
        }

        self.audit
            .record_in(&mut *tx, actor, AuditAction::Delete, EQUIPMENT.module)
            .await?;
        tx.commit().await?;

        tracing::info!("Equipo {} eliminado con sus registros asociados", codigo);
        Ok(json!({ "deleted": true, "message": EQUIPMENT.messages.deleted }))
    }
}
