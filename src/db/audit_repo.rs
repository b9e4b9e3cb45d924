// src/db/audit_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};

use crate::models::audit::{
    ActionLog, ActionLogFilter, ActionStat, ModuleStat, MovementFilter, MovementLog,
};

#[derive(Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

// Las fechas del filtro aceptan "AAAA-MM-DD"; el extremo superior es inclusivo.
fn parse_day(raw: Option<&String>) -> Option<NaiveDate> {
    raw.and_then(|s| NaiveDate::parse_from_str(s.trim().get(..10).unwrap_or(s.trim()), "%Y-%m-%d").ok())
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_action<'e, E>(
        &self,
        executor: E,
        user_id: i32,
        action: &str,
        module: &str,
    ) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("INSERT INTO logs_acciones (usuario_id, accion, modulo) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(action)
            .bind(module)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn insert_movement<'e, E>(
        &self,
        executor: E,
        product_type: &str,
        product_ref: &str,
        user_id: i32,
        kind: &str,
    ) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO movimientos_inventario (producto_tipo, producto_referencia, usuario_id, tipo_movimiento)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(product_type)
        .bind(product_ref)
        .bind(user_id)
        .bind(kind)
        .execute(executor)
        .await?;
        Ok(())
    }

    // ---
    // Consultas
    // ---

    fn push_action_filters(qb: &mut QueryBuilder<'static, Postgres>, filter: &ActionLogFilter) {
        qb.push(" WHERE TRUE");
        if let Some(modulo) = filter.modulo.clone().filter(|s| !s.is_empty()) {
            qb.push(" AND l.modulo = ").push_bind(modulo);
        }
        if let Some(accion) = filter.accion.clone().filter(|s| !s.is_empty()) {
            qb.push(" AND l.accion = ").push_bind(accion);
        }
        if let Some(user_id) = filter.usuario_id {
            qb.push(" AND l.usuario_id = ").push_bind(user_id);
        }
        if let Some(from) = parse_day(filter.fecha_desde.as_ref()) {
            qb.push(" AND l.fecha >= ").push_bind(from);
        }
        if let Some(to) = parse_day(filter.fecha_hasta.as_ref()) {
            qb.push(" AND l.fecha < (").push_bind(to).push("::date + 1)");
        }
    }

    pub async fn list_actions(
        &self,
        filter: &ActionLogFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ActionLog>, i64), sqlx::Error> {
        let mut qb = QueryBuilder::new(
            "SELECT l.id, l.usuario_id, l.accion, l.modulo, l.fecha, u.email AS usuario_email \
             FROM logs_acciones l LEFT JOIN usuarios u ON u.id_usuario = l.usuario_id",
        );
        Self::push_action_filters(&mut qb, filter);
        qb.push(" ORDER BY l.fecha DESC, l.id DESC LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(offset);
        let rows = qb.build_query_as::<ActionLog>().fetch_all(&self.pool).await?;

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM logs_acciones l");
        Self::push_action_filters(&mut count, filter);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        Ok((rows, total))
    }

    fn push_movement_filters(qb: &mut QueryBuilder<'static, Postgres>, filter: &MovementFilter) {
        qb.push(" WHERE TRUE");
        if let Some(product) = filter.producto_tipo.clone().filter(|s| !s.is_empty()) {
            qb.push(" AND mi.producto_tipo = ").push_bind(product);
        }
        if let Some(kind) = filter.tipo_movimiento.clone().filter(|s| !s.is_empty()) {
            qb.push(" AND mi.tipo_movimiento = ").push_bind(kind);
        }
        if let Some(from) = parse_day(filter.fecha_desde.as_ref()) {
            qb.push(" AND mi.fecha >= ").push_bind(from);
        }
        if let Some(to) = parse_day(filter.fecha_hasta.as_ref()) {
            qb.push(" AND mi.fecha < (").push_bind(to).push("::date + 1)");
        }
    }

    pub async fn list_movements(
        &self,
        filter: &MovementFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<MovementLog>, i64), sqlx::Error> {
        let mut qb = QueryBuilder::new(
            "SELECT mi.id_movimiento, mi.producto_tipo, mi.producto_referencia, mi.usuario_id, \
             mi.tipo_movimiento, mi.fecha, u.email AS usuario_email \
             FROM movimientos_inventario mi LEFT JOIN usuarios u ON u.id_usuario = mi.usuario_id",
        );
        Self::push_movement_filters(&mut qb, filter);
        qb.push(" ORDER BY mi.fecha DESC, mi.id_movimiento DESC LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(offset);
        let rows = qb.build_query_as::<MovementLog>().fetch_all(&self.pool).await?;

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM movimientos_inventario mi");
        Self::push_movement_filters(&mut count, filter);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        Ok((rows, total))
    }

    pub async fn module_stats(&self) -> Result<Vec<ModuleStat>, sqlx::Error> {
        sqlx::query_as::<_, ModuleStat>(
            r#"
            SELECT modulo, COUNT(*) AS cantidad, COUNT(DISTINCT usuario_id) AS usuarios_activos
            FROM logs_acciones
            WHERE fecha >= now() - INTERVAL '30 days'
            GROUP BY modulo
            ORDER BY cantidad DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn frequent_actions(&self) -> Result<Vec<ActionStat>, sqlx::Error> {
        sqlx::query_as::<_, ActionStat>(
            r#"
            SELECT accion, COUNT(*) AS cantidad
            FROM logs_acciones
            WHERE fecha >= now() - INTERVAL '7 days'
            GROUP BY accion
            ORDER BY cantidad DESC
            LIMIT 10
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_dates_accept_iso_prefixes() {
        let d = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(parse_day(Some(&"2024-05-01".to_string())), Some(d));
        assert_eq!(parse_day(Some(&"2024-05-01T10:00:00Z".to_string())), Some(d));
        assert_eq!(parse_day(Some(&"ayer".to_string())), None);
        assert_eq!(parse_day(None), None);
    }

    #[test]
    fn action_filters_only_bind_present_values() {
        let filter = ActionLogFilter {
            modulo: Some("INSUMOS".into()),
            accion: Some(String::new()),
            usuario_id: Some(3),
            ..Default::default()
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM logs_acciones l");
        AuditRepository::push_action_filters(&mut qb, &filter);
        assert_eq!(
            qb.sql(),
            "SELECT 1 FROM logs_acciones l WHERE TRUE AND l.modulo = $1 AND l.usuario_id = $2"
        );
    }
}
