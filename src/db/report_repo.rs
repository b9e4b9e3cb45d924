// src/db/report_repo.rs

use chrono::NaiveDate;
use serde_json::Value;
use sqlx::{PgPool, QueryBuilder};

use crate::models::reports::DashboardMetrics;

#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

// Inventario con existencias. Equipos y materiales volumétricos cuentan 1 cada uno.
const INVENTORY_SQL: &str = r#"
    SELECT to_jsonb(inv) FROM (
        SELECT 'INSUMO' AS tipo_producto, id::text AS id_producto, nombre,
               cantidad_existente AS cantidad, presentacion, marca, referencia,
               fecha_adquisicion, ubicacion, NULL::date AS fecha_vencimiento
        FROM insumos
        WHERE cantidad_existente > 0

        UNION ALL

        SELECT 'REACTIVO', lote, nombre,
               cantidad_total, concat_ws(' ', presentacion::text, presentacion_cant::text), marca, referencia,
               fecha_adquisicion, NULL, fecha_vencimiento
        FROM reactivos
        WHERE cantidad_total > 0

        UNION ALL

        SELECT 'PAPELERIA', id::text, nombre,
               cantidad_existente, presentacion, marca, NULL,
               fecha_adquisicion, ubicacion, NULL
        FROM papeleria
        WHERE cantidad_existente > 0

        UNION ALL

        SELECT 'MATERIAL_VOLUMETRICO', codigo_id, nombre_material,
               1, volumen_nominal, marca, modelo,
               NULL, NULL, NULL
        FROM material_volumetrico

        UNION ALL

        SELECT 'EQUIPO', codigo_identificacion, nombre,
               1, modelo, marca, numero_serie,
               fecha_adquisicion, ubicacion, NULL
        FROM hv_equipos
    ) inv
    ORDER BY inv.tipo_producto, inv.nombre
"#;

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn count(&self, sql: &'static str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(sql).fetch_one(&self.pool).await
    }

    /// Los cinco conteos corren en paralelo.
    pub async fn dashboard_metrics(&self) -> Result<DashboardMetrics, sqlx::Error> {
        let (total_insumos, total_reactivos, total_solicitudes, total_clientes, total_papeleria) = tokio::try_join!(
            self.count("SELECT COUNT(*) FROM insumos"),
            self.count("SELECT COUNT(*) FROM reactivos"),
            self.count("SELECT COUNT(*) FROM solicitudes"),
            self.count("SELECT COUNT(*) FROM clientes WHERE activo"),
            self.count("SELECT COUNT(*) FROM papeleria"),
        )?;

        Ok(DashboardMetrics {
            total_insumos,
            total_reactivos,
            total_solicitudes,
            total_clientes,
            total_papeleria,
        })
    }

    pub async fn reagents_expiring_within(&self, days: i32) -> Result<Vec<Value>, sqlx::Error> {
        sqlx::query_scalar::<_, Value>(
            r#"
            SELECT jsonb_build_object('lote', lote, 'codigo', codigo, 'nombre', nombre,
                                      'fecha_vencimiento', fecha_vencimiento)
            FROM reactivos
            WHERE fecha_vencimiento BETWEEN CURRENT_DATE AND CURRENT_DATE + $1
            ORDER BY fecha_vencimiento ASC
            "#,
        )
        .bind(days)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn inventory(&self) -> Result<Vec<Value>, sqlx::Error> {
        sqlx::query_scalar::<_, Value>(INVENTORY_SQL).fetch_all(&self.pool).await
    }

    /// Movimientos de un tipo, opcionalmente dentro de un rango de días inclusivo.
    pub async fn movements(
        &self,
        kind: &'static str,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<Value>, sqlx::Error> {
        let mut qb = QueryBuilder::new(
            "SELECT jsonb_build_object('id_movimiento', id_movimiento, 'producto_tipo', producto_tipo, \
             'producto_referencia', producto_referencia, 'usuario_id', usuario_id, 'fecha', fecha, \
             'tipo_movimiento', tipo_movimiento) \
             FROM movimientos_inventario WHERE tipo_movimiento = ",
        );
        qb.push_bind(kind);
        if let Some((from, to)) = range {
            qb.push(" AND fecha::date BETWEEN ").push_bind(from);
            qb.push(" AND ").push_bind(to);
        }
        qb.push(" ORDER BY fecha DESC");
        qb.build_query_scalar::<Value>().fetch_all(&self.pool).await
    }

    pub async fn expirations(&self, days: i32) -> Result<Vec<Value>, sqlx::Error> {
        sqlx::query_scalar::<_, Value>(
            r#"
            SELECT jsonb_build_object(
                'id_producto', lote, 'codigo', codigo, 'nombre', nombre, 'marca', marca,
                'referencia', referencia, 'presentacion', presentacion,
                'presentacion_cant', presentacion_cant, 'cantidad_total', cantidad_total,
                'fecha_adquisicion', fecha_adquisicion, 'fecha_vencimiento', fecha_vencimiento,
                'dias_restantes', fecha_vencimiento - CURRENT_DATE)
            FROM reactivos
            WHERE fecha_vencimiento IS NOT NULL
              AND fecha_vencimiento >= CURRENT_DATE
              AND fecha_vencimiento <= CURRENT_DATE + $1
              AND cantidad_total > 0
            ORDER BY fecha_vencimiento ASC
            "#,
        )
        .bind(days)
        .fetch_all(&self.pool)
        .await
    }
}
