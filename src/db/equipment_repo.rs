// src/db/equipment_repo.rs

use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};

use crate::common::pagination::Window;
use crate::db::sql::push_search;
use crate::models::equipment::SUMMARY_COLUMNS;

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: PgPool,
}

impl EquipmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Hojas de vida con su ficha técnica (sin la firma). Los campos de la hoja
    /// de vida tienen prioridad sobre los de la ficha.
    pub async fn list_with_sheet(
        &self,
        search: Option<&str>,
        window: Option<Window>,
    ) -> Result<Vec<Value>, sqlx::Error> {
        let mut qb = QueryBuilder::new(
            "SELECT COALESCE(to_jsonb(ft) - 'cargo_y_firma', '{}'::jsonb) || to_jsonb(hv) \
             FROM hv_equipos hv \
             LEFT JOIN ficha_tecnica_de_equipos ft ON ft.codigo_identificador = hv.codigo_identificacion",
        );
        push_search(
            &mut qb,
            &["hv.codigo_identificacion", "hv.nombre", "hv.marca"],
            search,
        );
        qb.push(" ORDER BY hv.codigo_identificacion");
        if let Some(window) = window {
            qb.push(" LIMIT ").push_bind(window.limit);
            qb.push(" OFFSET ").push_bind(window.offset);
        }
        qb.build_query_scalar::<Value>().fetch_all(&self.pool).await
    }

    pub async fn summary(&self, codigo: &str) -> Result<Option<Value>, sqlx::Error> {
        let pairs: Vec<String> = SUMMARY_COLUMNS.iter().map(|c| format!("'{c}', {c}")).collect();
        let sql = format!(
            "SELECT jsonb_build_object({}) FROM hv_equipos WHERE codigo_identificacion = $1",
            pairs.join(", ")
        );
        sqlx::query_scalar::<_, Value>(&sql)
            .bind(codigo)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn delete_sheet<'e, E>(&self, executor: E, codigo: &str) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM ficha_tecnica_de_equipos WHERE codigo_identificador = $1")
            .bind(codigo)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_equipment<'e, E>(&self, executor: E, codigo: &str) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM hv_equipos WHERE codigo_identificacion = $1")
            .bind(codigo)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
