// src/db/history_repo.rs

use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};

use crate::common::fields::{push_value, Fields, SqlValue};
use crate::db::sql::{insert_into, push_assignments};
use crate::models::history::{HistorySpec, CONSECUTIVE};

// Historial e intervalos: filas hijas numeradas por padre.
#[derive(Clone)]
pub struct HistoryRepository {
    pool: PgPool,
}

impl HistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, spec: &HistorySpec, parent: &str) -> Result<Vec<Value>, sqlx::Error> {
        let sql = format!(
            "SELECT to_jsonb(t) FROM {} t WHERE t.{} = $1 ORDER BY t.{} DESC",
            spec.table, spec.parent, CONSECUTIVE
        );
        sqlx::query_scalar::<_, Value>(&sql)
            .bind(parent)
            .fetch_all(&self.pool)
            .await
    }

    /// MAX(consecutivo) + 1 dentro del padre; 1 si no hay filas.
    pub async fn next_consecutive(&self, spec: &HistorySpec, parent: &str) -> Result<i64, sqlx::Error> {
        let sql = format!(
            "SELECT (COALESCE(MAX({}), 0) + 1)::BIGINT FROM {} WHERE {} = $1",
            CONSECUTIVE, spec.table, spec.parent
        );
        sqlx::query_scalar::<_, i64>(&sql)
            .bind(parent)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn insert<'e, E>(&self, executor: E, spec: &HistorySpec, fields: Fields) -> Result<Value, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = insert_into(spec.table, fields);
        qb.push(" RETURNING to_jsonb(t)");
        qb.build_query_scalar::<Value>().fetch_one(executor).await
    }

    pub async fn update(
        &self,
        spec: &HistorySpec,
        parent: &str,
        consecutive: i64,
        fields: Fields,
    ) -> Result<Option<Value>, sqlx::Error> {
        let mut qb = QueryBuilder::new(format!("UPDATE {} AS t SET ", spec.table));
        push_assignments(&mut qb, fields);
        qb.push(format!(" WHERE t.{} = ", spec.parent));
        push_value(&mut qb, SqlValue::Text(parent.to_string()));
        qb.push(format!(" AND t.{} = ", CONSECUTIVE));
        qb.push_bind(consecutive);
        qb.push(" RETURNING to_jsonb(t)");
        qb.build_query_scalar::<Value>().fetch_optional(&self.pool).await
    }

    pub async fn delete_for_parent<'e, E>(&self, executor: E, spec: &HistorySpec, parent: &str) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("DELETE FROM {} WHERE {} = $1", spec.table, spec.parent);
        let result = sqlx::query(&sql).bind(parent).execute(executor).await?;
        Ok(result.rows_affected())
    }
}
