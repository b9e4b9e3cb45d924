// src/db/resource_repo.rs

use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};

use crate::common::fields::{push_value, Fields, SqlValue};
use crate::common::pagination::Window;
use crate::db::sql::{insert_into, push_assignments, push_search};
use crate::models::resource::{Dependents, ResourceSpec};

// Repositorio genérico: cualquier tabla descrita por un `ResourceSpec`.
#[derive(Clone)]
pub struct ResourceRepository {
    pool: PgPool,
}

impl ResourceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        spec: &ResourceSpec,
        search: Option<&str>,
        window: Option<Window>,
    ) -> Result<Vec<Value>, sqlx::Error> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {} AS row FROM {} t",
            spec.row_json(true),
            spec.table
        ));
        push_search(&mut qb, spec.search, search);
        qb.push(" ORDER BY ").push(spec.order_by);
        if let Some(window) = window {
            qb.push(" LIMIT ").push_bind(window.limit);
            qb.push(" OFFSET ").push_bind(window.offset);
        }

        qb.build_query_scalar::<Value>().fetch_all(&self.pool).await
    }

    pub async fn count(&self, spec: &ResourceSpec, search: Option<&str>) -> Result<i64, sqlx::Error> {
        let mut qb = QueryBuilder::new(format!("SELECT COUNT(*) FROM {} t", spec.table));
        push_search(&mut qb, spec.search, search);
        qb.build_query_scalar::<i64>().fetch_one(&self.pool).await
    }

    pub async fn find<'e, E>(
        &self,
        executor: E,
        spec: &ResourceSpec,
        key: SqlValue,
    ) -> Result<Option<Value>, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {} AS row FROM {} t WHERE t.{} = ",
            spec.row_json(false),
            spec.table,
            spec.key.name
        ));
        push_value(&mut qb, key);
        qb.build_query_scalar::<Value>().fetch_optional(executor).await
    }

    /// Inserta y devuelve la fila guardada.
    pub async fn insert<'e, E>(&self, executor: E, spec: &ResourceSpec, fields: Fields) -> Result<Value, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = insert_into(spec.table, fields);
        qb.push(" RETURNING ").push(spec.row_json(false));
        qb.build_query_scalar::<Value>().fetch_one(executor).await
    }

    /// `None` cuando la llave no existe.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        spec: &ResourceSpec,
        key: SqlValue,
        fields: Fields,
    ) -> Result<Option<Value>, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::new(format!("UPDATE {} AS t SET ", spec.table));
        push_assignments(&mut qb, fields);
        qb.push(format!(" WHERE t.{} = ", spec.key.name));
        push_value(&mut qb, key);
        qb.push(" RETURNING ").push(spec.row_json(false));
        qb.build_query_scalar::<Value>().fetch_optional(executor).await
    }

    pub async fn delete<'e, E>(&self, executor: E, spec: &ResourceSpec, key: SqlValue) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::new(format!("DELETE FROM {} WHERE {} = ", spec.table, spec.key.name));
        push_value(&mut qb, key);
        let result = qb.build().execute(executor).await?;
        Ok(result.rows_affected())
    }

    pub async fn count_dependents(&self, dependents: &Dependents, key: SqlValue) -> Result<i64, sqlx::Error> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT COUNT(*) FROM {} WHERE {} = ",
            dependents.table, dependents.column
        ));
        push_value(&mut qb, key);
        qb.build_query_scalar::<i64>().fetch_one(&self.pool).await
    }

    /// MAX(column) + 1 de toda la tabla.
    pub async fn next_counter(&self, spec: &ResourceSpec, column: &str) -> Result<i64, sqlx::Error> {
        let sql = format!("SELECT (COALESCE(MAX({}), 0) + 1)::BIGINT FROM {}", column, spec.table);
        sqlx::query_scalar::<_, i64>(&sql).fetch_one(&self.pool).await
    }

    /// Existencias actuales, bloqueando la fila hasta el fin de la transacción.
    pub async fn lock_stock<'e, E>(
        &self,
        executor: E,
        spec: &ResourceSpec,
        column: &str,
        key: SqlValue,
    ) -> Result<Option<Decimal>, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::new(format!(
            "SELECT COALESCE({}, 0) FROM {} WHERE {} = ",
            column, spec.table, spec.key.name
        ));
        push_value(&mut qb, key);
        qb.push(" FOR UPDATE");
        qb.build_query_scalar::<Decimal>().fetch_optional(executor).await
    }

    /// Guarda las existencias y las devuelve tal como quedaron en la base.
    pub async fn set_stock<'e, E>(
        &self,
        executor: E,
        spec: &ResourceSpec,
        column: &str,
        key: SqlValue,
        quantity: Decimal,
    ) -> Result<Value, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::new(format!("UPDATE {} SET {} = ", spec.table, column));
        qb.push_bind(quantity);
        qb.push(format!(" WHERE {} = ", spec.key.name));
        push_value(&mut qb, key);
        qb.push(format!(" RETURNING to_jsonb({})", column));
        qb.build_query_scalar::<Value>().fetch_one(executor).await
    }

    /// `None`: la fila no existe. `Some(None)`: existe pero la columna está vacía.
    pub async fn blob(
        &self,
        spec: &ResourceSpec,
        column: &str,
        key: SqlValue,
    ) -> Result<Option<Option<Vec<u8>>>, sqlx::Error> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {} FROM {} WHERE {} = ",
            column, spec.table, spec.key.name
        ));
        push_value(&mut qb, key);
        qb.build_query_scalar::<Option<Vec<u8>>>()
            .fetch_optional(&self.pool)
            .await
    }
}
