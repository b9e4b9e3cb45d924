// src/db/request_repo.rs

use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};

use crate::common::fields::{Fields, SqlValue};
use crate::common::pagination::like_pattern;
use crate::db::sql::{insert_into, push_assignments};
use crate::models::requests::FollowUpSpec;

#[derive(Clone)]
pub struct RequestRepository {
    pool: PgPool,
}

const CLIENT_JSON: &str = "jsonb_build_object('nombre_solicitante', c.nombre_solicitante, \
                           'correo_electronico', c.correo_electronico)";

// Solicitud + oferta + revisión + seguimiento. Las columnas de la derecha pisan
// a las de la izquierda.
const DETAIL_SELECT: &str = r#"
    SELECT to_jsonb(s)
        || jsonb_build_object('nombre_solicitante', c.nombre_solicitante, 'correo_electronico', c.correo_electronico)
        || COALESCE(to_jsonb(o) - 'id_solicitud', '{}'::jsonb)
        || COALESCE(to_jsonb(r) - 'id_solicitud', '{}'::jsonb)
        || COALESCE(to_jsonb(e) - 'id_solicitud', '{}'::jsonb)
    FROM solicitudes s
    LEFT JOIN clientes c ON c.id_cliente = s.id_cliente
    LEFT JOIN oferta o ON o.id_solicitud = s.solicitud_id
    LEFT JOIN revision_oferta r ON r.id_solicitud = s.solicitud_id
    LEFT JOIN seguimiento_encuesta e ON e.id_solicitud = s.solicitud_id
"#;

impl RequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, search: Option<&str>, limit: i64) -> Result<Vec<Value>, sqlx::Error> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT to_jsonb(s) || {CLIENT_JSON} FROM solicitudes s \
             LEFT JOIN clientes c ON c.id_cliente = s.id_cliente"
        ));
        if let Some(term) = search {
            let pattern = like_pattern(term);
            qb.push(" WHERE (s.nombre_muestra ILIKE ").push_bind(pattern.clone());
            qb.push(" OR s.tipo_solicitud ILIKE ").push_bind(pattern.clone());
            qb.push(" OR c.nombre_solicitante ILIKE ").push_bind(pattern);
            qb.push(")");
        }
        qb.push(" ORDER BY s.solicitud_id DESC LIMIT ").push_bind(limit);
        qb.build_query_scalar::<Value>().fetch_all(&self.pool).await
    }

    pub async fn find(&self, id: i64) -> Result<Option<Value>, sqlx::Error> {
        let sql = format!(
            "SELECT to_jsonb(s) || {CLIENT_JSON} FROM solicitudes s \
             LEFT JOIN clientes c ON c.id_cliente = s.id_cliente WHERE s.solicitud_id = $1"
        );
        sqlx::query_scalar::<_, Value>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn detail_list(&self, limit: i64) -> Result<Vec<Value>, sqlx::Error> {
        let sql = format!("{DETAIL_SELECT} ORDER BY s.solicitud_id DESC LIMIT $1");
        sqlx::query_scalar::<_, Value>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn detail(&self, id: i64) -> Result<Option<Value>, sqlx::Error> {
        let sql = format!("{DETAIL_SELECT} WHERE s.solicitud_id = $1");
        sqlx::query_scalar::<_, Value>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Una fila por solicitud: inserta o reemplaza todas las columnas.
    pub async fn upsert_follow_up(&self, spec: &FollowUpSpec, id_solicitud: i64, fields: Fields) -> Result<(), sqlx::Error> {
        let names: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();
        let mut all = Fields::new();
        all.set("id_solicitud", SqlValue::Integer(id_solicitud));
        for (name, value) in fields.into_inner() {
            all.set(name, value);
        }

        let mut qb = insert_into(spec.table, all);
        qb.push(" ON CONFLICT (id_solicitud) DO ");
        if names.is_empty() {
            qb.push("NOTHING");
        } else {
            qb.push("UPDATE SET ");
            for (i, name) in names.iter().enumerate() {
                if i > 0 {
                    qb.push(", ");
                }
                qb.push(format!("{name} = EXCLUDED.{name}"));
            }
        }
        qb.build().execute(&self.pool).await?;
        Ok(())
    }

    pub async fn request_exists(&self, id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM solicitudes WHERE solicitud_id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn insert_survey<'e, E>(&self, executor: E, fields: Fields) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        insert_into("resultados_encuestas", fields).build().execute(executor).await?;
        Ok(())
    }

    /// Actualiza las banderas de encuesta de la solicitud. Filas afectadas.
    pub async fn set_survey_flags<'e, E>(&self, executor: E, id: i64, flags: Fields) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE solicitudes SET ");
        push_assignments(&mut qb, flags);
        qb.push(" WHERE solicitud_id = ").push_bind(id);
        let result = qb.build().execute(executor).await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_joins_every_follow_up_table() {
        for table in ["oferta o", "revision_oferta r", "seguimiento_encuesta e", "clientes c"] {
            assert!(DETAIL_SELECT.contains(table), "falta {table}");
        }
    }
}
