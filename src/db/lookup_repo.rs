use serde_json::Value;
use sqlx::PgPool;

// Tablas de referencia de solo lectura.
#[derive(Clone)]
pub struct LookupRepository {
    pool: PgPool,
}

impl LookupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Filas `{id, nombre}` de una tabla auxiliar. `table` siempre sale de una
    /// lista estática.
    pub async fn id_name_rows(&self, table: &str) -> Result<Vec<Value>, sqlx::Error> {
        let sql = format!("SELECT jsonb_build_object('id', id, 'nombre', nombre) FROM {table} ORDER BY nombre");
        sqlx::query_scalar::<_, Value>(&sql).fetch_all(&self.pool).await
    }

    pub async fn departments(&self) -> Result<Vec<Value>, sqlx::Error> {
        sqlx::query_scalar::<_, Value>(
            "SELECT jsonb_build_object('codigo', codigo, 'nombre', nombre) FROM departamentos ORDER BY nombre",
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn cities(&self, department: Option<&str>) -> Result<Vec<Value>, sqlx::Error> {
        sqlx::query_scalar::<_, Value>(
            r#"
            SELECT jsonb_build_object('codigo', codigo, 'nombre', nombre, 'codigo_departamento', codigo_departamento)
            FROM ciudades
            WHERE ($1::text IS NULL OR codigo_departamento = $1)
            ORDER BY nombre
            "#,
        )
        .bind(department)
        .fetch_all(&self.pool)
        .await
    }
}
