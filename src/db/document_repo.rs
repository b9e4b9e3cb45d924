// src/db/document_repo.rs
//
// PDFs de reactivos guardados en la base, uno por lote y tipo de documento.

use sqlx::PgPool;

use crate::models::reagents::ReagentDocument;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredPdf {
    pub lote: String,
    pub nombre_archivo: String,
    pub contenido: Vec<u8>,
}

#[derive(Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert(
        &self,
        doc: ReagentDocument,
        lote: &str,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<(), sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO {} (lote, nombre_archivo, contenido, fecha_subida)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (lote) DO UPDATE
            SET nombre_archivo = EXCLUDED.nombre_archivo,
                contenido = EXCLUDED.contenido,
                fecha_subida = now()
            "#,
            doc.table()
        );
        sqlx::query(&sql)
            .bind(lote)
            .bind(file_name)
            .bind(content)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn exists(&self, doc: ReagentDocument, lote: &str) -> Result<bool, sqlx::Error> {
        let sql = format!("SELECT EXISTS (SELECT 1 FROM {} WHERE lote = $1)", doc.table());
        sqlx::query_scalar::<_, bool>(&sql).bind(lote).fetch_one(&self.pool).await
    }

    pub async fn get(&self, doc: ReagentDocument, lote: &str) -> Result<Option<StoredPdf>, sqlx::Error> {
        let sql = format!(
            "SELECT lote, nombre_archivo, contenido FROM {} WHERE lote = $1",
            doc.table()
        );
        sqlx::query_as::<_, StoredPdf>(&sql)
            .bind(lote)
            .fetch_optional(&self.pool)
            .await
    }

    /// Documento más reciente entre todos los lotes de un código de catálogo.
    pub async fn latest_for_code(&self, doc: ReagentDocument, codigo: &str) -> Result<Option<StoredPdf>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT d.lote, d.nombre_archivo, d.contenido
            FROM {} d
            JOIN reactivos r ON r.lote = d.lote
            WHERE r.codigo = $1
            ORDER BY d.fecha_subida DESC
            LIMIT 1
            "#,
            doc.table()
        );
        sqlx::query_as::<_, StoredPdf>(&sql)
            .bind(codigo)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn delete(&self, doc: ReagentDocument, lote: &str) -> Result<u64, sqlx::Error> {
        let sql = format!("DELETE FROM {} WHERE lote = $1", doc.table());
        let result = sqlx::query(&sql).bind(lote).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
