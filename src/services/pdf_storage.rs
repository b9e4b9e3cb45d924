// src/services/pdf_storage.rs
//
// PDFs en disco: `<raíz>/<codigo>/<millis>_<nombre>` más un
// `<archivo>.meta.json` al lado. Descargas y borrados buscan el archivo en
// todas las carpetas de código.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use utoipa::ToSchema;

use crate::common::error::AppError;

const META_SUFFIX: &str = ".meta.json";
pub const PDF_MIME: &str = "application/pdf";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PdfMeta {
    #[serde(rename = "originalName")]
    pub original_name: String,
    pub categoria: Option<String>,
    pub mime: String,
    pub size_bytes: u64,
    pub fecha_subida: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StoredPdfFile {
    pub id: String,
    pub nombre_archivo: String,
    pub url: String,
    pub categoria: Option<String>,
    pub size_bytes: u64,
    pub mime: String,
    pub fecha_subida: DateTime<Utc>,
}

/// Nombre seguro para disco: todo lo que no sea `[A-Za-z0-9_.-]` pasa a `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') { c } else { '_' })
        .collect()
}

/// Un único segmento de ruta, sin separadores ni `..`.
fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\', '\0'])
}

// "1712000000000_informe.pdf" -> "informe.pdf"
fn strip_timestamp(file_name: &str) -> &str {
    match file_name.split_once('_') {
        Some((prefix, rest)) if !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_digit()) => rest,
        _ => file_name,
    }
}

#[derive(Debug, Clone)]
pub struct PdfStore {
    root: PathBuf,
    url_prefix: String,
}

impl PdfStore {
    /// `url_prefix` es la ruta pública de descarga, p. ej. `/api/equipos/pdfs/download`.
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.into(),
        }
    }

    fn download_url(&self, id: &str) -> String {
        format!("{}/{}", self.url_prefix.trim_end_matches('/'), id)
    }

    async fn describe(&self, dir: &Path, id: &str) -> Result<StoredPdfFile, AppError> {
        let full = dir.join(id);
        let stat = fs::metadata(&full).await?;
        let meta = match fs::read_to_string(dir.join(format!("{id}{META_SUFFIX}"))).await {
            Ok(raw) => serde_json::from_str::<PdfMeta>(&raw).ok(),
            Err(_) => None,
        };
        let modified = stat.modified().map(DateTime::<Utc>::from).unwrap_or_else(|_| Utc::now());

        Ok(StoredPdfFile {
            id: id.to_string(),
            nombre_archivo: meta
                .as_ref()
                .map(|m| m.original_name.clone())
                .unwrap_or_else(|| strip_timestamp(id).to_string()),
            url: self.download_url(id),
            categoria: meta.as_ref().and_then(|m| m.categoria.clone()),
            size_bytes: stat.len(),
            mime: meta.map(|m| m.mime).unwrap_or_else(|| PDF_MIME.to_string()),
            fecha_subida: modified,
        })
    }

    /// Archivos de un código, del más antiguo al más reciente. Carpeta
    /// inexistente = lista vacía.
    pub async fn list(&self, codigo: &str) -> Result<Vec<StoredPdfFile>, AppError> {
        if !is_plain_segment(codigo) {
            return Ok(Vec::new());
        }
        let dir = self.root.join(codigo);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut items = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if name.starts_with('.') || name.ends_with(META_SUFFIX) {
                continue;
            }
            if !entry.file_type().await?.is_file() {
                continue;
            }
            items.push(self.describe(&dir, &name).await?);
        }
        items.sort_by_key(|item| item.fecha_subida);
        Ok(items)
    }

    pub async fn save(
        &self,
        codigo: &str,
        original_name: Option<&str>,
        categoria: Option<String>,
        mime: Option<String>,
        content: &[u8],
    ) -> Result<StoredPdfFile, AppError> {
        if !is_plain_segment(codigo) {
            return Err(AppError::validation("Código inválido"));
        }
        let dir = self.root.join(codigo);
        fs::create_dir_all(&dir).await?;

        let original = original_name.filter(|n| !n.trim().is_empty()).unwrap_or("archivo.pdf");
        let id = format!("{}_{}", Utc::now().timestamp_millis(), sanitize_file_name(original));
        fs::write(dir.join(&id), content).await?;

        let meta = PdfMeta {
            original_name: original.to_string(),
            categoria,
            mime: mime.unwrap_or_else(|| PDF_MIME.to_string()),
            size_bytes: content.len() as u64,
            fecha_subida: Utc::now(),
        };
        let meta_json = serde_json::to_string_pretty(&meta).map_err(anyhow::Error::from)?;
        if let Err(e) = fs::write(dir.join(format!("{id}{META_SUFFIX}")), meta_json).await {
            tracing::warn!("No se pudo escribir la metadata de {}: {}", id, e);
        }

        tracing::info!("PDF {} guardado para {}", id, codigo);
        self.describe(&dir, &id).await
    }

    // Busca el archivo en todas las carpetas de código.
    async fn locate(&self, id: &str) -> Result<Option<PathBuf>, AppError> {
        if !is_plain_segment(id) || id.ends_with(META_SUFFIX) {
            return Ok(None);
        }
        let mut dirs = match fs::read_dir(&self.root).await {
            Ok(dirs) => dirs,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        while let Some(dir) = dirs.next_entry().await? {
            let candidate = dir.path().join(id);
            if let Ok(stat) = fs::metadata(&candidate).await {
                if stat.is_file() {
                    return Ok(Some(candidate));
                }
            }
        }
        Ok(None)
    }

    pub async fn read(&self, id: &str) -> Result<Vec<u8>, AppError> {
        let path = self
            .locate(id)
            .await?
            .ok_or_else(|| AppError::not_found("Archivo no encontrado"))?;
        Ok(fs::read(path).await?)
    }

    pub async fn remove(&self, id: &str) -> Result<(), AppError> {
        let path = self
            .locate(id)
            .await?
            .ok_or_else(|| AppError::not_found("Archivo no encontrado"))?;
        fs::remove_file(&path).await?;

        let mut meta = path.into_os_string();
        meta.push(META_SUFFIX);
        if let Err(e) = fs::remove_file(&meta).await {
            tracing::warn!("No se pudo borrar la metadata de {}: {}", id, e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &tempfile::TempDir) -> PdfStore {
        PdfStore::new(dir.path(), "/api/equipos/pdfs/download")
    }

    #[test]
    fn names_are_sanitized() {
        assert_eq!(sanitize_file_name("informe final (1).pdf"), "informe_final__1_.pdf");
        assert_eq!(sanitize_file_name("../x.pdf"), ".._x.pdf");
        assert_eq!(strip_timestamp("1712_a_b.pdf"), "a_b.pdf");
        assert_eq!(strip_timestamp("sin_fecha.pdf"), "sin_fecha.pdf");
    }

    #[tokio::test]
    async fn save_list_read_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        let saved = store
            .save("EQ-1", Some("certificado 2024.pdf"), Some("calibracion".into()), None, b"%PDF-1.4 x")
            .await
            .unwrap();
        assert!(saved.id.ends_with("_certificado_2024.pdf"));
        assert_eq!(saved.nombre_archivo, "certificado 2024.pdf");
        assert_eq!(saved.url, format!("/api/equipos/pdfs/download/{}", saved.id));
        assert_eq!(saved.size_bytes, 10);

        let listed = store.list("EQ-1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].categoria.as_deref(), Some("calibracion"));

        assert_eq!(store.read(&saved.id).await.unwrap(), b"%PDF-1.4 x");

        store.remove(&saved.id).await.unwrap();
        assert!(store.list("EQ-1").await.unwrap().is_empty());
        assert!(matches!(store.read(&saved.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn remove_succeeds_without_metadata_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let saved = store.save("EQ-2", Some("b.pdf"), None, None, b"%PDF").await.unwrap();

        let meta = dir.path().join("EQ-2").join(format!("{}{META_SUFFIX}", saved.id));
        fs::remove_file(&meta).await.unwrap();

        store.remove(&saved.id).await.unwrap();
        assert!(!dir.path().join("EQ-2").join(&saved.id).exists());
        assert!(store.list("EQ-2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_codes_list_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store(&dir).list("NO-EXISTE").await.unwrap().is_empty());
        assert!(store(&dir).list("..").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ids_with_separators_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        store.save("EQ-1", Some("a.pdf"), None, None, b"%PDF").await.unwrap();

        for id in ["../EQ-1", "EQ-1/a.pdf", "..", ""] {
            assert!(matches!(store.read(id).await, Err(AppError::NotFound(_))), "{id}");
        }
    }
}
