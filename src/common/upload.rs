// src/common/upload.rs
//
// Lectura de formularios multipart: archivos en memoria y campos de texto.

use axum::extract::Multipart;
use serde_json::{Map, Value};

use crate::common::error::AppError;

pub const MIB: usize = 1024 * 1024;
pub const PDF_LIMIT: usize = 25 * MIB;
pub const IMAGE_LIMIT: usize = 5 * MIB;

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Tipo o nombre dicen PDF y el contenido empieza con `%PDF`.
    pub fn is_pdf(&self) -> bool {
        let declared = self
            .content_type
            .as_deref()
            .is_some_and(|m| m.to_ascii_lowercase().contains("pdf"))
            || self
                .file_name
                .as_deref()
                .is_some_and(|n| n.to_ascii_lowercase().ends_with(".pdf"));
        declared && self.bytes.starts_with(b"%PDF")
    }
}

#[derive(Debug, Default)]
pub struct Form {
    files: Vec<(String, UploadedFile)>,
    texts: Map<String, Value>,
}

impl Form {
    /// Consume el multipart completo. Cada archivo se limita a `limit` bytes:
    /// pasarse es un 413.
    pub async fn read(mut multipart: Multipart, limit: usize) -> Result<Self, AppError> {
        let mut form = Form::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            if field.file_name().is_some() {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                if bytes.len() > limit {
                    return Err(AppError::PayloadTooLarge(format!(
                        "El archivo supera el máximo de {} MB",
                        limit / MIB
                    )));
                }
                form.files.push((
                    name,
                    UploadedFile {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    },
                ));
            } else {
                let text = field.text().await?;
                form.texts.insert(name, Value::String(text));
            }
        }

        Ok(form)
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        let index = self.files.iter().position(|(n, f)| n == name && !f.is_empty())?;
        Some(self.files.remove(index).1)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts
            .get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Campos de texto como cuerpo JSON, para pasar por `Fields::from_body`.
    pub fn body(&self) -> Value {
        Value::Object(self.texts.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, mime: &str, bytes: &[u8]) -> UploadedFile {
        UploadedFile {
            file_name: Some(name.into()),
            content_type: Some(mime.into()),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn pdf_needs_declaration_and_magic() {
        assert!(file("a.pdf", "application/octet-stream", b"%PDF-1.7").is_pdf());
        assert!(file("a.bin", "application/pdf", b"%PDF-1.7").is_pdf());
        assert!(!file("a.pdf", "application/pdf", b"PK\x03\x04").is_pdf());
        assert!(!file("a.txt", "text/plain", b"%PDF-1.7").is_pdf());
    }

    #[test]
    fn blank_texts_are_absent() {
        let mut form = Form::default();
        form.texts.insert("categoria".into(), Value::String("  ".into()));
        form.texts.insert("nombre".into(), Value::String(" Guantes ".into()));
        assert_eq!(form.text("categoria"), None);
        assert_eq!(form.text("nombre"), Some("Guantes"));
        assert_eq!(form.body()["nombre"], " Guantes ");
    }
}
