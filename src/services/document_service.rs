// src/services/document_service.rs
//
// Hojas de seguridad y certificados de análisis de reactivos: un PDF por
// lote, guardado en la base.

use serde_json::{json, Value};

use crate::{
    common::{
        db_utils::{constraint_violation, ConstraintKind},
        error::AppError,
        upload::{UploadedFile, PDF_LIMIT},
    },
    db::{document_repo::StoredPdf, DocumentRepository},
    models::{
        audit::AuditAction,
        auth::Identity,
        reagents::{ReagentDocument, REAGENTS},
    },
    services::audit_service::AuditRecorder,
};

const INVALID_PDF: &str = "Archivo no es un PDF válido";

/// Archivo aceptable como documento de reactivo.
pub fn check_pdf(file: Option<&UploadedFile>) -> Result<&UploadedFile, AppError> {
    let file = file.ok_or_else(|| AppError::validation("Archivo requerido"))?;
    if file.len() > PDF_LIMIT {
        return Err(AppError::validation("El archivo supera el máximo de 25 MB"));
    }
    if !file.is_pdf() {
        return Err(AppError::validation(INVALID_PDF));
    }
    Ok(file)
}

#[derive(Clone)]
pub struct DocumentService {
    repo: DocumentRepository,
    audit: AuditRecorder,
}

impl DocumentService {
    pub fn new(repo: DocumentRepository, audit: AuditRecorder) -> Self {
        Self { repo, audit }
    }

    pub async fn locate(&self, doc: ReagentDocument, lote: &str) -> Result<Value, AppError> {
        if !self.repo.exists(doc, lote).await? {
            return Err(AppError::not_found(doc.not_found()));
        }
        Ok(json!({ "url": doc.view_url(lote) }))
    }

    pub async fn locate_by_code(&self, doc: ReagentDocument, codigo: &str) -> Result<Value, AppError> {
        match self.repo.latest_for_code(doc, codigo).await? {
            Some(_) => Ok(json!({ "url": doc.catalog_view_url(codigo) })),
            None => Err(AppError::not_found(doc.not_found())),
        }
    }

    pub async fn content(&self, doc: ReagentDocument, lote: &str) -> Result<StoredPdf, AppError> {
        self.repo
            .get(doc, lote)
            .await?
            .ok_or_else(|| AppError::not_found("PDF no encontrado"))
    }

    pub async fn content_by_code(&self, doc: ReagentDocument, codigo: &str) -> Result<StoredPdf, AppError> {
        self.repo
            .latest_for_code(doc, codigo)
            .await?
            .ok_or_else(|| AppError::not_found("PDF no encontrado"))
    }

    /// Inserta o reemplaza el PDF del lote. El lote debe existir.
    pub async fn upload(
        &self,
        doc: ReagentDocument,
        lote: &str,
        file: Option<UploadedFile>,
        actor: Option<&Identity>,
    ) -> Result<Value, AppError> {
        let file = check_pdf(file.as_ref())?;
        let file_name = file
            .file_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("{}.pdf", doc.table()));

        self.repo
            .upsert(doc, lote, &file_name, file.bytes.clone())
            .await
            .map_err(|e| match constraint_violation(&e) {
                Some(ConstraintKind::ForeignKey) => AppError::not_found(REAGENTS.not_found(lote)),
                _ => e.into(),
            })?;

        self.audit.record(actor, AuditAction::UploadPdf, REAGENTS.module).await;
        tracing::info!("{} del lote {} guardado ({} bytes)", doc.slug(), lote, file.len());
        Ok(json!({ "url": doc.view_url(lote) }))
    }

    /// El rol ya fue verificado por el llamador.
    pub async fn delete(&self, doc: ReagentDocument, lote: &str, actor: Option<&Identity>) -> Result<Value, AppError> {
        if self.repo.delete(doc, lote).await? == 0 {
            return Err(AppError::not_found(doc.not_found()));
        }
        self.audit.record(actor, AuditAction::DeletePdf, REAGENTS.module).await;
        Ok(json!({ "deleted": true, "message": "Documento eliminado" }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(bytes: &[u8]) -> UploadedFile {
        UploadedFile {
            file_name: Some("hoja.pdf".into()),
            content_type: Some("application/pdf".into()),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn missing_file_is_required() {
        assert_eq!(check_pdf(None).unwrap_err().to_string(), "Archivo requerido");
    }

    #[test]
    fn content_must_be_a_pdf() {
        assert!(check_pdf(Some(&upload(b"%PDF-1.4"))).is_ok());
        assert_eq!(check_pdf(Some(&upload(b"<html>"))).unwrap_err().to_string(), INVALID_PDF);
    }

    #[test]
    fn oversized_pdf_is_rejected() {
        let mut big = b"%PDF".to_vec();
        big.resize(PDF_LIMIT + 1, 0);
        assert!(matches!(check_pdf(Some(&upload(&big))), Err(AppError::Validation(_))));
    }
}
