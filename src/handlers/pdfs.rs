// src/handlers/pdfs.rs
//
// PDFs en disco por código (equipos y material volumétrico).

use axum::{
    extract::{Multipart, Path, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{
    common::{
        error::AppError,
        upload::{Form, PDF_LIMIT},
    },
    config::AppState,
    middleware::{auth::MaybeUser, rbac::ensure_role},
    models::{audit::AuditAction, auth::ADMINS},
    services::pdf_storage::{PdfStore, PDF_MIME},
};

pub trait PdfBucket: Send + Sync + 'static {
    const MODULE: &'static str;
    fn store(state: &AppState) -> &PdfStore;
}

pub struct EquipmentPdfs;
impl PdfBucket for EquipmentPdfs {
    const MODULE: &'static str = "EQUIPOS";
    fn store(state: &AppState) -> &PdfStore {
        &state.equipment_pdfs
    }
}

pub struct VolumetricPdfs;
impl PdfBucket for VolumetricPdfs {
    const MODULE: &'static str = "VOLUMETRICOS";
    fn store(state: &AppState) -> &PdfStore {
        &state.volumetric_pdfs
    }
}

// GET /pdfs/{codigo}
pub async fn list<B: PdfBucket>(
    State(app_state): State<AppState>,
    Path(codigo): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let files = B::store(&app_state).list(&codigo).await?;
    Ok(Json(files))
}

// POST /pdfs/{codigo} (multipart `file` + `categoria`)
pub async fn upload<B: PdfBucket>(
    State(app_state): State<AppState>,
    user: MaybeUser,
    Path(codigo): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut form = Form::read(multipart, PDF_LIMIT).await?;
    let file = form
        .take_file("file")
        .ok_or_else(|| AppError::validation("No se recibió archivo"))?;
    let categoria = form.text("categoria").map(str::to_string);

    let stored = B::store(&app_state)
        .save(
            &codigo,
            file.file_name.as_deref(),
            categoria,
            file.content_type.clone(),
            &file.bytes,
        )
        .await?;

    app_state
        .audit
        .record(user.identity(), AuditAction::UploadPdf, B::MODULE)
        .await;
    Ok((StatusCode::CREATED, Json(stored)))
}

// GET /pdfs/download/{id}
pub async fn download<B: PdfBucket>(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let content = B::store(&app_state).read(&id).await?;
    Ok(([(CONTENT_TYPE, PDF_MIME)], content))
}

// DELETE /pdfs/{id}
pub async fn remove<B: PdfBucket>(
    State(app_state): State<AppState>,
    user: MaybeUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let actor = ensure_role(
        user.identity(),
        ADMINS,
        "No tienes permisos para eliminar archivos. Solo administradores.",
    )?;
    B::store(&app_state).remove(&id).await?;

    app_state
        .audit
        .record(Some(actor), AuditAction::DeletePdf, B::MODULE)
        .await;
    Ok(Json(json!({ "deleted": true, "message": "Archivo eliminado" })))
}
