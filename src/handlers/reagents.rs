// src/handlers/reagents.rs

use axum::{
    extract::{Multipart, Path, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        StatusCode,
    },
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{Map, Value};

use crate::{
    common::{
        error::AppError,
        upload::{Form, PDF_LIMIT},
    },
    config::AppState,
    db::document_repo::StoredPdf,
    handlers::resource,
    middleware::{auth::{auth_guard, MaybeUser}, rbac::ensure_role},
    models::{
        auth::ADMINS,
        reagents::{ReagentCatalog, ReagentDocument, Reagents, LOOKUP_TABLES},
    },
    services::pdf_storage::{sanitize_file_name, PDF_MIME},
};

// ---
// Tipo de documento como parámetro de tipo de los handlers
// ---

pub trait DocumentKind: Send + Sync + 'static {
    const DOC: ReagentDocument;
}

pub struct SafetySheet;
impl DocumentKind for SafetySheet {
    const DOC: ReagentDocument = ReagentDocument::SafetySheet;
}

pub struct AnalysisCertificate;
impl DocumentKind for AnalysisCertificate {
    const DOC: ReagentDocument = ReagentDocument::AnalysisCertificate;
}

pub fn router(state: AppState) -> Router<AppState> {
    let reads = Router::new()
        .route("/aux", get(lookups))
        .route("/catalogo", get(resource::list::<ReagentCatalog>))
        .route("/catalogo/{codigo}", get(resource::get_one::<ReagentCatalog>))
        .route("/catalogo/{codigo}/hoja-seguridad", get(locate_by_code::<SafetySheet>))
        .route("/catalogo/{codigo}/hoja-seguridad/view", get(view_by_code::<SafetySheet>))
        .route("/catalogo/{codigo}/cert-analisis", get(locate_by_code::<AnalysisCertificate>))
        .route("/catalogo/{codigo}/cert-analisis/view", get(view_by_code::<AnalysisCertificate>))
        .route("/", get(resource::list::<Reagents>))
        .route("/total", get(resource::total::<Reagents>))
        .route("/{lote}", get(resource::get_one::<Reagents>))
        .route("/{lote}/hoja-seguridad", get(locate::<SafetySheet>))
        .route("/{lote}/hoja-seguridad/view", get(view::<SafetySheet>))
        .route("/{lote}/cert-analisis", get(locate::<AnalysisCertificate>))
        .route("/{lote}/cert-analisis/view", get(view::<AnalysisCertificate>));

    let writes = Router::new()
        .route("/catalogo", post(resource::create::<ReagentCatalog>))
        .route(
            "/catalogo/{codigo}",
            put(resource::update::<ReagentCatalog>).delete(resource::delete::<ReagentCatalog>),
        )
        .route(
            "/catalogo/{codigo}/hoja-seguridad",
            post(upload_by_code::<SafetySheet>).delete(delete_by_code::<SafetySheet>),
        )
        .route(
            "/catalogo/{codigo}/cert-analisis",
            post(upload_by_code::<AnalysisCertificate>).delete(delete_by_code::<AnalysisCertificate>),
        )
        .route("/", post(resource::create::<Reagents>))
        .route(
            "/{lote}",
            put(resource::update::<Reagents>).delete(resource::delete::<Reagents>),
        )
        .route(
            "/{lote}/hoja-seguridad",
            post(upload::<SafetySheet>).delete(delete_document::<SafetySheet>),
        )
        .route(
            "/{lote}/cert-analisis",
            post(upload::<AnalysisCertificate>).delete(delete_document::<AnalysisCertificate>),
        )
        .route_layer(axum_middleware::from_fn_with_state(state, auth_guard));

    reads.merge(writes)
}

// GET /api/reactivos/aux
#[utoipa::path(
    get,
    path = "/api/reactivos/aux",
    tag = "Reactivos",
    responses(
        (status = 200, description = "Tablas auxiliares: tipos, clasif, unidades, estado, recipiente, almacen")
    )
)]
pub async fn lookups(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut body = Map::new();
    for (key, table) in LOOKUP_TABLES {
        let rows = app_state.lookups.id_name_rows(table).await?;
        body.insert(key.to_string(), Value::Array(rows));
    }
    Ok(Json(Value::Object(body)))
}

// ---
// Documentos PDF
// ---

fn pdf_response(pdf: StoredPdf) -> impl IntoResponse {
    let disposition = format!("inline; filename=\"{}\"", sanitize_file_name(&pdf.nombre_archivo));
    (
        [(CONTENT_TYPE, PDF_MIME.to_string()), (CONTENT_DISPOSITION, disposition)],
        pdf.contenido,
    )
}

// GET /api/reactivos/{lote}/hoja-seguridad
pub async fn locate<D: DocumentKind>(
    State(app_state): State<AppState>,
    Path(lote): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let found = app_state.documents.locate(D::DOC, &lote).await?;
    Ok(Json(found))
}

// GET /api/reactivos/{lote}/hoja-seguridad/view
pub async fn view<D: DocumentKind>(
    State(app_state): State<AppState>,
    Path(lote): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let pdf = app_state.documents.content(D::DOC, &lote).await?;
    Ok(pdf_response(pdf))
}

// POST /api/reactivos/{lote}/hoja-seguridad (multipart `file`)
pub async fn upload<D: DocumentKind>(
    State(app_state): State<AppState>,
    user: MaybeUser,
    Path(lote): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut form = Form::read(multipart, PDF_LIMIT).await?;
    let stored = app_state
        .documents
        .upload(D::DOC, &lote, form.take_file("file"), user.identity())
        .await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

// DELETE /api/reactivos/{lote}/hoja-seguridad
pub async fn delete_document<D: DocumentKind>(
    State(app_state): State<AppState>,
    user: MaybeUser,
    Path(lote): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let actor = ensure_role(user.identity(), ADMINS, D::DOC.delete_forbidden())?;
    let deleted = app_state.documents.delete(D::DOC, &lote, Some(actor)).await?;
    Ok(Json(deleted))
}

// GET /api/reactivos/catalogo/{codigo}/hoja-seguridad: el más reciente de cualquier lote.
pub async fn locate_by_code<D: DocumentKind>(
    State(app_state): State<AppState>,
    Path(codigo): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let found = app_state.documents.locate_by_code(D::DOC, &codigo).await?;
    Ok(Json(found))
}

pub async fn view_by_code<D: DocumentKind>(
    State(app_state): State<AppState>,
    Path(codigo): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let pdf = app_state.documents.content_by_code(D::DOC, &codigo).await?;
    Ok(pdf_response(pdf))
}

pub async fn upload_by_code<D: DocumentKind>() -> AppError {
    AppError::validation(D::DOC.by_code_unsupported("Subida"))
}

pub async fn delete_by_code<D: DocumentKind>() -> AppError {
    AppError::validation(D::DOC.by_code_unsupported("Eliminación"))
}
