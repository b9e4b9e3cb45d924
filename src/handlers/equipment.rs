// src/handlers/equipment.rs

use axum::{
    extract::{Multipart, Path, State},
    http::{header::CONTENT_TYPE, StatusCode},
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};

use crate::{
    common::{
        error::AppError,
        extract::{Json, Query},
        fields::SqlValue,
        pagination::ListQuery,
        upload::{Form, IMAGE_LIMIT},
    },
    config::AppState,
    handlers::{
        history,
        pdfs::{self, EquipmentPdfs},
        resource,
    },
    middleware::{
        auth::{identify, MaybeUser},
        rbac::ensure_role,
    },
    models::equipment::{Equipment, EquipmentHistory, EquipmentInterval, TechSheet, EQUIPMENT, TECH_SHEET},
};

const SIGNATURE_COLUMN: &str = "cargo_y_firma";

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(resource::create::<Equipment>).get(list_equipment))
        .route("/completo/{codigo}", get(equipment_summary))
        .route("/fichas-tecnicas", get(resource::list::<TechSheet>))
        .route("/ficha-tecnica", post(create_tech_sheet))
        .route("/ficha-tecnica/firma/{codigo}", get(signature))
        .route("/firma/{codigo}", get(signature))
        // Historial e intervalos de calibración
        .route("/historial", post(history::create::<EquipmentHistory>))
        .route("/historial/next/{codigo}", get(history::next::<EquipmentHistory>))
        .route("/historial/list/{codigo}", get(history::list::<EquipmentHistory>))
        .route("/historial/{equipo}/{consecutivo}", put(history::update::<EquipmentHistory>))
        .route("/intervalo", post(history::create::<EquipmentInterval>))
        .route("/intervalo/next/{codigo}", get(history::next::<EquipmentInterval>))
        .route("/intervalo/list/{codigo}", get(history::list::<EquipmentInterval>))
        .route("/intervalo/{equipo}/{consecutivo}", put(history::update::<EquipmentInterval>))
        // PDFs
        .route(
            "/pdfs/{codigo}",
            get(pdfs::list::<EquipmentPdfs>)
                .post(pdfs::upload::<EquipmentPdfs>)
                .delete(pdfs::remove::<EquipmentPdfs>),
        )
        .route("/pdfs/download/{id}", get(pdfs::download::<EquipmentPdfs>))
        .route("/{codigo}", delete(delete_equipment))
        .layer(axum_middleware::from_fn_with_state(state, identify))
}

// GET /api/equipos
#[utoipa::path(
    get,
    path = "/api/equipos",
    tag = "Equipos",
    responses(
        (status = 200, description = "Equipos con su ficha técnica (sin la firma)")
    )
)]
pub async fn list_equipment(
    State(app_state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state.equipment.list(&query).await?;
    Ok(Json(rows))
}

// GET /api/equipos/completo/{codigo}
#[utoipa::path(
    get,
    path = "/api/equipos/completo/{codigo}",
    tag = "Equipos",
    params(("codigo" = String, Path, description = "Código de identificación del equipo")),
    responses(
        (status = 200, description = "Hoja de vida del equipo"),
        (status = 404, description = "Equipo no encontrado")
    )
)]
pub async fn equipment_summary(
    State(app_state): State<AppState>,
    Path(codigo): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let equipment = app_state.equipment.summary(&codigo).await?;
    Ok(Json(equipment))
}

// POST /api/equipos/ficha-tecnica (multipart, imagen opcional `firma`)
#[utoipa::path(
    post,
    path = "/api/equipos/ficha-tecnica",
    tag = "Equipos",
    responses(
        (status = 201, description = "Ficha técnica registrada"),
        (status = 400, description = "Falta codigo_identificador"),
        (status = 404, description = "Equipo no encontrado"),
        (status = 409, description = "El equipo ya tiene ficha técnica"),
        (status = 413, description = "Firma mayor a 5 MB")
    )
)]
pub async fn create_tech_sheet(
    State(app_state): State<AppState>,
    user: MaybeUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut form = Form::read(multipart, IMAGE_LIMIT).await?;

    let mut fields = app_state.resources.creation_fields(&TECH_SHEET, &form.body())?;
    if let Some(signature) = form.take_file("firma") {
        fields.set(SIGNATURE_COLUMN, SqlValue::Bytes(signature.bytes));
    }

    let created = app_state
        .resources
        .create_fields(&TECH_SHEET, fields, user.identity())
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// GET /api/equipos/firma/{codigo}
#[utoipa::path(
    get,
    path = "/api/equipos/firma/{codigo}",
    tag = "Equipos",
    params(("codigo" = String, Path, description = "Código del equipo")),
    responses(
        (status = 200, description = "Imagen de cargo y firma (image/png)"),
        (status = 404, description = "Firma no encontrada")
    )
)]
pub async fn signature(
    State(app_state): State<AppState>,
    Path(codigo): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let image = app_state
        .resources
        .blob(&TECH_SHEET, SIGNATURE_COLUMN, &codigo)
        .await?
        .ok_or_else(|| AppError::not_found("Firma no encontrada"))?;
    Ok(([(CONTENT_TYPE, "image/png")], image))
}

// DELETE /api/equipos/{codigo}: borra el equipo con todos sus registros.
#[utoipa::path(
    delete,
    path = "/api/equipos/{codigo}",
    tag = "Equipos",
    params(("codigo" = String, Path, description = "Código del equipo")),
    responses(
        (status = 200, description = "Equipo eliminado con su historial, intervalos y ficha técnica"),
        (status = 401, description = "No autenticado"),
        (status = 403, description = "Solo administradores"),
        (status = 404, description = "Equipo no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_equipment(
    State(app_state): State<AppState>,
    user: MaybeUser,
    Path(codigo): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let actor = ensure_role(user.identity(), EQUIPMENT.delete_roles, EQUIPMENT.messages.delete_forbidden)?;
    let deleted = app_state.equipment.delete_cascade(&codigo, Some(actor)).await?;
    Ok(Json(deleted))
}
