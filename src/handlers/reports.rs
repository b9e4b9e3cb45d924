// src/handlers/reports.rs
//
// Reportes: solo el rol Administrador (el Superadmin no entra).

use axum::{
    extract::State,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::get,
    Router,
};

use crate::{
    common::{
        error::AppError,
        extract::{Json, Query},
    },
    config::AppState,
    middleware::{
        auth::auth_guard,
        rbac::{ReportViewer, RequireRole},
    },
    models::{
        audit::MovementKind,
        reports::{DateRange, ExpiryQuery},
    },
};

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/inventario", get(inventory))
        .route("/entradas", get(entries))
        .route("/salidas", get(exits))
        .route("/vencimientos", get(expirations))
        .layer(axum_middleware::from_fn_with_state(state, auth_guard))
}

// GET /api/reportes/inventario
#[utoipa::path(
    get,
    path = "/api/reportes/inventario",
    tag = "Reportes",
    responses(
        (status = 200, description = "Inventario con existencias de todos los tipos de producto"),
        (status = 401, description = "No autenticado"),
        (status = 403, description = "Se requiere rol Administrador")
    ),
    security(("api_jwt" = []))
)]
pub async fn inventory(
    State(app_state): State<AppState>,
    _viewer: RequireRole<ReportViewer>,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state.reports.inventory().await?;
    Ok(Json(rows))
}

// GET /api/reportes/entradas
#[utoipa::path(
    get,
    path = "/api/reportes/entradas",
    tag = "Reportes",
    responses(
        (status = 200, description = "Movimientos de entrada"),
        (status = 403, description = "Se requiere rol Administrador")
    ),
    security(("api_jwt" = []))
)]
pub async fn entries(
    State(app_state): State<AppState>,
    _viewer: RequireRole<ReportViewer>,
    Query(range): Query<DateRange>,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state.reports.movements(MovementKind::Entry, &range).await?;
    Ok(Json(rows))
}

// GET /api/reportes/salidas
#[utoipa::path(
    get,
    path = "/api/reportes/salidas",
    tag = "Reportes",
    responses(
        (status = 200, description = "Movimientos de salida"),
        (status = 403, description = "Se requiere rol Administrador")
    ),
    security(("api_jwt" = []))
)]
pub async fn exits(
    State(app_state): State<AppState>,
    _viewer: RequireRole<ReportViewer>,
    Query(range): Query<DateRange>,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state.reports.movements(MovementKind::Exit, &range).await?;
    Ok(Json(rows))
}

// GET /api/reportes/vencimientos
#[utoipa::path(
    get,
    path = "/api/reportes/vencimientos",
    tag = "Reportes",
    responses(
        (status = 200, description = "Reactivos que vencen dentro de `dias` (30 por defecto)"),
        (status = 403, description = "Se requiere rol Administrador")
    ),
    security(("api_jwt" = []))
)]
pub async fn expirations(
    State(app_state): State<AppState>,
    _viewer: RequireRole<ReportViewer>,
    Query(query): Query<ExpiryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state.reports.expirations(&query).await?;
    Ok(Json(rows))
}
