// src/handlers/logs.rs

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
    middleware::auth::auth_guard,
    models::audit::{ActionLogFilter, LogStats, MovementFilter},
};

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/acciones", get(list_actions))
        .route("/movimientos-inventario", get(list_movements))
        .route("/estadisticas", get(stats))
        .layer(axum_middleware::from_fn_with_state(state, auth_guard))
}

// GET /api/logs/acciones
#[utoipa::path(
    get,
    path = "/api/logs/acciones",
    tag = "Logs",
    responses(
        (status = 200, description = "Acciones paginadas: { success, data, pagination }"),
        (status = 401, description = "No autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_actions(
    State(app_state): State<AppState>,
    Query(filter): Query<ActionLogFilter>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.audit.actions(filter).await?;
    Ok(Json(page))
}

// GET /api/logs/movimientos-inventario
#[utoipa::path(
    get,
    path = "/api/logs/movimientos-inventario",
    tag = "Logs",
    responses(
        (status = 200, description = "Movimientos de inventario paginados"),
        (status = 401, description = "No autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_movements(
    State(app_state): State<AppState>,
    Query(filter): Query<MovementFilter>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.audit.movements(filter).await?;
    Ok(Json(page))
}

// GET /api/logs/estadisticas
#[utoipa::path(
    get,
    path = "/api/logs/estadisticas",
    tag = "Logs",
    responses(
        (status = 200, description = "Conteos por módulo (30 días) y acciones frecuentes (7 días)", body = LogStats),
        (status = 401, description = "No autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn stats(State(app_state): State<AppState>) -> Result<Json<LogStats>, AppError> {
    let stats = app_state.audit.stats().await?;
    Ok(Json(stats))
}
