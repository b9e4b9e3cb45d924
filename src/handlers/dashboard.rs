// src/handlers/dashboard.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};

use crate::{common::error::AppError, config::AppState, models::reports::DashboardMetrics};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/metricas-principales", get(get_metrics))
        .route("/reactivos-proximos-vencer", get(get_expiring_reagents))
}

// GET /api/dashboard/metricas-principales
#[utoipa::path(
    get,
    path = "/api/dashboard/metricas-principales",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Totales de insumos, reactivos, solicitudes, clientes activos y papelería", body = DashboardMetrics)
    )
)]
pub async fn get_metrics(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let metrics = app_state.reports.metrics().await?;
    Ok((StatusCode::OK, Json(metrics)))
}

// GET /api/dashboard/reactivos-proximos-vencer
#[utoipa::path(
    get,
    path = "/api/dashboard/reactivos-proximos-vencer",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Reactivos que vencen en los próximos 30 días")
    )
)]
pub async fn get_expiring_reagents(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let reagents = app_state.reports.expiring_reagents().await?;
    Ok((StatusCode::OK, Json(reagents)))
}
