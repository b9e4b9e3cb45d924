// src/handlers/history.rs
//
// Historial e intervalos de calibración, genéricos sobre `History`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::Value;

use crate::{
    common::{error::AppError, extract::Json},
    config::AppState,
    middleware::auth::MaybeUser,
    models::history::History,
};

// GET /historial/list/{codigo}
pub async fn list<H: History>(
    State(app_state): State<AppState>,
    Path(parent): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state.history.list(H::spec(), &parent).await?;
    Ok(Json(rows))
}

// GET /historial/next/{codigo}
pub async fn next<H: History>(
    State(app_state): State<AppState>,
    Path(parent): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let next = app_state.history.next(H::spec(), &parent).await?;
    Ok(Json(next))
}

// POST /historial: el padre viene en el cuerpo.
pub async fn create<H: History>(
    State(app_state): State<AppState>,
    user: MaybeUser,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let created = app_state
        .history
        .create(H::spec(), &body, user.identity())
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// PUT /historial/{codigo}/{consecutivo}
pub async fn update<H: History>(
    State(app_state): State<AppState>,
    user: MaybeUser,
    Path((parent, consecutive)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let row = app_state
        .history
        .update(H::spec(), &parent, &consecutive, &body, user.identity())
        .await?;
    Ok(Json(row))
}
