// src/handlers/resource.rs
//
// Handlers genéricos de CRUD. Cada dominio los instancia con su marca de tipo,
// p. ej. `get(resource::list::<Supplies>)`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::{json, Value};

use crate::{
    common::{
        error::AppError,
        extract::{Json, Query},
        pagination::ListQuery,
    },
    config::AppState,
    middleware::{auth::MaybeUser, rbac::ensure_role},
    models::resource::Resource,
};

// GET /
pub async fn list<R: Resource>(
    State(app_state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let listing = app_state.resources.list(R::spec(), &query).await?;
    Ok((StatusCode::OK, Json(listing)))
}

// GET /total
pub async fn total<R: Resource>(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let total = app_state.resources.total(R::spec()).await?;
    Ok(Json(json!({ "total": total })))
}

// GET /{key}
pub async fn get_one<R: Resource>(
    State(app_state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let row = app_state.resources.get(R::spec(), &key).await?;
    Ok(Json(row))
}

// POST /
pub async fn create<R: Resource>(
    State(app_state): State<AppState>,
    user: MaybeUser,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let created = app_state
        .resources
        .create(R::spec(), &body, user.identity())
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// PUT /{key}
pub async fn update<R: Resource>(
    State(app_state): State<AppState>,
    user: MaybeUser,
    Path(key): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let updated = app_state
        .resources
        .update(R::spec(), &key, &body, user.identity())
        .await?;
    Ok(Json(updated))
}

// DELETE /{key}: exige uno de los roles del recurso.
pub async fn delete<R: Resource>(
    State(app_state): State<AppState>,
    user: MaybeUser,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let spec = R::spec();
    let actor = ensure_role(user.identity(), spec.delete_roles, spec.messages.delete_forbidden)?;
    let deleted = app_state.resources.delete(spec, &key, Some(actor)).await?;
    Ok(Json(deleted))
}

// PATCH /{key}/existencias
pub async fn adjust_stock<R: Resource>(
    State(app_state): State<AppState>,
    user: MaybeUser,
    Path(key): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let adjusted = app_state
        .resources
        .adjust_stock(R::spec(), &key, &body, user.identity())
        .await?;
    Ok(Json(adjusted))
}
