// src/handlers/users.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Router,
};

use crate::{
    common::{error::AppError, extract::Json},
    config::AppState,
    middleware::{
        auth::auth_guard,
        rbac::{RequireRole, RoleAdmin, UserAdmin},
    },
    models::auth::{
        ChangeRolePayload, ChangeRoleResponse, CreateUserPayload, CreateUserResponse, RoleRow, UpdateStatusPayload,
        UserSummary,
    },
};

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/roles", get(list_roles))
        .route("/", get(list_users))
        .route("/crear", post(create_user))
        .route("/estado/{id}", patch(update_status))
        .route("/eliminar/{id}", delete(delete_user))
        .route("/rol/{id}", patch(change_role))
        .layer(axum_middleware::from_fn_with_state(state, auth_guard))
}

// Un id no numérico no puede existir.
fn user_id(raw: &str) -> Result<i32, AppError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| AppError::not_found("Usuario no encontrado"))
}

// GET /api/usuarios/roles
#[utoipa::path(
    get,
    path = "/api/usuarios/roles",
    tag = "Usuarios",
    responses(
        (status = 200, description = "Roles ordenados por nombre", body = Vec<RoleRow>),
        (status = 401, description = "No autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_roles(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let roles = app_state.users.roles().await?;
    Ok(Json(roles))
}

// GET /api/usuarios
#[utoipa::path(
    get,
    path = "/api/usuarios",
    tag = "Usuarios",
    responses(
        (status = 200, description = "Usuarios con su rol, más recientes primero", body = Vec<UserSummary>),
        (status = 401, description = "No autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let users = app_state.users.list().await?;
    Ok(Json(users))
}

// POST /api/usuarios/crear
#[utoipa::path(
    post,
    path = "/api/usuarios/crear",
    tag = "Usuarios",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Usuario creado", body = CreateUserResponse),
        (status = 400, description = "Datos inválidos o rol inexistente"),
        (status = 403, description = "Solo administradores"),
        (status = 409, description = "El email ya está registrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    admin: RequireRole<UserAdmin>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    let created = app_state.users.create(payload, Some(admin.identity())).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// PATCH /api/usuarios/estado/{id}
#[utoipa::path(
    patch,
    path = "/api/usuarios/estado/{id}",
    tag = "Usuarios",
    request_body = UpdateStatusPayload,
    params(("id" = i32, Path, description = "ID del usuario")),
    responses(
        (status = 200, description = "Estado actualizado"),
        (status = 400, description = "Estado inválido"),
        (status = 403, description = "Solo administradores"),
        (status = 404, description = "Usuario no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_status(
    State(app_state): State<AppState>,
    admin: RequireRole<UserAdmin>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let id = user_id(&id)?;
    let updated = app_state
        .users
        .set_status(id, payload, Some(admin.identity()))
        .await?;
    Ok(Json(updated))
}

// DELETE /api/usuarios/eliminar/{id}
#[utoipa::path(
    delete,
    path = "/api/usuarios/eliminar/{id}",
    tag = "Usuarios",
    params(("id" = i32, Path, description = "ID del usuario")),
    responses(
        (status = 200, description = "Usuario eliminado"),
        (status = 403, description = "Solo administradores"),
        (status = 404, description = "Usuario no encontrado"),
        (status = 409, description = "El usuario tiene registros asociados")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    admin: RequireRole<UserAdmin>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = user_id(&id)?;
    let deleted = app_state.users.delete(id, Some(admin.identity())).await?;
    Ok(Json(deleted))
}

// PATCH /api/usuarios/rol/{id}
#[utoipa::path(
    patch,
    path = "/api/usuarios/rol/{id}",
    tag = "Usuarios",
    request_body = ChangeRolePayload,
    params(("id" = i32, Path, description = "ID del usuario")),
    responses(
        (status = 200, description = "Rol actualizado", body = ChangeRoleResponse),
        (status = 400, description = "Rol faltante o inexistente"),
        (status = 403, description = "Solo el Superadmin"),
        (status = 404, description = "Usuario no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_role(
    State(app_state): State<AppState>,
    superadmin: RequireRole<RoleAdmin>,
    Path(id): Path<String>,
    Json(payload): Json<ChangeRolePayload>,
) -> Result<impl IntoResponse, AppError> {
    let id = user_id(&id)?;
    let changed = app_state
        .users
        .change_role(id, payload, Some(superadmin.identity()))
        .await?;
    Ok(Json(changed))
}
