use axum::{extract::State, http::HeaderMap, routing::{get, post}, Router};

use crate::{
    common::{error::AppError, extract::Json},
    config::AppState,
    models::auth::{Identity, LoginPayload, LoginResponse},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/me", get(me))
}

// Handler de login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Sesión iniciada", body = LoginResponse),
        (status = 400, description = "Falta correo o contraseña"),
        (status = 401, description = "Credenciales inválidas o usuario inactivo")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = app_state.auth_service.login(payload).await?;
    Ok(Json(response))
}

// Handler de /me: verifica el token y vuelve a leer el usuario.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Usuario de la sesión", body = Identity),
        (status = 401, description = "Token requerido, inválido o expirado")
    ),
    security(("api_jwt" = []))
)]
pub async fn me(State(app_state): State<AppState>, headers: HeaderMap) -> Result<Json<Identity>, AppError> {
    let identity = app_state.auth_service.me(&headers).await?;
    Ok(Json(identity))
}
