use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::{common::error::AppError, config::AppState, models::auth::Identity};

// Autenticación obligatoria: sin token válido la ruta no se ejecuta.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = app_state.auth_service.keys().authenticate(request.headers())?;

    // Deja la identidad en las extensions para los extractores
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

// Identidad opcional: sin cabecera sigue como anónimo, pero un token
// presente e inválido sigue siendo un 401.
pub async fn identify(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if request.headers().contains_key(AUTHORIZATION) {
        let identity = app_state.auth_service.keys().authenticate(request.headers())?;
        request.extensions_mut().insert(identity);
    }
    Ok(next.run(request).await)
}

// Extractor del usuario autenticado
pub struct AuthenticatedUser(pub Identity);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AppError::MissingToken)
    }
}

/// Identidad si la hubo; nunca rechaza.
pub struct MaybeUser(pub Option<Identity>);

impl MaybeUser {
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }
}

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<Identity>().cloned()))
    }
}
