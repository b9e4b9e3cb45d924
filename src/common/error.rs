use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;

// Todos los errores que un handler puede devolver.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Error de validación")]
    ValidationErrors(#[from] validator::ValidationErrors),

    #[error("Token requerido")]
    MissingToken,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Token expirado")]
    ExpiredToken,

    #[error("Credenciales inválidas")]
    InvalidCredentials,

    #[error("Usuario inactivo")]
    InactiveUser,

    #[error("Usuario no encontrado o inactivo")]
    StaleSession,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Conflict {
        message: String,
        details: Option<Map<String, Value>>,
    },

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Error de base de datos: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Error de Bcrypt: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("Error de JWT: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Error de E/S: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error interno del servidor: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Detalle de un error interno. Viaja como extensión de la respuesta y solo
/// se agrega al cuerpo fuera de producción (ver `middleware::error_detail`).
#[derive(Debug, Clone)]
pub struct ErrorDetail(pub String);

pub const INTERNAL_MESSAGE: &str = "Error interno del servidor";

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        AppError::Conflict {
            message: message.into(),
            details: None,
        }
    }

    pub fn conflict_with(message: impl Into<String>, details: Map<String, Value>) -> Self {
        AppError::Conflict {
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::ValidationErrors(_) => StatusCode::BAD_REQUEST,
            AppError::MissingToken
            | AppError::InvalidToken
            | AppError::ExpiredToken
            | AppError::InvalidCredentials
            | AppError::InactiveUser
            | AppError::StaleSession => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Database(_)
            | AppError::Bcrypt(_)
            | AppError::Jwt(_)
            | AppError::Io(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn is_internal(&self) -> bool {
        self.status() == StatusCode::INTERNAL_SERVER_ERROR
    }
}

// Primer mensaje legible de un `ValidationErrors`.
fn first_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Campo inválido: {}", field))
            })
        })
        .next()
        .unwrap_or_else(|| "Datos inválidos".to_string())
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if self.is_internal() {
            tracing::error!("Error interno del servidor: {}", self);
            let mut response = (status, Json(json!({ "message": INTERNAL_MESSAGE }))).into_response();
            response.extensions_mut().insert(ErrorDetail(self.to_string()));
            return response;
        }

        let body = match self {
            AppError::ValidationErrors(errors) => json!({ "message": first_message(&errors) }),
            AppError::Conflict { message, details } => {
                let mut body = details.unwrap_or_default();
                body.insert("message".into(), Value::String(message));
                Value::Object(body)
            }
            other => json!({ "message": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge("Archivo demasiado grande".into())
        } else {
            AppError::Validation(format!("Formulario inválido: {}", err.body_text()))
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("Cuerpo JSON inválido: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(format!("Parámetros de consulta inválidos: {}", rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn taxonomy_maps_to_status_codes() {
        assert_eq!(AppError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::MissingToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::ExpiredToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::forbidden("x").status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::conflict("x").status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::PayloadTooLarge("x".into()).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn conflict_carries_structured_details() {
        let mut details = Map::new();
        details.insert("codigo".into(), json!("R-01"));
        details.insert("dependientes".into(), json!(3));
        let response = AppError::conflict_with("En uso", details).into_response();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = body_json(response).await;
        assert_eq!(body["message"], "En uso");
        assert_eq!(body["dependientes"], 3);
        assert_eq!(body["codigo"], "R-01");
    }

    #[tokio::test]
    async fn internal_errors_hide_detail_in_body() {
        let response = AppError::Internal(anyhow::anyhow!("pool cerrado")).into_response();

        let detail = response.extensions().get::<ErrorDetail>().cloned();
        assert!(detail.unwrap().0.contains("pool cerrado"));

        let body = body_json(response).await;
        assert_eq!(body, json!({ "message": INTERNAL_MESSAGE }));
    }

    #[tokio::test]
    async fn token_errors_have_distinct_messages() {
        let expired = body_json(AppError::ExpiredToken.into_response()).await;
        let invalid = body_json(AppError::InvalidToken.into_response()).await;
        assert_eq!(expired["message"], "Token expirado");
        assert_eq!(invalid["message"], "Token inválido");
    }
}
