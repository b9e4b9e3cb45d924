// src/middleware/error_detail.rs

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::header::{CONTENT_LENGTH, CONTENT_TYPE},
    middleware::Next,
    response::Response,
};
use serde_json::Value;

use crate::{common::error::ErrorDetail, config::AppState};

// Los errores internos llevan su detalle al cuerpo (`error`) solo fuera de
// producción.
pub async fn expose_error_detail(State(app_state): State<AppState>, request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    if app_state.config.environment.is_production() {
        return response;
    }
    let Some(ErrorDetail(detail)) = response.extensions().get::<ErrorDetail>().cloned() else {
        return response;
    };

    let (mut parts, body) = response.into_parts();
    let Ok(bytes) = to_bytes(body, 64 * 1024).await else {
        return Response::from_parts(parts, Body::empty());
    };
    let mut json = match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => map,
        _ => return Response::from_parts(parts, Body::from(bytes)),
    };
    json.insert("error".into(), Value::String(detail));

    let Ok(body) = serde_json::to_vec(&json) else {
        return Response::from_parts(parts, Body::from(bytes));
    };
    parts.headers.remove(CONTENT_LENGTH);
    parts
        .headers
        .insert(CONTENT_TYPE, axum::http::HeaderValue::from_static("application/json"));
    Response::from_parts(parts, Body::from(body))
}
