// src/handlers/requests.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::IntoParams;

use crate::{
    common::{
        error::AppError,
        extract::{Json, Query},
        pagination::ListQuery,
    },
    config::AppState,
    handlers::resource,
    middleware::auth::{auth_guard, MaybeUser},
    models::requests::{Clients, FollowUpSpec, Requests, OFFER, OFFER_REVIEW, SURVEY_FOLLOW_UP},
};

pub fn router(state: AppState) -> Router<AppState> {
    let reads = Router::new()
        .route("/departamentos", get(departments))
        .route("/ciudades", get(cities))
        .route("/clientes", get(resource::list::<Clients>))
        .route("/clientes/{id}", get(resource::get_one::<Clients>))
        // Ruta histórica de clientes
        .route("/usuarios", get(resource::list::<Clients>))
        .route("/usuarios/{id}", get(resource::get_one::<Clients>))
        .route("/detalle/lista", get(detail_list))
        .route("/detalle/{id}", get(detail))
        .route("/", get(list_requests))
        .route("/{id}", get(get_request));

    let writes = Router::new()
        .route("/clientes", post(resource::create::<Clients>))
        .route(
            "/clientes/{id}",
            put(resource::update::<Clients>).delete(resource::delete::<Clients>),
        )
        .route("/usuarios", post(resource::create::<Clients>))
        .route(
            "/usuarios/{id}",
            put(resource::update::<Clients>).delete(resource::delete::<Clients>),
        )
        .route("/encuestas", post(create_survey))
        .route("/", post(resource::create::<Requests>))
        .route(
            "/{id}",
            put(resource::update::<Requests>).delete(resource::delete::<Requests>),
        )
        .route("/{id}/oferta", put(upsert_offer))
        .route("/{id}/revision", put(upsert_offer_review))
        .route("/{id}/seguimiento", put(upsert_survey_follow_up))
        .route_layer(axum_middleware::from_fn_with_state(state, auth_guard));

    reads.merge(writes)
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CitiesQuery {
    /// Nombre del departamento; sin él se listan todas las ciudades.
    pub departamento: Option<String>,
}

// GET /api/solicitudes/departamentos
#[utoipa::path(
    get,
    path = "/api/solicitudes/departamentos",
    tag = "Solicitudes",
    responses((status = 200, description = "Departamentos ordenados por nombre"))
)]
pub async fn departments(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let rows = app_state.requests.departments().await?;
    Ok(Json(rows))
}

// GET /api/solicitudes/ciudades
#[utoipa::path(
    get,
    path = "/api/solicitudes/ciudades",
    tag = "Solicitudes",
    responses((status = 200, description = "Ciudades, opcionalmente de un departamento"))
)]
pub async fn cities(
    State(app_state): State<AppState>,
    Query(query): Query<CitiesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state.requests.cities(query.departamento.as_deref()).await?;
    Ok(Json(rows))
}

// GET /api/solicitudes
#[utoipa::path(
    get,
    path = "/api/solicitudes",
    tag = "Solicitudes",
    responses((status = 200, description = "Solicitudes con nombre y correo del cliente, más recientes primero"))
)]
pub async fn list_requests(
    State(app_state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state.requests.list(&query).await?;
    Ok(Json(rows))
}

// GET /api/solicitudes/{id}
pub async fn get_request(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let row = app_state.requests.get(&id).await?;
    Ok(Json(row))
}

// GET /api/solicitudes/detalle/lista
#[utoipa::path(
    get,
    path = "/api/solicitudes/detalle/lista",
    tag = "Solicitudes",
    responses((status = 200, description = "Solicitudes con oferta, revisión y seguimiento"))
)]
pub async fn detail_list(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let rows = app_state.requests.detail_list().await?;
    Ok(Json(rows))
}

// GET /api/solicitudes/detalle/{id}
pub async fn detail(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let row = app_state.requests.detail(&id).await?;
    Ok(Json(row))
}

// ---
// Seguimiento y encuesta
// ---

async fn upsert_follow_up(
    app_state: &AppState,
    spec: &FollowUpSpec,
    user: &MaybeUser,
    id: &str,
    body: &Value,
) -> Result<Json<Value>, AppError> {
    let saved = app_state
        .requests
        .upsert_follow_up(spec, id, body, user.identity())
        .await?;
    Ok(Json(saved))
}

// PUT /api/solicitudes/{id}/oferta
pub async fn upsert_offer(
    State(app_state): State<AppState>,
    user: MaybeUser,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    upsert_follow_up(&app_state, &OFFER, &user, &id, &body).await
}

// PUT /api/solicitudes/{id}/revision
pub async fn upsert_offer_review(
    State(app_state): State<AppState>,
    user: MaybeUser,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    upsert_follow_up(&app_state, &OFFER_REVIEW, &user, &id, &body).await
}

// PUT /api/solicitudes/{id}/seguimiento
pub async fn upsert_survey_follow_up(
    State(app_state): State<AppState>,
    user: MaybeUser,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    upsert_follow_up(&app_state, &SURVEY_FOLLOW_UP, &user, &id, &body).await
}

// POST /api/solicitudes/encuestas: encuesta y banderas en una sola transacción.
#[utoipa::path(
    post,
    path = "/api/solicitudes/encuestas",
    tag = "Solicitudes",
    responses(
        (status = 201, description = "Encuesta creada exitosamente"),
        (status = 400, description = "Falta id_solicitud"),
        (status = 401, description = "No autenticado"),
        (status = 404, description = "Solicitud no encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_survey(
    State(app_state): State<AppState>,
    user: MaybeUser,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let created = app_state.requests.create_survey(&body, user.identity()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
