// src/handlers/inventory.rs
//
// Insumos y papelería: catálogo con imagen (multipart) e inventario con
// existencias.

use axum::{
    extract::{Multipart, Path, State},
    http::{header::CONTENT_TYPE, StatusCode},
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use serde_json::{Map, Value};

use crate::{
    common::{
        error::AppError,
        fields::SqlValue,
        upload::{Form, IMAGE_LIMIT},
    },
    config::AppState,
    handlers::resource,
    middleware::auth::{auth_guard, MaybeUser},
    models::{
        resource::Resource,
        stationery::{Stationery, StationeryCatalog},
        supplies::{Supplies, SupplyCatalog, AUX_KEYS},
    },
};

const IMAGE_COLUMN: &str = "imagen";
const IMAGE_FIELD: &str = "imagen";

pub fn supplies_router(state: AppState) -> Router<AppState> {
    let reads = Router::new()
        .route("/aux", get(supplies_aux))
        .route("/catalogo", get(resource::list::<SupplyCatalog>))
        .route("/catalogo/{item}", get(resource::get_one::<SupplyCatalog>))
        .route("/catalogo/{item}/imagen", get(catalog_image::<SupplyCatalog>))
        .route("/", get(resource::list::<Supplies>))
        .route("/{id}", get(resource::get_one::<Supplies>));

    let writes = Router::new()
        .route("/catalogo", post(create_catalog_item::<SupplyCatalog>))
        .route(
            "/catalogo/{item}",
            put(update_catalog_item::<SupplyCatalog>).delete(resource::delete::<SupplyCatalog>),
        )
        .route("/", post(resource::create::<Supplies>))
        .route(
            "/{id}",
            put(resource::update::<Supplies>).delete(resource::delete::<Supplies>),
        )
        .route("/{id}/existencias", patch(resource::adjust_stock::<Supplies>))
        .route_layer(axum_middleware::from_fn_with_state(state, auth_guard));

    reads.merge(writes)
}

pub fn stationery_router(state: AppState) -> Router<AppState> {
    let reads = Router::new()
        .route("/catalogo", get(resource::list::<StationeryCatalog>))
        .route("/catalogo/{item}", get(resource::get_one::<StationeryCatalog>))
        .route("/catalogo/{item}/imagen", get(catalog_image::<StationeryCatalog>))
        .route("/", get(resource::list::<Stationery>))
        .route("/{id}", get(resource::get_one::<Stationery>));

    let writes = Router::new()
        .route("/catalogo", post(create_catalog_item::<StationeryCatalog>))
        .route("/catalogo/{item}", delete(resource::delete::<StationeryCatalog>))
        .route("/", post(resource::create::<Stationery>))
        .route(
            "/{id}",
            put(resource::update::<Stationery>).delete(resource::delete::<Stationery>),
        )
        .route("/{id}/existencias", patch(resource::adjust_stock::<Stationery>))
        .route_layer(axum_middleware::from_fn_with_state(state, auth_guard));

    reads.merge(writes)
}

// GET /api/insumos/aux: mismas claves que reactivos, sin tablas detrás.
#[utoipa::path(
    get,
    path = "/api/insumos/aux",
    tag = "Insumos",
    responses((status = 200, description = "Seis arreglos vacíos"))
)]
pub async fn supplies_aux() -> Json<Value> {
    let body: Map<String, Value> = AUX_KEYS
        .iter()
        .map(|key| (key.to_string(), Value::Array(Vec::new())))
        .collect();
    Json(Value::Object(body))
}

// POST /catalogo (multipart: item, nombre, descripcion, imagen)
pub async fn create_catalog_item<R: Resource>(
    State(app_state): State<AppState>,
    user: MaybeUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let spec = R::spec();
    let mut form = Form::read(multipart, IMAGE_LIMIT).await?;

    let mut fields = app_state.resources.creation_fields(spec, &form.body())?;
    if let Some(image) = form.take_file(IMAGE_FIELD) {
        fields.set(IMAGE_COLUMN, SqlValue::Bytes(image.bytes));
    }

    let created = app_state
        .resources
        .create_fields(spec, fields, user.identity())
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// PUT /catalogo/{item}: la imagen solo se reemplaza cuando viene.
pub async fn update_catalog_item<R: Resource>(
    State(app_state): State<AppState>,
    user: MaybeUser,
    Path(item): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let spec = R::spec();
    let mut form = Form::read(multipart, IMAGE_LIMIT).await?;

    let mut fields = app_state.resources.update_fields(spec, &form.body())?;
    if let Some(image) = form.take_file(IMAGE_FIELD) {
        fields.set(IMAGE_COLUMN, SqlValue::Bytes(image.bytes));
    }

    let updated = app_state
        .resources
        .update_with(spec, &item, fields, user.identity())
        .await?;
    Ok(Json(updated))
}

// GET /catalogo/{item}/imagen: 204 cuando el item no tiene imagen.
pub async fn catalog_image<R: Resource>(
    State(app_state): State<AppState>,
    Path(item): Path<String>,
) -> Result<Response, AppError> {
    let image = app_state.resources.blob(R::spec(), IMAGE_COLUMN, &item).await?;
    Ok(match image {
        Some(bytes) => ([(CONTENT_TYPE, "image/jpeg")], bytes).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}
