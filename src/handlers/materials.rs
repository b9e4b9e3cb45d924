// src/handlers/materials.rs
//
// Material volumétrico y material de referencia. Mismo esquema que equipos:
// identidad opcional, borrado solo para administradores.

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};

use crate::{
    config::AppState,
    handlers::{
        history,
        pdfs::{self, VolumetricPdfs},
        resource,
    },
    middleware::auth::identify,
    models::materials::{
        ReferenceHistory, ReferenceInterval, ReferenceMaterial, Volumetric, VolumetricHistory, VolumetricInterval,
    },
};

pub fn volumetric_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/materiales",
            post(resource::create::<Volumetric>).get(resource::list::<Volumetric>),
        )
        .route(
            "/materiales/{codigo}",
            get(resource::get_one::<Volumetric>)
                .put(resource::update::<Volumetric>)
                .delete(resource::delete::<Volumetric>),
        )
        .route("/materiales/{codigo}/historial", get(history::list::<VolumetricHistory>))
        .route("/materiales/{codigo}/intervalo", get(history::list::<VolumetricInterval>))
        // Alias sin el prefijo /materiales
        .route("/", post(resource::create::<Volumetric>).get(resource::list::<Volumetric>))
        .route(
            "/{codigo}",
            get(resource::get_one::<Volumetric>)
                .put(resource::update::<Volumetric>)
                .delete(resource::delete::<Volumetric>),
        )
        .route("/historial", post(history::create::<VolumetricHistory>))
        .route("/historial/list/{codigo}", get(history::list::<VolumetricHistory>))
        .route("/historial/next/{codigo}", get(history::next::<VolumetricHistory>))
        .route("/historial/{codigo}/{consecutivo}", put(history::update::<VolumetricHistory>))
        .route("/intervalo", post(history::create::<VolumetricInterval>))
        .route("/intervalo/list/{codigo}", get(history::list::<VolumetricInterval>))
        .route("/intervalo/next/{codigo}", get(history::next::<VolumetricInterval>))
        .route("/intervalo/{codigo}/{consecutivo}", put(history::update::<VolumetricInterval>))
        .route(
            "/pdfs/{codigo}",
            get(pdfs::list::<VolumetricPdfs>)
                .post(pdfs::upload::<VolumetricPdfs>)
                .delete(pdfs::remove::<VolumetricPdfs>),
        )
        .route("/pdfs/download/{id}", get(pdfs::download::<VolumetricPdfs>))
        .layer(axum_middleware::from_fn_with_state(state, identify))
}

pub fn reference_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/material",
            get(resource::list::<ReferenceMaterial>).post(resource::create::<ReferenceMaterial>),
        )
        .route(
            "/material/{codigo_id}",
            put(resource::update::<ReferenceMaterial>).delete(resource::delete::<ReferenceMaterial>),
        )
        .route("/historial", post(history::create::<ReferenceHistory>))
        .route("/historial/next/{codigo_material}", get(history::next::<ReferenceHistory>))
        .route("/historial/{codigo_material}", get(history::list::<ReferenceHistory>))
        .route(
            "/historial/{codigo_material}/{consecutivo}",
            put(history::update::<ReferenceHistory>),
        )
        .route("/intervalo", post(history::create::<ReferenceInterval>))
        .route("/intervalo/next/{codigo_material}", get(history::next::<ReferenceInterval>))
        .route("/intervalo/{codigo_material}", get(history::list::<ReferenceInterval>))
        .route(
            "/intervalo/{codigo_material}/{consecutivo}",
            put(history::update::<ReferenceInterval>),
        )
        .layer(axum_middleware::from_fn_with_state(state, identify))
}
