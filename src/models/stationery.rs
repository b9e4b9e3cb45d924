use crate::common::fields::Column;
use crate::models::auth::ADMINS;
use crate::models::resource::{ListShape, Messages, Reply, Resource, ResourceSpec, StockSpec};

pub static STATIONERY_CATALOG: ResourceSpec = ResourceSpec {
    table: "catalogo_papeleria",
    key: Column::integer("item"),
    generated_key: false,
    columns: &[Column::text("nombre"), Column::text("descripcion"), Column::bytes("imagen")],
    required: &["item", "nombre"],
    search: &["t.item::text", "t.nombre"],
    order_by: "t.item DESC",
    listing: ListShape::Paged,
    projection: &[],
    hidden: &["imagen"],
    module: "CATALOGO_PAPELERIA",
    stock: None,
    counter: None,
    dependents: None,
    delete_roles: ADMINS,
    prepare: None,
    created: Reply::Row,
    updated: Reply::Row,
    messages: Messages {
        not_found: "No encontrado en catálogo (item: {key})",
        duplicate: "El item ya existe en catálogo",
        in_use: "No se puede eliminar: existen artículos de papelería que usan este item de catálogo.",
        missing_parent: "Referencia inválida",
        delete_forbidden: "No tienes permisos para eliminar. Solo administradores.",
        deleted: "Eliminado del catálogo",
    },
};

pub static STATIONERY: ResourceSpec = ResourceSpec {
    table: "papeleria",
    key: Column::integer("id"),
    generated_key: true,
    columns: &[
        Column::integer("item_catalogo"),
        Column::text("nombre"),
        Column::decimal("cantidad_adquirida"),
        Column::decimal("cantidad_existente"),
        Column::text("presentacion"),
        Column::text("marca"),
        Column::text("descripcion"),
        Column::date("fecha_adquisicion"),
        Column::text("ubicacion"),
        Column::text("observaciones"),
    ],
    required: &["item_catalogo", "nombre", "cantidad_adquirida", "cantidad_existente"],
    search: &["t.item_catalogo::text", "t.nombre", "t.marca"],
    order_by: "t.id DESC",
    listing: ListShape::Capped,
    projection: &[],
    hidden: &[],
    module: "PAPELERIA",
    stock: Some(StockSpec {
        product: "PAPELERIA",
        existing: "cantidad_existente",
    }),
    counter: None,
    dependents: None,
    delete_roles: ADMINS,
    prepare: None,
    created: Reply::Message("Artículo de papelería creado correctamente"),
    updated: Reply::Message("Artículo de papelería actualizado correctamente"),
    messages: Messages {
        not_found: "Artículo de papelería no encontrado",
        duplicate: "El artículo ya existe",
        in_use: "No se puede eliminar: el artículo tiene registros asociados",
        missing_parent: "El item de catálogo no existe",
        delete_forbidden: "No tienes permisos para eliminar papelería. Solo administradores pueden realizar esta acción.",
        deleted: "Artículo de papelería eliminado correctamente",
    },
};

pub struct StationeryCatalog;
impl Resource for StationeryCatalog {
    fn spec() -> &'static ResourceSpec {
        &STATIONERY_CATALOG
    }
}

pub struct Stationery;
impl Resource for Stationery {
    fn spec() -> &'static ResourceSpec {
        &STATIONERY
    }
}
