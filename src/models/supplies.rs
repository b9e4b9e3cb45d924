// src/models/supplies.rs

use crate::common::fields::Column;
use crate::models::auth::ADMINS;
use crate::models::resource::{ListShape, Messages, Reply, Resource, ResourceSpec, StockSpec};

pub static SUPPLY_CATALOG: ResourceSpec = ResourceSpec {
    table: "catalogo_insumos",
    key: Column::integer("item"),
    generated_key: false,
    columns: &[Column::text("nombre"), Column::text("descripcion"), Column::bytes("imagen")],
    required: &["item", "nombre"],
    search: &["t.item::text", "t.nombre"],
    order_by: "t.item DESC",
    listing: ListShape::Paged,
    projection: &[],
    hidden: &["imagen"],
    module: "CATALOGO_INSUMOS",
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
        in_use: "No se puede eliminar: existen insumos que usan este item de catálogo.",
        missing_parent: "Referencia inválida",
        delete_forbidden: "No tienes permisos para eliminar. Solo administradores.",
        deleted: "Eliminado del catálogo",
    },
};

pub static SUPPLIES: ResourceSpec = ResourceSpec {
    table: "insumos",
    key: Column::integer("id"),
    generated_key: true,
    columns: &[
        Column::integer("item_catalogo"),
        Column::text("nombre"),
        Column::decimal("cantidad_adquirida"),
        Column::decimal("cantidad_existente"),
        Column::text("presentacion"),
        Column::text("marca"),
        Column::text("referencia"),
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
    module: "INSUMOS",
    stock: Some(StockSpec {
        product: "INSUMO",
        existing: "cantidad_existente",
    }),
    counter: None,
    dependents: None,
    delete_roles: ADMINS,
    prepare: None,
    created: Reply::Message("Insumo creado correctamente"),
    updated: Reply::Message("Insumo actualizado correctamente"),
    messages: Messages {
        not_found: "Insumo no encontrado",
        duplicate: "El insumo ya existe",
        in_use: "No se puede eliminar: el insumo tiene registros asociados",
        missing_parent: "El item de catálogo no existe",
        delete_forbidden: "No tienes permisos para eliminar insumos. Solo administradores pueden realizar esta acción.",
        deleted: "Insumo eliminado correctamente",
    },
};

pub struct SupplyCatalog;
impl Resource for SupplyCatalog {
    fn spec() -> &'static ResourceSpec {
        &SUPPLY_CATALOG
    }
}

pub struct Supplies;
impl Resource for Supplies {
    fn spec() -> &'static ResourceSpec {
        &SUPPLIES
    }
}

/// Claves de `/insumos/aux`; hoy no hay tablas auxiliares para insumos.
pub const AUX_KEYS: [&str; 6] = ["tipos", "clasif", "unidades", "estado", "recipiente", "almacen"];
