// src/models/materials.rs
// Materiales volumétricos y materiales de referencia.

use crate::common::fields::Column;
use crate::models::auth::ADMINS;
use crate::models::history::{History, HistorySpec};
use crate::models::resource::{ListShape, Messages, Reply, Resource, ResourceSpec};

pub static VOLUMETRIC: ResourceSpec = ResourceSpec {
    table: "material_volumetrico",
    key: Column::text("codigo_id"),
    generated_key: false,
    columns: &[
        Column::text("nombre_material"),
        Column::text("volumen_nominal"),
        Column::text("rango_volumen"),
        Column::text("marca"),
        Column::text("resolucion"),
        Column::text("error_max_permitido"),
        Column::text("modelo"),
    ],
    required: &["codigo_id", "nombre_material"],
    search: &["t.codigo_id", "t.nombre_material", "t.marca"],
    order_by: "t.codigo_id",
    listing: ListShape::Capped,
    projection: &[],
    hidden: &[],
    module: "MATERIAL_VOLUMETRICO",
    stock: None,
    counter: None,
    dependents: None,
    delete_roles: ADMINS,
    prepare: None,
    created: Reply::Message("Material volumétrico registrado correctamente"),
    updated: Reply::Row,
    messages: Messages {
        not_found: "Material no encontrado",
        duplicate: "Ya existe un material con ese código",
        in_use: "No se puede eliminar: el material tiene historial o intervalos registrados",
        missing_parent: "Referencia inválida",
        delete_forbidden: "No tienes permisos para eliminar materiales. Solo administradores pueden realizar esta acción.",
        deleted: "Material volumétrico eliminado correctamente",
    },
};

pub static REFERENCE: ResourceSpec = ResourceSpec {
    table: "material_referencia",
    key: Column::text("codigo_id"),
    generated_key: false,
    columns: &[
        Column::text("nombre_material"),
        Column::text("rango_medicion"),
        Column::text("marca"),
        Column::text("serie"),
        Column::text("error_max_permitido"),
        Column::text("modelo"),
    ],
    required: &["codigo_id", "nombre_material"],
    search: &["t.codigo_id", "t.nombre_material", "t.marca"],
    order_by: "t.codigo_id",
    listing: ListShape::Capped,
    projection: &[],
    hidden: &[],
    module: "MATERIAL_REFERENCIA",
    stock: None,
    counter: None,
    dependents: None,
    delete_roles: ADMINS,
    prepare: None,
    created: Reply::Message("Material de referencia registrado correctamente"),
    updated: Reply::Message("Material de referencia actualizado correctamente"),
    messages: Messages {
        not_found: "Material no encontrado",
        duplicate: "Ya existe un material con ese código",
        in_use: "No se puede eliminar: el material tiene historial o intervalos registrados",
        missing_parent: "Referencia inválida",
        delete_forbidden: "No tienes permisos para eliminar materiales. Solo administradores pueden realizar esta acción.",
        deleted: "Material de referencia eliminado correctamente",
    },
};

pub struct Volumetric;
impl Resource for Volumetric {
    fn spec() -> &'static ResourceSpec {
        &VOLUMETRIC
    }
}

pub struct ReferenceMaterial;
impl Resource for ReferenceMaterial {
    fn spec() -> &'static ResourceSpec {
        &REFERENCE
    }
}

// Historial e intervalo comparten columnas entre ambos tipos de material.
const HISTORY_COLUMNS: &[Column] = &[
    Column::date("fecha"),
    Column::text("tipo_historial_instrumento"),
    Column::text("codigo_registro"),
    Column::text("realizo"),
    Column::text("superviso"),
    Column::text("observaciones"),
];

const INTERVAL_COLUMNS: &[Column] = &[
    Column::decimal("valor_nominal"),
    Column::date("fecha_c1"),
    Column::decimal("error_c1"),
    Column::date("fecha_c2"),
    Column::decimal("error_c2"),
    Column::integer("diferencia_tiempo_dias"),
    Column::decimal("desviacion_abs"),
    Column::decimal("deriva"),
    Column::decimal("tolerancia"),
    Column::decimal("intervalo_calibracion_dias"),
    Column::decimal("intervalo_calibracion_anos"),
    Column::decimal("incertidumbre_exp"),
];

pub static VOLUMETRIC_HISTORY: HistorySpec = HistorySpec {
    table: "historial_volumetrico",
    parent: "codigo_material",
    columns: HISTORY_COLUMNS,
    module: "HISTORIAL_VOLUMETRICO",
    created: "Historial volumétrico registrado correctamente",
    parent_missing: "Material no encontrado",
    next_key: "nextConsecutivo",
};

pub static VOLUMETRIC_INTERVAL: HistorySpec = HistorySpec {
    table: "intervalo_volumetrico",
    parent: "codigo_material",
    columns: INTERVAL_COLUMNS,
    module: "INTERVALO_VOLUMETRICO",
    created: "Intervalo volumétrico registrado correctamente",
    parent_missing: "Material no encontrado",
    next_key: "nextConsecutivo",
};

pub static REFERENCE_HISTORY: HistorySpec = HistorySpec {
    table: "historial_referencia",
    parent: "codigo_material",
    columns: HISTORY_COLUMNS,
    module: "HISTORIAL_REFERENCIA",
    created: "Historial de referencia registrado correctamente",
    parent_missing: "Material no encontrado",
    next_key: "next",
};

pub static REFERENCE_INTERVAL: HistorySpec = HistorySpec {
    table: "intervalo_referencia",
    parent: "codigo_material",
    columns: INTERVAL_COLUMNS,
    module: "INTERVALO_REFERENCIA",
    created: "Intervalo de referencia registrado correctamente",
    parent_missing: "Material no encontrado",
    next_key: "next",
};

pub struct VolumetricHistory;
impl History for VolumetricHistory {
    fn spec() -> &'static HistorySpec {
        &VOLUMETRIC_HISTORY
    }
}

pub struct VolumetricInterval;
impl History for VolumetricInterval {
    fn spec() -> &'static HistorySpec {
        &VOLUMETRIC_INTERVAL
    }
}

pub struct ReferenceHistory;
impl History for ReferenceHistory {
    fn spec() -> &'static HistorySpec {
        &REFERENCE_HISTORY
    }
}

pub struct ReferenceInterval;
impl History for ReferenceInterval {
    fn spec() -> &'static HistorySpec {
        &REFERENCE_INTERVAL
    }
}
