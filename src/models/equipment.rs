// src/models/equipment.rs

use crate::common::fields::Column;
use crate::models::auth::ADMINS;
use crate::models::history::{History, HistorySpec};
use crate::models::resource::{ListShape, Messages, Reply, Resource, ResourceSpec};

// Hoja de vida del equipo.
pub static EQUIPMENT: ResourceSpec = ResourceSpec {
    table: "hv_equipos",
    key: Column::text("codigo_identificacion"),
    generated_key: false,
    columns: &[
        Column::text("nombre"),
        Column::text("modelo"),
        Column::text("marca"),
        Column::text("inventario_sena"),
        Column::text("ubicacion"),
        Column::text("acreditacion"),
        Column::text("tipo_manual"),
        Column::text("numero_serie"),
        Column::text("tipo"),
        Column::text("clasificacion"),
        Column::text("manual_usuario"),
        Column::date("puesta_en_servicio"),
        Column::date("fecha_adquisicion"),
        Column::text("requerimientos_equipo"),
        Column::text("elementos_electricos"),
        Column::text("voltaje"),
        Column::text("elementos_mecanicos"),
        Column::text("frecuencia"),
        Column::text("campo_medicion"),
        Column::text("exactitud"),
        Column::text("sujeto_verificar"),
        Column::text("sujeto_calibracion"),
        Column::text("resolucion_division"),
        Column::text("sujeto_calificacion"),
        Column::text("accesorios"),
    ],
    required: &["codigo_identificacion", "nombre"],
    search: &["t.codigo_identificacion", "t.nombre", "t.marca"],
    order_by: "t.codigo_identificacion",
    listing: ListShape::Capped,
    projection: &[],
    hidden: &[],
    module: "EQUIPOS",
    stock: None,
    counter: None,
    dependents: None,
    delete_roles: ADMINS,
    prepare: None,
    created: Reply::Message("Equipo registrado correctamente"),
    updated: Reply::Row,
    messages: Messages {
        not_found: "Equipo no encontrado",
        duplicate: "Ya existe un equipo con ese código",
        in_use: "No se puede eliminar: el equipo tiene registros asociados",
        missing_parent: "Referencia inválida",
        delete_forbidden: "No tienes permisos para eliminar equipos. Solo administradores pueden realizar esta acción.",
        deleted: "Equipo eliminado correctamente",
    },
};

// Ficha técnica, una por equipo; `cargo_y_firma` es una imagen.
pub static TECH_SHEET: ResourceSpec = ResourceSpec {
    table: "ficha_tecnica_de_equipos",
    key: Column::text("codigo_identificador"),
    generated_key: false,
    columns: &[
        Column::text("nombre"),
        Column::text("marca"),
        Column::text("modelo"),
        Column::text("serie"),
        Column::text("fabricante"),
        Column::date("fecha_adq"),
        Column::text("uso"),
        Column::date("fecha_func"),
        Column::decimal("precio"),
        Column::text("accesorios"),
        Column::text("manual_ope"),
        Column::text("idioma_manual"),
        Column::text("magnitud"),
        Column::text("resolucion"),
        Column::text("precision_med"),
        Column::text("exactitud"),
        Column::text("rango_de_medicion"),
        Column::text("rango_de_uso"),
        Column::text("voltaje"),
        Column::text("potencia"),
        Column::text("amperaje"),
        Column::text("frecuencia"),
        Column::decimal("ancho"),
        Column::decimal("alto"),
        Column::decimal("peso_kg"),
        Column::decimal("profundidad"),
        Column::decimal("temperatura_c"),
        Column::decimal("humedad_porcentaje"),
        Column::text("limitaciones_e_interferencias"),
        Column::text("otros"),
        Column::text("especificaciones_software"),
        Column::text("proveedor"),
        Column::text("email"),
        Column::text("telefono"),
        Column::date("fecha_de_instalacion"),
        Column::text("alcance_del_servicio"),
        Column::text("garantia"),
        Column::text("observaciones"),
        Column::text("recibido_por"),
        Column::bytes("cargo_y_firma"),
        Column::date("fecha"),
    ],
    required: &["codigo_identificador"],
    search: &["t.codigo_identificador", "t.nombre"],
    order_by: "t.codigo_identificador",
    listing: ListShape::Capped,
    projection: &["codigo_identificador", "nombre", "marca", "modelo"],
    hidden: &["cargo_y_firma"],
    module: "FICHA_TECNICA",
    stock: None,
    counter: None,
    dependents: None,
    delete_roles: ADMINS,
    prepare: None,
    created: Reply::Message("Ficha técnica registrada correctamente"),
    updated: Reply::Row,
    messages: Messages {
        not_found: "Ficha técnica no encontrada",
        duplicate: "El equipo ya tiene ficha técnica",
        in_use: "No se puede eliminar la ficha técnica",
        missing_parent: "Equipo no encontrado",
        delete_forbidden: "No tienes permisos para eliminar. Solo administradores.",
        deleted: "Ficha técnica eliminada",
    },
};

pub struct Equipment;
impl Resource for Equipment {
    fn spec() -> &'static ResourceSpec {
        &EQUIPMENT
    }
}

pub struct TechSheet;
impl Resource for TechSheet {
    fn spec() -> &'static ResourceSpec {
        &TECH_SHEET
    }
}

pub static EQUIPMENT_HISTORY: HistorySpec = HistorySpec {
    table: "historial_hv",
    parent: "equipo_id",
    columns: &[
        Column::date("fecha"),
        Column::text("tipo_historial"),
        Column::text("codigo_registro"),
        Column::decimal("tolerancia_g"),
        Column::decimal("tolerancia_error_g"),
        Column::decimal("incertidumbre_u"),
        Column::text("realizo"),
        Column::text("superviso"),
        Column::text("observaciones"),
    ],
    module: "HISTORIAL_EQUIPOS",
    created: "Historial registrado correctamente",
    parent_missing: "Equipo no encontrado",
    next_key: "next",
};

pub static EQUIPMENT_INTERVAL: HistorySpec = HistorySpec {
    table: "intervalo_hv",
    parent: "equipo_id",
    columns: &[
        Column::decimal("unidad_nominal_g"),
        Column::text("calibracion_1"),
        Column::date("fecha_c1"),
        Column::decimal("error_c1_g"),
        Column::text("calibracion_2"),
        Column::date("fecha_c2"),
        Column::decimal("error_c2_g"),
        Column::integer("diferencia_dias"),
        Column::decimal("desviacion"),
        Column::decimal("deriva"),
        Column::decimal("tolerancia_g"),
        Column::decimal("intervalo_calibraciones_dias"),
        Column::decimal("intervalo_calibraciones_anios"),
    ],
    module: "INTERVALO_EQUIPOS",
    created: "Intervalo registrado correctamente",
    parent_missing: "Equipo no encontrado",
    next_key: "next",
};

pub struct EquipmentHistory;
impl History for EquipmentHistory {
    fn spec() -> &'static HistorySpec {
        &EQUIPMENT_HISTORY
    }
}

pub struct EquipmentInterval;
impl History for EquipmentInterval {
    fn spec() -> &'static HistorySpec {
        &EQUIPMENT_INTERVAL
    }
}

/// Columnas de `/equipos/completo/:codigo`.
pub const SUMMARY_COLUMNS: &[&str] = &[
    "codigo_identificacion",
    "nombre",
    "marca",
    "modelo",
    "numero_serie",
    "fecha_adquisicion",
    "puesta_en_servicio",
    "voltaje",
    "frecuencia",
    "accesorios",
];
