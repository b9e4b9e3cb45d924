// src/models/requests.rs

use chrono::Utc;

use crate::common::fields::{Column, Fields, SqlValue, WriteMode};
use crate::models::auth::ADMINS;
use crate::models::resource::{ListShape, Messages, Reply, Resource, ResourceSpec};

pub static CLIENTS: ResourceSpec = ResourceSpec {
    table: "clientes",
    key: Column::integer("id_cliente"),
    generated_key: true,
    columns: &[
        Column::integer("numero"),
        Column::date("fecha_vinculacion"),
        Column::text("tipo_usuario"),
        Column::text("razon_social"),
        Column::text("nit"),
        Column::text("nombre_solicitante"),
        Column::text("tipo_identificacion"),
        Column::text("numero_identificacion"),
        Column::text("sexo"),
        Column::text("tipo_poblacion"),
        Column::text("direccion"),
        Column::text("id_ciudad"),
        Column::text("id_departamento"),
        Column::text("celular"),
        Column::text("telefono"),
        Column::text("correo_electronico"),
        Column::text("tipo_vinculacion"),
        Column::text("registro_realizado_por"),
        Column::text("observaciones"),
        Column::boolean("activo"),
    ],
    required: &["nombre_solicitante", "tipo_identificacion", "numero_identificacion"],
    search: &["t.nombre_solicitante", "t.correo_electronico"],
    order_by: "t.id_cliente DESC",
    listing: ListShape::Fixed(200),
    projection: &[
        "id_cliente",
        "nombre_solicitante",
        "numero_identificacion",
        "correo_electronico",
        "id_ciudad",
        "id_departamento",
        "activo",
    ],
    hidden: &[],
    module: "CLIENTES",
    stock: None,
    counter: Some("numero"),
    dependents: None,
    delete_roles: ADMINS,
    prepare: Some(client_defaults),
    created: Reply::Key,
    updated: Reply::Flag("updated"),
    messages: Messages {
        not_found: "Cliente no encontrado",
        duplicate: "El cliente ya existe",
        in_use: "No se puede eliminar: el cliente tiene solicitudes asociadas",
        missing_parent: "Ciudad o departamento inválido",
        delete_forbidden: "No tienes permisos para eliminar clientes. Solo administradores pueden realizar esta acción.",
        deleted: "Cliente eliminado",
    },
};

/// Valores por defecto del alta de clientes.
fn client_defaults(fields: &mut Fields, mode: WriteMode) {
    if fields.get("activo").is_some_and(SqlValue::is_null) {
        fields.remove("activo");
    }
    if mode != WriteMode::Create {
        return;
    }
    if fields.is_blank("fecha_vinculacion") {
        fields.set("fecha_vinculacion", SqlValue::Date(Utc::now().date_naive()));
    }
    if fields.is_blank("tipo_usuario") {
        fields.set("tipo_usuario", SqlValue::Text("Persona Natural".into()));
    }
    if fields.is_blank("sexo") {
        fields.set("sexo", SqlValue::Text("Otro".into()));
    }
}

// `solicitud_id` es SERIAL pero se acepta explícito en el alta.
pub static REQUESTS: ResourceSpec = ResourceSpec {
    table: "solicitudes",
    key: Column::integer("solicitud_id"),
    generated_key: false,
    columns: &[
        Column::integer("id_cliente"),
        Column::text("tipo_solicitud"),
        Column::text("nombre_muestra"),
        Column::date("fecha_solicitud"),
        Column::text("lote_producto"),
        Column::date("fecha_vencimiento_muestra"),
        Column::text("tipo_muestra"),
        Column::text("tipo_empaque"),
        Column::text("analisis_requerido"),
        Column::boolean("req_analisis"),
        Column::integer("cant_muestras"),
        Column::text("solicitud_recibida"),
        Column::date("fecha_entrega_muestra"),
        Column::text("recibe_personal"),
        Column::text("cargo_personal"),
        Column::text("observaciones"),
    ],
    required: &["id_cliente"],
    search: &["t.nombre_muestra", "t.tipo_solicitud", "t.lote_producto"],
    order_by: "t.solicitud_id DESC",
    listing: ListShape::Fixed(500),
    projection: &[],
    hidden: &[],
    module: "SOLICITUDES",
    stock: None,
    counter: None,
    dependents: None,
    delete_roles: ADMINS,
    prepare: Some(drop_blank_key),
    created: Reply::Key,
    updated: Reply::Flag("updated"),
    messages: Messages {
        not_found: "Solicitud no encontrada",
        duplicate: "Ya existe una solicitud con ese número",
        in_use: "No se puede eliminar: la solicitud tiene registros asociados",
        missing_parent: "El cliente no existe",
        delete_forbidden: "No tienes permisos para eliminar solicitudes. Solo administradores pueden realizar esta acción.",
        deleted: "Solicitud eliminada",
    },
};

// Sin número explícito lo asigna la secuencia.
fn drop_blank_key(fields: &mut Fields, _mode: WriteMode) {
    if fields.get("solicitud_id").is_some_and(SqlValue::is_null) {
        fields.remove("solicitud_id");
    }
}

pub struct Clients;
impl Resource for Clients {
    fn spec() -> &'static ResourceSpec {
        &CLIENTS
    }
}

pub struct Requests;
impl Resource for Requests {
    fn spec() -> &'static ResourceSpec {
        &REQUESTS
    }
}

// ---
// Seguimiento de la solicitud: una fila por solicitud en cada tabla
// ---
pub struct FollowUpSpec {
    pub table: &'static str,
    pub columns: &'static [Column],
}

pub static OFFER: FollowUpSpec = FollowUpSpec {
    table: "oferta",
    columns: &[
        Column::boolean("genero_cotizacion"),
        Column::decimal("valor_cotizacion"),
        Column::date("fecha_envio_oferta"),
        Column::boolean("realizo_seguimiento_oferta"),
        Column::text("observacion_oferta"),
    ],
};

pub static OFFER_REVIEW: FollowUpSpec = FollowUpSpec {
    table: "revision_oferta",
    columns: &[
        Column::date("fecha_limite_entrega"),
        Column::date("fecha_envio_resultados"),
        Column::boolean("servicio_es_viable"),
    ],
};

pub static SURVEY_FOLLOW_UP: FollowUpSpec = FollowUpSpec {
    table: "seguimiento_encuesta",
    columns: &[
        Column::date("fecha_encuesta"),
        Column::text("comentarios"),
        Column::boolean("recomendaria_servicio"),
        Column::boolean("cliente_respondio"),
        Column::boolean("solicito_nueva_encuesta"),
    ],
};

impl FollowUpSpec {
    /// Reemplazo completo: columnas ausentes quedan en NULL y los booleanos en `false`.
    pub fn complete(&self, mut fields: Fields) -> Fields {
        for column in self.columns {
            if fields.get(column.name).is_none_or(SqlValue::is_null) {
                let value = match column.kind {
                    crate::common::fields::FieldKind::Bool => SqlValue::Bool(false),
                    kind => SqlValue::Null(kind),
                };
                fields.set(column.name, value);
            }
        }
        fields
    }
}

/// Columnas de la encuesta de satisfacción.
pub const SURVEY_COLUMNS: &[Column] = &[
    Column::date("fecha_encuesta"),
    Column::integer("puntuacion_satisfaccion"),
    Column::text("comentarios"),
    Column::boolean("recomendaria_servicio"),
];

/// Banderas de la solicitud que actualiza la encuesta.
pub const SURVEY_FLAGS: &[Column] = &[
    Column::boolean("cliente_respondio_encuesta"),
    Column::boolean("solicito_nueva_encuesta"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_defaults_fill_only_on_create() {
        let mut fields = Fields::new();
        fields.set("sexo", SqlValue::Text("F".into()));
        client_defaults(&mut fields, WriteMode::Create);
        assert_eq!(fields.get("sexo"), Some(&SqlValue::Text("F".into())));
        assert_eq!(fields.get("tipo_usuario"), Some(&SqlValue::Text("Persona Natural".into())));
        assert!(matches!(fields.get("fecha_vinculacion"), Some(SqlValue::Date(_))));

        let mut patch = Fields::new();
        client_defaults(&mut patch, WriteMode::Patch);
        assert!(patch.is_empty());
    }

    #[test]
    fn follow_up_is_a_full_replacement() {
        let mut fields = Fields::new();
        fields.set("valor_cotizacion", SqlValue::Integer(1200));
        let complete = OFFER.complete(fields);
        assert_eq!(complete.len(), OFFER.columns.len());
        assert_eq!(complete.get("genero_cotizacion"), Some(&SqlValue::Bool(false)));
        assert_eq!(complete.get("valor_cotizacion"), Some(&SqlValue::Integer(1200)));
    }
}
