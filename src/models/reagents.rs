// src/models/reagents.rs

use crate::common::fields::{Column, Fields, SqlValue, WriteMode};
use crate::models::auth::ADMINS;
use crate::models::resource::{Dependents, ListShape, Messages, Reply, Resource, ResourceSpec, StockSpec};

pub static REAGENT_CATALOG: ResourceSpec = ResourceSpec {
    table: "catalogo_reactivos",
    key: Column::text("codigo"),
    generated_key: false,
    columns: &[
        Column::text("nombre"),
        Column::text("tipo_reactivo"),
        Column::text("clasificacion_sga"),
        Column::text("descripcion"),
    ],
    required: &["codigo", "nombre"],
    search: &["t.codigo", "t.nombre"],
    order_by: "t.codigo",
    listing: ListShape::Paged,
    projection: &[],
    hidden: &[],
    module: "CATALOGO_REACTIVOS",
    stock: None,
    counter: None,
    dependents: Some(Dependents {
        table: "reactivos",
        column: "codigo",
        message: "No se puede eliminar del catálogo: existen {n} reactivo(s) que referencian este código",
    }),
    delete_roles: ADMINS,
    prepare: None,
    created: Reply::Row,
    updated: Reply::Row,
    messages: Messages {
        not_found: "No encontrado",
        duplicate: "Código ya existe en catálogo",
        in_use: "No se puede eliminar del catálogo: existen reactivos que referencian este código",
        missing_parent: "Referencia inválida",
        delete_forbidden: "No tienes permisos para eliminar del catálogo. Solo administradores pueden realizar esta acción.",
        deleted: "Eliminado del catálogo",
    },
};

pub static REAGENTS: ResourceSpec = ResourceSpec {
    table: "reactivos",
    key: Column::text("lote"),
    generated_key: false,
    columns: &[
        Column::text("codigo"),
        Column::text("nombre"),
        Column::text("marca"),
        Column::text("referencia"),
        Column::text("cas"),
        Column::decimal("presentacion"),
        Column::decimal("presentacion_cant"),
        Column::decimal("cantidad_total"),
        Column::date("fecha_adquisicion"),
        Column::date("fecha_vencimiento"),
        Column::text("observaciones"),
        Column::integer("tipo_id"),
        Column::integer("clasificacion_id"),
        Column::integer("unidad_id"),
        Column::integer("estado_id"),
        Column::integer("almacenamiento_id"),
        Column::integer("tipo_recipiente_id"),
    ],
    required: &["lote", "codigo", "nombre"],
    search: &["t.lote", "t.codigo", "t.nombre", "t.marca"],
    order_by: "t.fecha_creacion DESC, t.lote",
    listing: ListShape::Paged,
    projection: &[],
    hidden: &[],
    module: "REACTIVOS",
    stock: Some(StockSpec {
        product: "REACTIVO",
        existing: "cantidad_total",
    }),
    counter: None,
    dependents: None,
    delete_roles: ADMINS,
    prepare: Some(derive_total),
    created: Reply::Message("Creado"),
    updated: Reply::Message("Actualizado"),
    messages: Messages {
        not_found: "No encontrado",
        duplicate: "Lote ya existe",
        in_use: "No se puede eliminar: el reactivo tiene registros asociados",
        missing_parent: "El código no existe en el catálogo o una referencia auxiliar es inválida",
        delete_forbidden: "No tienes permisos para eliminar reactivos. Solo administradores pueden realizar esta acción.",
        deleted: "Eliminado",
    },
};

/// `cantidad_total` = presentación x cantidad de presentaciones, si no viene explícita.
fn derive_total(fields: &mut Fields, _mode: WriteMode) {
    if !fields.is_blank("cantidad_total") {
        return;
    }
    let per_unit = fields.get("presentacion").and_then(SqlValue::as_decimal);
    let units = fields.get("presentacion_cant").and_then(SqlValue::as_decimal);
    if let (Some(per_unit), Some(units)) = (per_unit, units) {
        fields.set("cantidad_total", SqlValue::Decimal(per_unit * units));
    }
}

pub struct ReagentCatalog;
impl Resource for ReagentCatalog {
    fn spec() -> &'static ResourceSpec {
        &REAGENT_CATALOG
    }
}

pub struct Reagents;
impl Resource for Reagents {
    fn spec() -> &'static ResourceSpec {
        &REAGENTS
    }
}

/// Tablas auxiliares de `/reactivos/aux`: (clave en la respuesta, tabla).
pub const LOOKUP_TABLES: [(&str, &str); 6] = [
    ("tipos", "tipo_reactivo"),
    ("clasif", "clasificacion_sga"),
    ("unidades", "unidades"),
    ("estado", "estado_fisico"),
    ("recipiente", "tipo_recipiente"),
    ("almacen", "almacenamiento"),
];

// ---
// Documentos PDF por lote
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReagentDocument {
    SafetySheet,
    AnalysisCertificate,
}

impl ReagentDocument {
    pub fn table(&self) -> &'static str {
        match self {
            ReagentDocument::SafetySheet => "hoja_seguridad",
            ReagentDocument::AnalysisCertificate => "cert_analisis",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            ReagentDocument::SafetySheet => "hoja-seguridad",
            ReagentDocument::AnalysisCertificate => "cert-analisis",
        }
    }

    pub fn not_found(&self) -> &'static str {
        match self {
            ReagentDocument::SafetySheet => "Hoja de seguridad no encontrada",
            ReagentDocument::AnalysisCertificate => "Certificado de análisis no encontrado",
        }
    }

    pub fn delete_forbidden(&self) -> &'static str {
        match self {
            ReagentDocument::SafetySheet => "No tienes permisos para eliminar hojas de seguridad. Solo administradores.",
            ReagentDocument::AnalysisCertificate => "No tienes permisos para eliminar certificados. Solo administradores.",
        }
    }

    /// Subir o borrar por código de catálogo no aplica: los PDFs van por lote.
    pub fn by_code_unsupported(&self, verb: &str) -> String {
        format!(
            "{verb} por catálogo no soportada. Use la ruta por lote: /api/reactivos/:lote/{}",
            self.slug()
        )
    }

    /// URL relativa de visualización, como la consume el frontend.
    pub fn view_url(&self, lote: &str) -> String {
        format!("{}/{}/view", encode_segment(lote), self.slug())
    }

    pub fn catalog_view_url(&self, codigo: &str) -> String {
        format!("catalogo/{}/{}/view", encode_segment(codigo), self.slug())
    }
}

// Codificación de un segmento de URL (caracteres no reservados quedan igual).
fn encode_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn total_is_derived_when_absent() {
        let mut fields = Fields::new();
        fields.set("presentacion", SqlValue::Decimal(Decimal::new(500, 0)));
        fields.set("presentacion_cant", SqlValue::Integer(3));
        derive_total(&mut fields, WriteMode::Create);
        assert_eq!(fields.get("cantidad_total"), Some(&SqlValue::Decimal(Decimal::new(1500, 0))));
    }

    #[test]
    fn explicit_total_wins() {
        let mut fields = Fields::new();
        fields.set("presentacion", SqlValue::Decimal(Decimal::new(500, 0)));
        fields.set("presentacion_cant", SqlValue::Decimal(Decimal::new(3, 0)));
        fields.set("cantidad_total", SqlValue::Decimal(Decimal::new(20, 0)));
        derive_total(&mut fields, WriteMode::Create);
        assert_eq!(fields.get("cantidad_total"), Some(&SqlValue::Decimal(Decimal::new(20, 0))));
    }

    #[test]
    fn document_urls() {
        assert_eq!(ReagentDocument::SafetySheet.view_url("L-7"), "L-7/hoja-seguridad/view");
        assert_eq!(ReagentDocument::SafetySheet.view_url("L 7/b"), "L%207%2Fb/hoja-seguridad/view");
        assert_eq!(
            ReagentDocument::AnalysisCertificate.catalog_view_url("R-01"),
            "catalogo/R-01/cert-analisis/view"
        );
        assert_eq!(ReagentDocument::AnalysisCertificate.table(), "cert_analisis");
    }
}
