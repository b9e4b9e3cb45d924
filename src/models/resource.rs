// src/models/resource.rs
//
// Descripción declarativa de una tabla CRUD. Los nombres de tabla y columna
// solo salen de estas definiciones estáticas, nunca del request.

use serde_json::{json, Map, Value};

use crate::common::fields::{Column, Fields, WriteMode};
use crate::models::auth::Role;

/// Forma del listado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListShape {
    /// Arreglo completo sin `limit`; `{rows, total}` con `limit` (y `offset`).
    Paged,
    /// Siempre arreglo; `limit` solo recorta.
    Capped,
    /// Siempre arreglo, con tope fijo.
    Fixed(i64),
}

/// Respuesta de create/update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// `{ message }`
    Message(&'static str),
    /// La fila guardada (sin columnas ocultas).
    Row,
    /// `{ <llave>: valor }`
    Key,
    /// `{ <bandera>: true }`
    Flag(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct StockSpec {
    /// Etiqueta `producto_tipo` de los movimientos.
    pub product: &'static str,
    /// Columna de existencias.
    pub existing: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct Dependents {
    pub table: &'static str,
    pub column: &'static str,
    /// Plantilla con `{n}`.
    pub message: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct Messages {
    /// Plantilla con `{key}`.
    pub not_found: &'static str,
    pub duplicate: &'static str,
    /// Violación de llave foránea: al borrar, hay dependientes; al escribir, falta el padre.
    pub in_use: &'static str,
    pub missing_parent: &'static str,
    pub delete_forbidden: &'static str,
    pub deleted: &'static str,
}

pub struct ResourceSpec {
    pub table: &'static str,
    pub key: Column,
    /// Llave generada por la base (SERIAL); no se acepta en el cuerpo.
    pub generated_key: bool,
    /// Columnas escribibles, sin la llave.
    pub columns: &'static [Column],
    pub required: &'static [&'static str],
    /// Expresiones SQL sobre el alias `t` comparadas con ILIKE.
    pub search: &'static [&'static str],
    pub order_by: &'static str,
    pub listing: ListShape,
    /// Si no está vacío, el listado devuelve solo estas columnas.
    pub projection: &'static [&'static str],
    /// Columnas binarias que nunca salen en JSON.
    pub hidden: &'static [&'static str],
    pub module: &'static str,
    pub stock: Option<StockSpec>,
    /// Columna numérica que toma MAX + 1 cuando no viene en el alta.
    pub counter: Option<&'static str>,
    pub dependents: Option<Dependents>,
    pub delete_roles: &'static [Role],
    /// Ajustes propios del dominio antes de escribir.
    pub prepare: Option<fn(&mut Fields, WriteMode)>,
    pub created: Reply,
    pub updated: Reply,
    pub messages: Messages,
}

impl ResourceSpec {
    /// Columnas aceptadas en un alta.
    pub fn insertable(&self) -> impl Iterator<Item = &Column> {
        let key = (!self.generated_key).then_some(&self.key);
        key.into_iter().chain(self.columns.iter())
    }

    pub fn not_found(&self, key: &str) -> String {
        self.messages.not_found.replace("{key}", key)
    }

    /// Expresión JSON de una fila del alias `t`.
    pub fn row_json(&self, projected: bool) -> String {
        if projected && !self.projection.is_empty() {
            let pairs: Vec<String> = self
                .projection
                .iter()
                .map(|c| format!("'{c}', t.{c}"))
                .collect();
            return format!("jsonb_build_object({})", pairs.join(", "));
        }
        let mut expr = String::from("to_jsonb(t)");
        for column in self.hidden {
            expr.push_str(&format!(" - '{}'", column));
        }
        expr
    }

    pub fn reply(&self, reply: Reply, row: Value) -> Value {
        match reply {
            Reply::Message(message) => json!({ "message": message }),
            Reply::Row => row,
            Reply::Key => {
                let mut body = Map::new();
                body.insert(
                    self.key.name.to_string(),
                    row.get(self.key.name).cloned().unwrap_or(Value::Null),
                );
                Value::Object(body)
            }
            Reply::Flag(flag) => {
                let mut body = Map::new();
                body.insert(flag.to_string(), Value::Bool(true));
                Value::Object(body)
            }
        }
    }
}

/// Marca de tipo para instanciar los handlers genéricos por dominio.
pub trait Resource: Send + Sync + 'static {
    fn spec() -> &'static ResourceSpec;
}

/// Texto de una llave devuelta en JSON.
pub fn key_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{reagents::REAGENT_CATALOG, supplies::SUPPLY_CATALOG};

    #[test]
    fn row_json_strips_hidden_columns() {
        assert_eq!(SUPPLY_CATALOG.row_json(true), "to_jsonb(t) - 'imagen'");
    }

    #[test]
    fn insertable_includes_natural_keys() {
        let names: Vec<&str> = REAGENT_CATALOG.insertable().map(|c| c.name).collect();
        assert_eq!(names.first(), Some(&"codigo"));
        assert!(names.contains(&"clasificacion_sga"));
    }

    #[test]
    fn replies() {
        let row = json!({ "codigo": "R-01", "nombre": "Acid" });
        assert_eq!(REAGENT_CATALOG.reply(Reply::Key, row.clone()), json!({ "codigo": "R-01" }));
        assert_eq!(REAGENT_CATALOG.reply(Reply::Flag("updated"), row.clone()), json!({ "updated": true }));
        assert_eq!(REAGENT_CATALOG.reply(Reply::Row, row.clone()), row);
        assert_eq!(
            SUPPLY_CATALOG.not_found("15"),
            "No encontrado en catálogo (item: 15)"
        );
    }
}
