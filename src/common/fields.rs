// src/common/fields.rs
//
// Normalización de los cuerpos JSON hacia valores tipados para SQL.
// Reglas: texto vacío -> NULL, números no numéricos -> NULL (o 400 si el
// campo es obligatorio), fechas en formato AAAA-MM-DD.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use sqlx::{Postgres, QueryBuilder};

use crate::common::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Decimal,
    Date,
    Bool,
    Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl Column {
    pub const fn text(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Text }
    }
    pub const fn integer(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Integer }
    }
    pub const fn decimal(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Decimal }
    }
    pub const fn date(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Date }
    }
    pub const fn boolean(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Bool }
    }
    pub const fn bytes(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Bytes }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null(FieldKind),
    Text(String),
    Integer(i64),
    Decimal(Decimal),
    Date(NaiveDate),
    Bool(bool),
    Bytes(Vec<u8>),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null(_))
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            SqlValue::Decimal(d) => Some(*d),
            SqlValue::Integer(i) => Some(Decimal::from(*i)),
            _ => None,
        }
    }

    /// Representación textual, usada como referencia de producto en los movimientos.
    pub fn to_key_string(&self) -> Option<String> {
        match self {
            SqlValue::Text(s) => Some(s.clone()),
            SqlValue::Integer(i) => Some(i.to_string()),
            SqlValue::Decimal(d) => Some(d.to_string()),
            SqlValue::Date(d) => Some(d.to_string()),
            SqlValue::Bool(b) => Some(b.to_string()),
            SqlValue::Null(_) | SqlValue::Bytes(_) => None,
        }
    }

    /// Interpreta un segmento de ruta como llave del tipo indicado.
    /// `None` significa que ninguna fila puede tener esa llave.
    pub fn parse_key(kind: FieldKind, raw: &str) -> Option<SqlValue> {
        match coerce(kind, &Value::String(raw.to_string())) {
            Coerced::Value(v) => Some(v),
            Coerced::Blank | Coerced::Invalid => None,
        }
    }
}

/// Agrega el valor como parámetro ligado, con el tipo correcto incluso para NULL.
pub fn push_value(qb: &mut QueryBuilder<'_, Postgres>, value: SqlValue) {
    match value {
        SqlValue::Null(kind) => match kind {
            FieldKind::Text => qb.push_bind(None::<String>),
            FieldKind::Integer => qb.push_bind(None::<i64>),
            FieldKind::Decimal => qb.push_bind(None::<Decimal>),
            FieldKind::Date => qb.push_bind(None::<NaiveDate>),
            FieldKind::Bool => qb.push_bind(None::<bool>),
            FieldKind::Bytes => qb.push_bind(None::<Vec<u8>>),
        },
        SqlValue::Text(v) => qb.push_bind(v),
        SqlValue::Integer(v) => qb.push_bind(v),
        SqlValue::Decimal(v) => qb.push_bind(v),
        SqlValue::Date(v) => qb.push_bind(v),
        SqlValue::Bool(v) => qb.push_bind(v),
        SqlValue::Bytes(v) => qb.push_bind(v),
    };
}

#[derive(Debug, PartialEq)]
pub enum Coerced {
    Value(SqlValue),
    Blank,
    Invalid,
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    raw.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(raw).ok())
}

const TRUTHY: [&str; 7] = ["1", "true", "si", "sí", "yes", "on", "s"];
const FALSY: [&str; 5] = ["0", "false", "no", "off", "n"];

pub fn coerce(kind: FieldKind, value: &Value) -> Coerced {
    if value.is_null() {
        return Coerced::Blank;
    }
    if let Value::String(s) = value {
        if s.trim().is_empty() {
            return Coerced::Blank;
        }
    }

    let coerced = match (kind, value) {
        (FieldKind::Text, Value::String(s)) => Some(SqlValue::Text(s.trim().to_string())),
        (FieldKind::Text, Value::Number(n)) => Some(SqlValue::Text(n.to_string())),
        (FieldKind::Text, Value::Bool(b)) => Some(SqlValue::Text(b.to_string())),

        (FieldKind::Integer, Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .map(SqlValue::Integer),
        (FieldKind::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(SqlValue::Integer),

        (FieldKind::Decimal, Value::Number(n)) => parse_decimal(&n.to_string()).map(SqlValue::Decimal),
        (FieldKind::Decimal, Value::String(s)) => parse_decimal(s.trim()).map(SqlValue::Decimal),

        (FieldKind::Date, Value::String(s)) => {
            let s = s.trim();
            let day = s.get(..10).unwrap_or(s);
            NaiveDate::parse_from_str(day, "%Y-%m-%d").ok().map(SqlValue::Date)
        }

        (FieldKind::Bool, Value::Bool(b)) => Some(SqlValue::Bool(*b)),
        (FieldKind::Bool, Value::Number(n)) => n.as_f64().map(|f| SqlValue::Bool(f != 0.0)),
        (FieldKind::Bool, Value::String(s)) => {
            let s = s.trim().to_lowercase();
            if TRUTHY.contains(&s.as_str()) {
                Some(SqlValue::Bool(true))
            } else if FALSY.contains(&s.as_str()) {
                Some(SqlValue::Bool(false))
            } else {
                None
            }
        }

        _ => None,
    };

    coerced.map(Coerced::Value).unwrap_or(Coerced::Invalid)
}

fn invalid_message(column: &Column) -> String {
    match column.kind {
        FieldKind::Integer | FieldKind::Decimal => format!("El campo {} debe ser numérico", column.name),
        FieldKind::Date => format!("El campo {} debe ser una fecha válida (AAAA-MM-DD)", column.name),
        _ => format!("El campo {} tiene un valor inválido", column.name),
    }
}

pub fn body_object(body: &Value) -> Result<&Map<String, Value>, AppError> {
    body.as_object()
        .ok_or_else(|| AppError::validation("Se esperaba un objeto JSON"))
}

// ---
// Fields: lista ordenada columna -> valor, lista para INSERT/UPDATE
// ---
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(Vec<(&'static str, SqlValue)>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Todas las columnas presentes en el cuerpo; se validan los obligatorios.
    Create,
    /// Solo las columnas presentes en el cuerpo.
    Patch,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construye los valores a partir del cuerpo. Columnas binarias se ignoran:
    /// solo llegan por multipart.
    pub fn from_body<'a>(
        columns: impl IntoIterator<Item = &'a Column>,
        body: &Value,
        required: &[&str],
        mode: WriteMode,
    ) -> Result<Self, AppError> {
        let object = body_object(body)?;
        let mut fields = Fields::new();

        for column in columns {
            if column.kind == FieldKind::Bytes {
                continue;
            }
            let Some(raw) = object.get(column.name) else {
                continue;
            };
            let is_required = required.contains(&column.name);
            let value = match coerce(column.kind, raw) {
                Coerced::Value(v) => v,
                Coerced::Blank => SqlValue::Null(column.kind),
                Coerced::Invalid if is_required => {
                    return Err(AppError::validation(invalid_message(column)));
                }
                Coerced::Invalid => SqlValue::Null(column.kind),
            };
            fields.set(column.name, value);
        }

        if mode == WriteMode::Create {
            fields.check_required(required)?;
        }

        Ok(fields)
    }

    pub fn check_required(&self, required: &[&str]) -> Result<(), AppError> {
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|name| self.get(name).is_none_or(SqlValue::is_null))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation(format!(
                "Faltan campos requeridos: {}",
                missing.join(", ")
            )))
        }
    }

    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.0.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// `true` cuando el campo no vino o vino vacío.
    pub fn is_blank(&self, name: &str) -> bool {
        self.get(name).is_none_or(SqlValue::is_null)
    }

    pub fn set(&mut self, name: &'static str, value: SqlValue) {
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<SqlValue> {
        let index = self.0.iter().position(|(n, _)| *n == name)?;
        Some(self.0.remove(index).1)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(&'static str, SqlValue)> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<(&'static str, SqlValue)> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const COLUMNS: [Column; 5] = [
        Column::text("nombre"),
        Column::integer("item_catalogo"),
        Column::decimal("cantidad"),
        Column::date("fecha_adquisicion"),
        Column::boolean("activo"),
    ];

    #[test]
    fn blank_strings_become_null() {
        let fields = Fields::from_body(
            &COLUMNS,
            &json!({ "nombre": "   ", "fecha_adquisicion": "" }),
            &[],
            WriteMode::Patch,
        )
        .unwrap();

        assert_eq!(fields.get("nombre"), Some(&SqlValue::Null(FieldKind::Text)));
        assert_eq!(fields.get("fecha_adquisicion"), Some(&SqlValue::Null(FieldKind::Date)));
    }

    #[test]
    fn optional_non_numeric_becomes_null_but_required_is_rejected() {
        let lenient = Fields::from_body(&COLUMNS, &json!({ "cantidad": "abc" }), &[], WriteMode::Patch).unwrap();
        assert_eq!(lenient.get("cantidad"), Some(&SqlValue::Null(FieldKind::Decimal)));

        let strict = Fields::from_body(&COLUMNS, &json!({ "cantidad": "abc" }), &["cantidad"], WriteMode::Patch);
        match strict {
            Err(AppError::Validation(msg)) => assert!(msg.contains("cantidad")),
            other => panic!("se esperaba error de validación, llegó {:?}", other),
        }
    }

    #[test]
    fn create_lists_every_missing_required_field() {
        let err = Fields::from_body(
            &COLUMNS,
            &json!({ "nombre": "Guantes", "cantidad": null }),
            &["nombre", "item_catalogo", "cantidad"],
            WriteMode::Create,
        )
        .unwrap_err();

        assert_eq!(err.to_string(), "Faltan campos requeridos: item_catalogo, cantidad");
    }

    #[test]
    fn numbers_and_dates_are_normalized() {
        let fields = Fields::from_body(
            &COLUMNS,
            &json!({
                "nombre": "  Pipeta ",
                "item_catalogo": "12",
                "cantidad": 2.5,
                "fecha_adquisicion": "2024-03-05T00:00:00.000Z",
                "activo": "sí"
            }),
            &[],
            WriteMode::Patch,
        )
        .unwrap();

        assert_eq!(fields.get("nombre"), Some(&SqlValue::Text("Pipeta".into())));
        assert_eq!(fields.get("item_catalogo"), Some(&SqlValue::Integer(12)));
        assert_eq!(fields.get("cantidad"), Some(&SqlValue::Decimal(Decimal::new(25, 1))));
        assert_eq!(
            fields.get("fecha_adquisicion"),
            Some(&SqlValue::Date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()))
        );
        assert_eq!(fields.get("activo"), Some(&SqlValue::Bool(true)));
    }

    #[test]
    fn absent_columns_are_not_touched_and_unknown_keys_ignored() {
        let fields = Fields::from_body(&COLUMNS, &json!({ "otro": 1, "nombre": "x" }), &[], WriteMode::Patch).unwrap();
        assert_eq!(fields.len(), 1);
        assert!(fields.get("cantidad").is_none());
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert!(Fields::from_body(&COLUMNS, &json!([1, 2]), &[], WriteMode::Patch).is_err());
    }

    #[test]
    fn path_keys_parse_by_kind() {
        assert_eq!(SqlValue::parse_key(FieldKind::Integer, "42"), Some(SqlValue::Integer(42)));
        assert_eq!(SqlValue::parse_key(FieldKind::Integer, "abc"), None);
        assert_eq!(
            SqlValue::parse_key(FieldKind::Text, "L-001"),
            Some(SqlValue::Text("L-001".into()))
        );
    }
}
