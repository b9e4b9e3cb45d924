// src/models/history.rs
//
// Tablas hijas con numeración "consecutivo" por padre (historial e intervalos
// de calibración de equipos y materiales).

use crate::common::fields::Column;

pub struct HistorySpec {
    pub table: &'static str,
    /// Columna que referencia al padre (equipo o material).
    pub parent: &'static str,
    /// Columnas de datos, sin el padre ni el consecutivo.
    pub columns: &'static [Column],
    pub module: &'static str,
    pub created: &'static str,
    pub parent_missing: &'static str,
    /// Clave de la respuesta de "siguiente consecutivo".
    pub next_key: &'static str,
}

pub const CONSECUTIVE: &str = "consecutivo";

pub trait History: Send + Sync + 'static {
    fn spec() -> &'static HistorySpec;
}
