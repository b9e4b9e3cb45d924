use crate::common::error::AppError;

// ---
// Traducción de errores del driver
// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
}

pub fn constraint_violation(err: &sqlx::Error) -> Option<ConstraintKind> {
    if let sqlx::Error::Database(db_err) = err {
        if db_err.is_unique_violation() {
            return Some(ConstraintKind::Unique);
        }
        if db_err.is_foreign_key_violation() {
            return Some(ConstraintKind::ForeignKey);
        }
    }
    None
}

/// Convierte violaciones de unicidad o de llave foránea en un 409 con el
/// mensaje del dominio; cualquier otro error sigue como error de base de datos.
pub fn map_constraint(err: sqlx::Error, on_unique: &str, on_foreign_key: &str) -> AppError {
    match constraint_violation(&err) {
        Some(ConstraintKind::Unique) => AppError::conflict(on_unique),
        Some(ConstraintKind::ForeignKey) => AppError::conflict(on_foreign_key),
        None => err.into(),
    }
}
