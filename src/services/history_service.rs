// src/services/history_service.rs

use serde_json::{json, Value};
use sqlx::PgPool;

use crate::{
    common::{
        db_utils::{constraint_violation, ConstraintKind},
        error::AppError,
        fields::{body_object, coerce, Coerced, FieldKind, Fields, SqlValue, WriteMode},
    },
    db::HistoryRepository,
    models::{
        audit::AuditAction,
        auth::Identity,
        history::{HistorySpec, CONSECUTIVE},
    },
    services::audit_service::AuditRecorder,
};

#[derive(Clone)]
pub struct HistoryService {
    repo: HistoryRepository,
    audit: AuditRecorder,
    pool: PgPool,
}

// Padre (equipo o material) tomado del cuerpo.
fn parent_value(spec: &HistorySpec, body: &Value) -> Result<String, AppError> {
    body_object(body)?
        .get(spec.parent)
        .and_then(|raw| match coerce(FieldKind::Text, raw) {
            Coerced::Value(SqlValue::Text(s)) => Some(s),
            _ => None,
        })
        .ok_or_else(|| AppError::validation(format!("Faltan campos requeridos: {}", spec.parent)))
}

fn explicit_consecutive(body: &Value) -> Result<Option<i64>, AppError> {
    match body.get(CONSECUTIVE) {
        None => Ok(None),
        Some(raw) => match coerce(FieldKind::Integer, raw) {
            Coerced::Value(SqlValue::Integer(n)) if n > 0 => Ok(Some(n)),
            Coerced::Blank => Ok(None),
            _ => Err(AppError::validation("El campo consecutivo debe ser numérico")),
        },
    }
}

impl HistoryService {
    pub fn new(repo: HistoryRepository, audit: AuditRecorder, pool: PgPool) -> Self {
        Self { repo, audit, pool }
    }

    pub async fn list(&self, spec: &HistorySpec, parent: &str) -> Result<Vec<Value>, AppError> {
        Ok(self.repo.list(spec, parent).await?)
    }

    pub async fn next(&self, spec: &HistorySpec, parent: &str) -> Result<Value, AppError> {
        let next = self.repo.next_consecutive(spec, parent).await?;
        let mut body = serde_json::Map::new();
        body.insert(spec.next_key.to_string(), json!(next));
        Ok(Value::Object(body))
    }

    /// `consecutivo` = el enviado, o MAX + 1 del padre. El cálculo no es
    /// atómico: un choque concurrente termina en 409.
    pub async fn create(
        &self,
        spec: &HistorySpec,
        body: &Value,
        actor: Option<&Identity>,
    ) -> Result<Value, AppError> {
        let parent = parent_value(spec, body)?;
        let mut fields = Fields::from_body(spec.columns, body, &[], WriteMode::Create)?;

        let consecutive = match explicit_consecutive(body)? {
            Some(n) => n,
            None => self.repo.next_consecutive(spec, &parent).await?,
        };
        fields.set(spec.parent, SqlValue::Text(parent));
        fields.set(CONSECUTIVE, SqlValue::Integer(consecutive));

        self.repo
            .insert(&self.pool, spec, fields)
            .await
            .map_err(|e| match constraint_violation(&e) {
                Some(ConstraintKind::ForeignKey) => AppError::not_found(spec.parent_missing),
                Some(ConstraintKind::Unique) => {
                    AppError::conflict(format!("Ya existe un registro con el consecutivo {consecutive}"))
                }
                None => e.into(),
            })?;

        self.audit.record(actor, AuditAction::Create, spec.module).await;
        Ok(json!({ "message": spec.created, "consecutivo": consecutive }))
    }

    /// Actualización parcial sobre las columnas permitidas; devuelve la fila.
    pub async fn update(
        &self,
        spec: &HistorySpec,
        parent: &str,
        raw_consecutive: &str,
        body: &Value,
        actor: Option<&Identity>,
    ) -> Result<Value, AppError> {
        let fields = Fields::from_body(spec.columns, body, &[], WriteMode::Patch)?;
        if fields.is_empty() {
            return Err(AppError::validation("No hay campos para actualizar"));
        }
        let consecutive = raw_consecutive
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::not_found("Registro no encontrado"))?;

        let row = self
            .repo
            .update(spec, parent, consecutive, fields)
            .await?
            .ok_or_else(|| AppError::not_found("Registro no encontrado"))?;

        self.audit.record(actor, AuditAction::Update, spec.module).await;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::equipment::EQUIPMENT_HISTORY;

    #[test]
    fn parent_is_required_in_the_body() {
        let body = json!({ "equipo_id": " EQ-2 " });
        assert_eq!(parent_value(&EQUIPMENT_HISTORY, &body).unwrap(), "EQ-2");
        assert!(parent_value(&EQUIPMENT_HISTORY, &json!({ "equipo_id": "" })).is_err());
        assert_eq!(
            parent_value(&EQUIPMENT_HISTORY, &json!({})).unwrap_err().to_string(),
            "Faltan campos requeridos: equipo_id"
        );
    }

    #[test]
    fn consecutive_is_optional_but_numeric() {
        assert_eq!(explicit_consecutive(&json!({})).unwrap(), None);
        assert_eq!(explicit_consecutive(&json!({ "consecutivo": "" })).unwrap(), None);
        assert_eq!(explicit_consecutive(&json!({ "consecutivo": "4" })).unwrap(), Some(4));
        assert!(explicit_consecutive(&json!({ "consecutivo": "x" })).is_err());
    }
}
