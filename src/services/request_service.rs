// src/services/request_service.rs
//
// Solicitudes: listados con el cliente, detalle con el seguimiento, upserts
// de oferta / revisión / seguimiento y la encuesta de satisfacción.

use serde_json::{json, Value};
use sqlx::PgPool;

use crate::{
    common::{
        db_utils::{constraint_violation, ConstraintKind},
        error::AppError,
        fields::{body_object, coerce, Coerced, FieldKind, Fields, SqlValue, WriteMode},
        pagination::ListQuery,
    },
    db::{LookupRepository, RequestRepository},
    models::{
        audit::AuditAction,
        auth::Identity,
        requests::{FollowUpSpec, REQUESTS, SURVEY_COLUMNS, SURVEY_FLAGS},
    },
    services::audit_service::AuditRecorder,
};

const LIST_CAP: i64 = 500;
const MISSING_ID: &str = "Falta id_solicitud";

fn parse_request_id(raw: &str) -> Result<i64, AppError> {
    match SqlValue::parse_key(FieldKind::Integer, raw) {
        Some(SqlValue::Integer(id)) => Ok(id),
        _ => Err(AppError::not_found(REQUESTS.messages.not_found)),
    }
}

// `id_solicitud` del cuerpo de la encuesta.
fn survey_request_id(body: &Value) -> Result<i64, AppError> {
    let raw = body_object(body)?
        .get("id_solicitud")
        .ok_or_else(|| AppError::validation(MISSING_ID))?;
    match coerce(FieldKind::Integer, raw) {
        Coerced::Value(SqlValue::Integer(id)) => Ok(id),
        _ => Err(AppError::validation(MISSING_ID)),
    }
}

/// Resultado de encuesta a insertar, si el cuerpo trae alguno de sus campos.
fn survey_fields(body: &Value, id_solicitud: i64) -> Result<Option<Fields>, AppError> {
    let mut fields = Fields::from_body(SURVEY_COLUMNS, body, &[], WriteMode::Patch)?;
    let recommends_sent = body.get("recomendaria_servicio").is_some();
    let any_value = fields.iter().any(|(_, v)| !v.is_null());
    if !any_value && !recommends_sent {
        return Ok(None);
    }
    if fields.is_blank("recomendaria_servicio") {
        fields.set("recomendaria_servicio", SqlValue::Bool(false));
    }
    fields.set("id_solicitud", SqlValue::Integer(id_solicitud));
    Ok(Some(fields))
}

/// Banderas enviadas; un valor vacío cuenta como `false`.
fn survey_flags(body: &Value) -> Result<Fields, AppError> {
    let fields = Fields::from_body(SURVEY_FLAGS, body, &[], WriteMode::Patch)?;
    let mut flags = Fields::new();
    for (name, value) in fields.into_inner() {
        let value = if value.is_null() { SqlValue::Bool(false) } else { value };
        flags.set(name, value);
    }
    Ok(flags)
}

#[derive(Clone)]
pub struct RequestService {
    repo: RequestRepository,
    lookups: LookupRepository,
    audit: AuditRecorder,
    pool: PgPool,
}

impl RequestService {
    pub fn new(repo: RequestRepository, lookups: LookupRepository, audit: AuditRecorder, pool: PgPool) -> Self {
        Self {
            repo,
            lookups,
            audit,
            pool,
        }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Vec<Value>, AppError> {
        let limit = query.window().map_or(LIST_CAP, |w| w.limit.min(LIST_CAP));
        Ok(self.repo.list(query.search(), limit).await?)
    }

    pub async fn get(&self, raw_id: &str) -> Result<Value, AppError> {
        let id = parse_request_id(raw_id)?;
        self.repo
            .find(id)
            .await?
            .ok_or_else(|| AppError::not_found(REQUESTS.messages.not_found))
    }

    pub async fn detail_list(&self) -> Result<Vec<Value>, AppError> {
        Ok(self.repo.detail_list(LIST_CAP).await?)
    }

    pub async fn detail(&self, raw_id: &str) -> Result<Value, AppError> {
        let id = parse_request_id(raw_id)?;
        self.repo
            .detail(id)
            .await?
            .ok_or_else(|| AppError::not_found(REQUESTS.messages.not_found))
    }

    /// Reemplaza (o crea) la fila de seguimiento de la solicitud.
    pub async fn upsert_follow_up(
        &self,
        spec: &FollowUpSpec,
        raw_id: &str,
        body: &Value,
        actor: Option<&Identity>,
    ) -> Result<Value, AppError> {
        if raw_id.trim().is_empty() {
            return Err(AppError::validation(MISSING_ID));
        }
        let id = parse_request_id(raw_id)?;
        let fields = spec.complete(Fields::from_body(spec.columns, body, &[], WriteMode::Patch)?);

        self.repo
            .upsert_follow_up(spec, id, fields)
            .await
            .map_err(|e| match constraint_violation(&e) {
                Some(ConstraintKind::ForeignKey) => AppError::not_found(REQUESTS.messages.not_found),
                _ => e.into(),
            })?;

        self.audit.record(actor, AuditAction::Update, REQUESTS.module).await;
        Ok(json!({ "ok": true }))
    }

    /// Resultado de la encuesta, banderas de la solicitud y bitácora: todo o nada.
    pub async fn create_survey(&self, body: &Value, actor: Option<&Identity>) -> Result<Value, AppError> {
        let id = survey_request_id(body)?;
        let survey = survey_fields(body, id)?;
        let flags = survey_flags(body)?;

        if !self.repo.request_exists(id).await? {
            return Err(AppError::not_found(REQUESTS.messages.not_found));
        }

        let mut tx = self.pool.begin().await?;
        if let Some(survey) = survey {
            self.repo.insert_survey(&mut *tx, survey).await?;
        }
        if !flags.is_empty() {
            self.repo.set_survey_flags(&mut *tx, id, flags).await?;
        }
        self.audit
            .record_in(&mut *tx, actor, AuditAction::CreateSurvey, REQUESTS.module)
            .await?;
        tx.commit().await?;

        tracing::info!("Encuesta registrada para la solicitud {}", id);
        Ok(json!({ "message": "Encuesta creada exitosamente" }))
    }

    // ---
    // Referencias geográficas
    // ---

    pub async fn departments(&self) -> Result<Vec<Value>, AppError> {
        Ok(self.lookups.departments().await?)
    }

    pub async fn cities(&self, department: Option<&str>) -> Result<Vec<Value>, AppError> {
        let department = department.map(str::trim).filter(|d| !d.is_empty());
        Ok(self.lookups.cities(department).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn survey_requires_a_request_id() {
        assert_eq!(survey_request_id(&json!({})).unwrap_err().to_string(), MISSING_ID);
        assert_eq!(survey_request_id(&json!({ "id_solicitud": "" })).unwrap_err().to_string(), MISSING_ID);
        assert_eq!(survey_request_id(&json!({ "id_solicitud": "12" })).unwrap(), 12);
    }

    #[test]
    fn survey_row_only_when_some_field_is_sent() {
        assert!(survey_fields(&json!({ "cliente_respondio_encuesta": true }), 1).unwrap().is_none());

        let fields = survey_fields(&json!({ "puntuacion_satisfaccion": 5 }), 1).unwrap().unwrap();
        assert_eq!(fields.get("puntuacion_satisfaccion"), Some(&SqlValue::Integer(5)));
        assert_eq!(fields.get("recomendaria_servicio"), Some(&SqlValue::Bool(false)));
        assert_eq!(fields.get("id_solicitud"), Some(&SqlValue::Integer(1)));

        assert!(survey_fields(&json!({ "recomendaria_servicio": false }), 1).unwrap().is_some());
    }

    #[test]
    fn flags_only_include_sent_keys() {
        let flags = survey_flags(&json!({ "solicito_nueva_encuesta": null })).unwrap();
        assert_eq!(flags.len(), 1);
        assert_eq!(flags.get("solicito_nueva_encuesta"), Some(&SqlValue::Bool(false)));

        let flags = survey_flags(&json!({ "cliente_respondio_encuesta": "si" })).unwrap();
        assert_eq!(flags.get("cliente_respondio_encuesta"), Some(&SqlValue::Bool(true)));
    }

    #[test]
    fn request_ids_must_be_numeric() {
        assert_eq!(parse_request_id("9").unwrap(), 9);
        assert!(matches!(parse_request_id("abc"), Err(AppError::NotFound(_))));
    }
}
