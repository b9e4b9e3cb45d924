// src/services/resource_service.rs
//
// CRUD genérico sobre cualquier `ResourceSpec`: validación, traducción de
// restricciones de la base, existencias y bitácora.

use rust_decimal::Decimal;
use serde_json::{json, Map, Value};
use sqlx::PgPool;

use crate::{
    common::{
        db_utils::map_constraint,
        error::AppError,
        fields::{body_object, coerce, Coerced, FieldKind, Fields, SqlValue, WriteMode},
        pagination::{ListQuery, Listing, Window},
    },
    db::ResourceRepository,
    models::{
        audit::{AuditAction, MovementKind},
        auth::Identity,
        resource::{key_text, ListShape, ResourceSpec},
    },
    services::audit_service::AuditRecorder,
};

// ---
// Ajuste de existencias
// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    /// Cantidad absoluta, >= 0.
    Set(Decimal),
    /// Cambio relativo, distinto de 0.
    Delta(Decimal),
}

impl Adjustment {
    /// `cantidad` tiene prioridad sobre `delta`.
    pub fn from_body(body: &Value) -> Result<Self, AppError> {
        let object = body_object(body)?;

        if let Some(raw) = object.get("cantidad").filter(|v| !v.is_null()) {
            return match coerce(FieldKind::Decimal, raw) {
                Coerced::Value(SqlValue::Decimal(c)) if c >= Decimal::ZERO => Ok(Adjustment::Set(c)),
                _ => Err(AppError::validation("Cantidad inválida. Debe ser >= 0")),
            };
        }

        if let Some(raw) = object.get("delta").filter(|v| !v.is_null()) {
            return match coerce(FieldKind::Decimal, raw) {
                Coerced::Value(SqlValue::Decimal(d)) if !d.is_zero() => Ok(Adjustment::Delta(d)),
                _ => Err(AppError::validation("Delta inválido. Debe ser distinto de 0")),
            };
        }

        Err(AppError::validation("Provee cantidad (>=0) o delta (!=0)"))
    }

    /// Nunca deja existencias negativas: un delta negativo grande queda en 0.
    pub fn apply(self, existing: Decimal) -> Decimal {
        match self {
            Adjustment::Set(quantity) => quantity,
            Adjustment::Delta(delta) => (existing + delta).max(Decimal::ZERO),
        }
    }
}

fn key_json(key: &SqlValue) -> Value {
    match key {
        SqlValue::Integer(i) => json!(i),
        other => other.to_key_string().map(Value::String).unwrap_or(Value::Null),
    }
}

#[derive(Clone)]
pub struct ResourceService {
    repo: ResourceRepository,
    audit: AuditRecorder,
    pool: PgPool,
}

impl ResourceService {
    pub fn new(repo: ResourceRepository, audit: AuditRecorder, pool: PgPool) -> Self {
        Self { repo, audit, pool }
    }

    /// Llave de ruta tipada; una llave imposible es un 404.
    pub fn parse_key(&self, spec: &ResourceSpec, raw: &str) -> Result<SqlValue, AppError> {
        SqlValue::parse_key(spec.key.kind, raw).ok_or_else(|| AppError::not_found(spec.not_found(raw)))
    }

    pub async fn list(&self, spec: &ResourceSpec, query: &ListQuery) -> Result<Listing, AppError> {
        let search = query.search();
        let listing = match spec.listing {
            ListShape::Paged => match query.window() {
                Some(window) => {
                    let rows = self.repo.list(spec, search, Some(window)).await?;
                    let total = self.repo.count(spec, search).await?;
                    Listing::Page { rows, total }
                }
                None => Listing::All(self.repo.list(spec, search, None).await?),
            },
            ListShape::Capped => Listing::All(self.repo.list(spec, search, query.window()).await?),
            ListShape::Fixed(cap) => {
                let window = Window { limit: cap, offset: 0 };
                Listing::All(self.repo.list(spec, search, Some(window)).await?)
            }
        };
        Ok(listing)
    }

    pub async fn total(&self, spec: &ResourceSpec) -> Result<i64, AppError> {
        Ok(self.repo.count(spec, None).await?)
    }

    pub async fn get(&self, spec: &ResourceSpec, raw_key: &str) -> Result<Value, AppError> {
        let key = self.parse_key(spec, raw_key)?;
        self.repo
            .find(&self.pool, spec, key)
            .await?
            .ok_or_else(|| AppError::not_found(spec.not_found(raw_key)))
    }

    /// Normaliza un cuerpo JSON de alta.
    pub fn creation_fields(&self, spec: &ResourceSpec, body: &Value) -> Result<Fields, AppError> {
        Fields::from_body(spec.insertable(), body, spec.required, WriteMode::Create)
    }

    pub async fn create(&self, spec: &ResourceSpec, body: &Value, actor: Option<&Identity>) -> Result<Value, AppError> {
        let fields = self.creation_fields(spec, body)?;
        self.create_fields(spec, fields, actor).await
    }

    /// Alta a partir de valores ya normalizados (p. ej. desde multipart).
    pub async fn create_fields(
        &self,
        spec: &ResourceSpec,
        mut fields: Fields,
        actor: Option<&Identity>,
    ) -> Result<Value, AppError> {
        if let Some(prepare) = spec.prepare {
            prepare(&mut fields, WriteMode::Create);
        }
        fields.check_required(spec.required)?;

        if let Some(counter) = spec.counter {
            if fields.is_blank(counter) {
                let next = self.repo.next_counter(spec, counter).await?;
                if let Some(column) = spec.columns.iter().find(|c| c.name == counter) {
                    fields.set(column.name, SqlValue::Integer(next));
                }
            }
        }

        let row = self
            .repo
            .insert(&self.pool, spec, fields)
            .await
            .map_err(|e| map_constraint(e, spec.messages.duplicate, spec.messages.missing_parent))?;

        self.audit.record(actor, AuditAction::Create, spec.module).await;
        if let Some(stock) = spec.stock {
            if let Some(reference) = row.get(spec.key.name).and_then(key_text) {
                self.audit
                    .record_movement(actor, stock.product, &reference, MovementKind::Entry)
                    .await;
            }
        }

        Ok(spec.reply(spec.created, row))
    }

    /// Normaliza un cuerpo JSON de actualización parcial.
    pub fn update_fields(&self, spec: &ResourceSpec, body: &Value) -> Result<Fields, AppError> {
        let fields = Fields::from_body(spec.columns, body, spec.required, WriteMode::Patch)?;
        // Un obligatorio puede omitirse, pero no vaciarse.
        let cleared: Vec<&str> = spec
            .required
            .iter()
            .copied()
            .filter(|name| fields.get(name).is_some_and(SqlValue::is_null))
            .collect();
        if !cleared.is_empty() {
            return Err(AppError::validation(format!(
                "Faltan campos requeridos: {}",
                cleared.join(", ")
            )));
        }
        Ok(fields)
    }

    pub async fn update(
        &self,
        spec: &ResourceSpec,
        raw_key: &str,
        body: &Value,
        actor: Option<&Identity>,
    ) -> Result<Value, AppError> {
        let fields = self.update_fields(spec, body)?;
        self.update_with(spec, raw_key, fields, actor).await
    }

    pub async fn update_with(
        &self,
        spec: &ResourceSpec,
        raw_key: &str,
        mut fields: Fields,
        actor: Option<&Identity>,
    ) -> Result<Value, AppError> {
        let key = self.parse_key(spec, raw_key)?;
        if let Some(prepare) = spec.prepare {
            prepare(&mut fields, WriteMode::Patch);
        }
        if fields.is_empty() {
            return Err(AppError::validation("No hay campos para actualizar"));
        }

        let row = self
            .repo
            .update(&self.pool, spec, key, fields)
            .await
            .map_err(|e| map_constraint(e, spec.messages.duplicate, spec.messages.missing_parent))?
            .ok_or_else(|| AppError::not_found(spec.not_found(raw_key)))?;

        self.audit.record(actor, AuditAction::Update, spec.module).await;
        Ok(spec.reply(spec.updated, row))
    }

    /// El rol ya fue verificado por el llamador.
    pub async fn delete(&self, spec: &ResourceSpec, raw_key: &str, actor: Option<&Identity>) -> Result<Value, AppError> {
        let key = self.parse_key(spec, raw_key)?;

        if let Some(dependents) = spec.dependents {
            let n = self.repo.count_dependents(&dependents, key.clone()).await?;
            if n > 0 {
                let mut details = Map::new();
                details.insert(spec.key.name.to_string(), key_json(&key));
                details.insert("dependientes".into(), json!(n));
                return Err(AppError::conflict_with(
                    dependents.message.replace("{n}", &n.to_string()),
                    details,
                ));
            }
        }

        let deleted = self
            .repo
            .delete(&self.pool, spec, key)
            .await
            .map_err(|e| map_constraint(e, spec.messages.duplicate, spec.messages.in_use))?;
        if deleted == 0 {
            return Err(AppError::not_found(spec.not_found(raw_key)));
        }

        self.audit.record(actor, AuditAction::Delete, spec.module).await;
        Ok(json!({ "deleted": true, "message": spec.messages.deleted }))
    }

    /// Ajusta la columna de existencias dentro de una transacción, con la fila bloqueada.
    pub async fn adjust_stock(
        &self,
        spec: &ResourceSpec,
        raw_key: &str,
        body: &Value,
        actor: Option<&Identity>,
    ) -> Result<Value, AppError> {
        let stock = spec
            .stock
            .ok_or_else(|| anyhow::anyhow!("{} no maneja existencias", spec.table))?;
        let adjustment = Adjustment::from_body(body)?;
        let key = self.parse_key(spec, raw_key)?;

        let mut tx = self.pool.begin().await?;
        let existing = self
            .repo
            .lock_stock(&mut *tx, spec, stock.existing, key.clone())
            .await?
            .ok_or_else(|| AppError::not_found(spec.not_found(raw_key)))?;
        let quantity = adjustment.apply(existing);
        let stored = self
            .repo
            .set_stock(&mut *tx, spec, stock.existing, key.clone(), quantity)
            .await?;
        tx.commit().await?;

        self.audit.record(actor, AuditAction::AdjustStock, spec.module).await;
        if let Some(reference) = key.to_key_string() {
            self.audit
                .record_movement(actor, stock.product, &reference, MovementKind::Adjustment)
                .await;
        }

        let mut body = Map::new();
        body.insert(spec.key.name.to_string(), key_json(&key));
        body.insert(stock.existing.to_string(), stored);
        Ok(Value::Object(body))
    }

    /// Contenido binario de una columna. 404 si la fila no existe.
    pub async fn blob(&self, spec: &ResourceSpec, column: &str, raw_key: &str) -> Result<Option<Vec<u8>>, AppError> {
        let key = self.parse_key(spec, raw_key)?;
        self.repo
            .blob(spec, column, key)
            .await?
            .ok_or_else(|| AppError::not_found(spec.not_found(raw_key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_clamps_at_zero() {
        let adj = Adjustment::from_body(&json!({ "delta": -5 })).unwrap();
        assert_eq!(adj.apply(Decimal::from(3)), Decimal::ZERO);

        let adj = Adjustment::from_body(&json!({ "delta": "2.5" })).unwrap();
        assert_eq!(adj.apply(Decimal::from(3)), Decimal::new(55, 1));
    }

    #[test]
    fn absolute_quantity_replaces_existing() {
        let adj = Adjustment::from_body(&json!({ "cantidad": 12, "delta": 4 })).unwrap();
        assert_eq!(adj, Adjustment::Set(Decimal::from(12)));
        assert_eq!(adj.apply(Decimal::from(100)), Decimal::from(12));
    }

    #[test]
    fn invalid_adjustments_are_rejected() {
        let msg = |body: Value| Adjustment::from_body(&body).unwrap_err().to_string();
        assert_eq!(msg(json!({ "cantidad": -1 })), "Cantidad inválida. Debe ser >= 0");
        assert_eq!(msg(json!({ "cantidad": "muchos" })), "Cantidad inválida. Debe ser >= 0");
        assert_eq!(msg(json!({ "delta": 0 })), "Delta inválido. Debe ser distinto de 0");
        assert_eq!(msg(json!({})), "Provee cantidad (>=0) o delta (!=0)");
    }

    #[test]
    fn keys_keep_their_json_type() {
        assert_eq!(key_json(&SqlValue::Integer(42)), json!(42));
        assert_eq!(key_json(&SqlValue::Text("L-1".into())), json!("L-1"));
    }
}
