// src/services/user_service.rs

use serde_json::{json, Value};
use validator::Validate;

use crate::{
    common::{
        db_utils::{constraint_violation, ConstraintKind},
        error::AppError,
    },
    db::UserRepository,
    models::{
        audit::AuditAction,
        auth::{
            looks_like_email, normalize_email, ChangeRolePayload, ChangeRoleResponse, CreateUserPayload,
            CreateUserResponse, Identity, RoleRow, UpdateStatusPayload, UserSummary,
        },
    },
    services::{audit_service::AuditRecorder, auth::hash_password},
};

const MODULE: &str = "USUARIOS";
const EMAIL_TAKEN: &str = "El email ya está registrado";
const INVALID_ROLE: &str = "Rol no válido";
const USER_NOT_FOUND: &str = "Usuario no encontrado";

/// `ACTIVO` o `INACTIVO`, exactos.
fn parse_status(raw: Option<&str>) -> Result<&'static str, AppError> {
    match raw {
        Some("ACTIVO") => Ok("ACTIVO"),
        Some("INACTIVO") => Ok("INACTIVO"),
        _ => Err(AppError::validation("Estado debe ser \"ACTIVO\" o \"INACTIVO\"")),
    }
}

#[derive(Clone)]
pub struct UserService {
    repo: UserRepository,
    audit: AuditRecorder,
}

impl UserService {
    pub fn new(repo: UserRepository, audit: AuditRecorder) -> Self {
        Self { repo, audit }
    }

    pub async fn roles(&self) -> Result<Vec<RoleRow>, AppError> {
        Ok(self.repo.roles().await?)
    }

    pub async fn list(&self) -> Result<Vec<UserSummary>, AppError> {
        Ok(self.repo.list().await?)
    }

    pub async fn create(&self, payload: CreateUserPayload, actor: Option<&Identity>) -> Result<CreateUserResponse, AppError> {
        payload.validate()?;
        let (Some(email), Some(password), Some(rol_id)) = (payload.email, payload.contrasena, payload.rol_id) else {
            return Err(AppError::validation("Email, contraseña y rol son requeridos"));
        };

        let email = normalize_email(&email);
        if !looks_like_email(&email) {
            return Err(AppError::validation("Email no válido"));
        }
        if self.repo.email_exists(&email).await? {
            return Err(AppError::conflict(EMAIL_TAKEN));
        }
        if !self.repo.role_exists(rol_id).await? {
            return Err(AppError::validation(INVALID_ROLE));
        }

        let password_hash = hash_password(password).await?;
        let id_usuario = self
            .repo
            .create(&email, &password_hash, rol_id)
            .await
            .map_err(|e| match constraint_violation(&e) {
                Some(ConstraintKind::Unique) => AppError::conflict(EMAIL_TAKEN),
                Some(ConstraintKind::ForeignKey) => AppError::validation(INVALID_ROLE),
                None => e.into(),
            })?;

        self.audit.record(actor, AuditAction::Create, MODULE).await;
        tracing::info!("Usuario {} creado con rol {}", email, rol_id);

        Ok(CreateUserResponse {
            message: "Usuario creado correctamente".into(),
            id_usuario,
            email,
            rol_id,
        })
    }

    pub async fn set_status(
        &self,
        id: i32,
        payload: UpdateStatusPayload,
        actor: Option<&Identity>,
    ) -> Result<Value, AppError> {
        let estado = parse_status(payload.estado.as_deref())?;
        if self.repo.set_status(id, estado).await? == 0 {
            return Err(AppError::not_found(USER_NOT_FOUND));
        }
        self.audit.record(actor, AuditAction::Update, MODULE).await;

        let verb = if estado == "ACTIVO" { "activado" } else { "desactivado" };
        Ok(json!({ "message": format!("Usuario {verb} correctamente") }))
    }

    pub async fn delete(&self, id: i32, actor: Option<&Identity>) -> Result<Value, AppError> {
        let deleted = self.repo.delete(id).await.map_err(|e| match constraint_violation(&e) {
            Some(ConstraintKind::ForeignKey) => {
                AppError::conflict("No se puede eliminar: el usuario tiene registros asociados")
            }
            _ => e.into(),
        })?;
        if deleted == 0 {
            return Err(AppError::not_found(USER_NOT_FOUND));
        }
        self.audit.record(actor, AuditAction::Delete, MODULE).await;
        Ok(json!({ "deleted": true, "message": "Usuario eliminado correctamente" }))
    }

    /// El rol Superadmin ya fue verificado por el llamador.
    pub async fn change_role(
        &self,
        id: i32,
        payload: ChangeRolePayload,
        actor: Option<&Identity>,
    ) -> Result<ChangeRoleResponse, AppError> {
        let rol_id = payload
            .rol_id
            .ok_or_else(|| AppError::validation("El rol_id es requerido"))?;

        if !self.repo.user_exists(id).await? {
            return Err(AppError::not_found(USER_NOT_FOUND));
        }
        if !self.repo.role_exists(rol_id).await? {
            return Err(AppError::validation(INVALID_ROLE));
        }
        if self.repo.set_role(id, rol_id).await? == 0 {
            return Err(AppError::not_found(USER_NOT_FOUND));
        }

        self.audit.record(actor, AuditAction::ChangeRole, MODULE).await;
        Ok(ChangeRoleResponse {
            message: "Rol actualizado correctamente".into(),
            id_usuario: id,
            nuevo_rol_id: rol_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_must_be_exact() {
        assert_eq!(parse_status(Some("ACTIVO")).unwrap(), "ACTIVO");
        assert_eq!(parse_status(Some("INACTIVO")).unwrap(), "INACTIVO");
        assert!(parse_status(Some("activo")).is_err());
        assert!(parse_status(None).is_err());
    }

    #[test]
    fn short_password_fails_validation() {
        let payload = CreateUserPayload {
            email: Some("ana@lab.co".into()),
            contrasena: Some("123".into()),
            rol_id: Some(1),
        };
        let err = AppError::from(payload.validate().unwrap_err());
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_fields_fail_validation() {
        let payload = CreateUserPayload {
            email: None,
            contrasena: None,
            rol_id: None,
        };
        assert!(payload.validate().is_err());
    }
}
