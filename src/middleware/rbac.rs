// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    models::auth::{Identity, Role, ADMINISTRATOR_ONLY, ADMINS, SUPERADMIN_ONLY},
};

/// Verifica que la identidad tenga uno de los roles permitidos. Sin identidad
/// es un 401; con otro rol, un 403 con `message`.
pub fn ensure_role<'a>(
    identity: Option<&'a Identity>,
    allowed: &[Role],
    message: &str,
) -> Result<&'a Identity, AppError> {
    let identity = identity.ok_or(AppError::MissingToken)?;
    if allowed.contains(&identity.role()) {
        Ok(identity)
    } else {
        Err(AppError::forbidden(message))
    }
}

/// 1. Qué roles acepta una ruta
pub trait RoleRequirement: Send + Sync + 'static {
    fn allowed() -> &'static [Role];
    fn message() -> &'static str;
}

/// 2. El extractor (guardián). Entrega la identidad ya verificada.
pub struct RequireRole<T>(pub Identity, pub PhantomData<T>);

impl<T> RequireRole<T> {
    pub fn identity(&self) -> &Identity {
        &self.0
    }
}

// 3. Implementación del FromRequestParts
impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleRequirement,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = ensure_role(parts.extensions.get::<Identity>(), T::allowed(), T::message())?;
        Ok(RequireRole(identity.clone(), PhantomData))
    }
}

// ---
// Requisitos por ruta
// ---

pub struct UserAdmin;
impl RoleRequirement for UserAdmin {
    fn allowed() -> &'static [Role] {
        ADMINS
    }
    fn message() -> &'static str {
        "No tienes permisos para gestionar usuarios. Solo administradores pueden realizar esta acción."
    }
}

pub struct RoleAdmin;
impl RoleRequirement for RoleAdmin {
    fn allowed() -> &'static [Role] {
        SUPERADMIN_ONLY
    }
    fn message() -> &'static str {
        "No tienes permisos para cambiar roles. Solo el Superadmin puede realizar esta acción."
    }
}

pub struct ReportViewer;
impl RoleRequirement for ReportViewer {
    fn allowed() -> &'static [Role] {
        ADMINISTRATOR_ONLY
    }
    fn message() -> &'static str {
        "Acceso denegado. Se requiere rol Administrador"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(rol: &str) -> Identity {
        Identity {
            id: 1,
            email: "x@lab.co".into(),
            rol: rol.into(),
            id_rol: 1,
        }
    }

    #[test]
    fn no_identity_is_unauthenticated() {
        assert!(matches!(ensure_role(None, ADMINS, "no"), Err(AppError::MissingToken)));
    }

    #[test]
    fn roles_are_an_exact_set_without_hierarchy() {
        let admin = identity("Administrador");
        let superadmin = identity("Superadmin");
        let user = identity("Usuario");

        assert!(ensure_role(Some(&admin), ADMINS, "no").is_ok());
        assert!(ensure_role(Some(&superadmin), ADMINS, "no").is_ok());
        assert!(matches!(ensure_role(Some(&user), ADMINS, "no"), Err(AppError::Forbidden(_))));

        // Superadmin no entra implícitamente en una ruta solo de Administrador
        assert!(ensure_role(Some(&superadmin), ADMINISTRATOR_ONLY, "no").is_err());
        assert!(ensure_role(Some(&admin), SUPERADMIN_ONLY, "no").is_err());
    }

    #[test]
    fn forbidden_carries_the_route_message() {
        let user = identity("Usuario");
        let err = ensure_role(Some(&user), RoleAdmin::allowed(), RoleAdmin::message()).unwrap_err();
        assert_eq!(err.to_string(), RoleAdmin::message());
    }
}
