// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// ---
// Roles
// ---

/// Conjunto cerrado de roles. El nombre guardado en la base es la fuente de
/// verdad; cualquier nombre desconocido se trata como usuario estándar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Administrator,
    Superadmin,
    Standard,
}

impl Role {
    pub fn from_name(name: &str) -> Self {
        match name {
            "Administrador" => Role::Administrator,
            "Superadmin" => Role::Superadmin,
            _ => Role::Standard,
        }
    }
}

pub const ADMINS: &[Role] = &[Role::Administrator, Role::Superadmin];
pub const SUPERADMIN_ONLY: &[Role] = &[Role::Superadmin];
pub const ADMINISTRATOR_ONLY: &[Role] = &[Role::Administrator];

/// Principal autenticado, tal como viaja en el token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Identity {
    pub id: i32,
    pub email: String,
    pub rol: String,
    pub id_rol: i32,
}

impl Identity {
    pub fn role(&self) -> Role {
        Role::from_name(&self.rol)
    }
}

// Claims del JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: i32,
    pub email: String,
    pub rol: String,
    pub id_rol: i32,
    pub iat: i64,
    pub exp: i64,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Identity {
            id: claims.id,
            email: claims.email,
            rol: claims.rol,
            id_rol: claims.id_rol,
        }
    }
}

// ---
// Filas de la base
// ---

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserCredentials {
    pub id_usuario: i32,
    pub email: String,
    pub contrasena: String,
    pub estado: String,
    pub rol_nombre: String,
    pub id_rol: i32,
}

impl UserCredentials {
    pub fn is_active(&self) -> bool {
        self.estado == "ACTIVO"
    }

    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id_usuario,
            email: self.email.clone(),
            rol: self.rol_nombre.clone(),
            id_rol: self.id_rol,
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct RoleRow {
    pub id_rol: i32,
    pub nombre: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct UserSummary {
    pub id_usuario: i32,
    pub email: String,
    pub rol_id: i32,
    pub rol_nombre: String,
    pub estado: String,
    pub created_at: DateTime<Utc>,
}

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginPayload {
    pub email: Option<String>,
    pub contrasena: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub id_usuario: i32,
    pub email: String,
    pub rol: String,
    pub id_rol: i32,
    pub token: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserPayload {
    #[validate(required(message = "Email, contraseña y rol son requeridos"))]
    pub email: Option<String>,

    #[validate(
        required(message = "Email, contraseña y rol son requeridos"),
        length(min = 6, message = "La contraseña debe tener al menos 6 caracteres")
    )]
    pub contrasena: Option<String>,

    #[validate(required(message = "Email, contraseña y rol son requeridos"))]
    pub rol_id: Option<i32>,
}

/// Correo normalizado: sin espacios y en minúsculas.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Validación de forma `x@y.z`, sin espacios.
pub fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateUserResponse {
    pub message: String,
    pub id_usuario: i32,
    pub email: String,
    pub rol_id: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusPayload {
    pub estado: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeRolePayload {
    pub rol_id: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChangeRoleResponse {
    pub message: String,
    pub id_usuario: i32,
    pub nuevo_rol_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_match_exact_names_only() {
        assert_eq!(Role::from_name("Administrador"), Role::Administrator);
        assert_eq!(Role::from_name("Superadmin"), Role::Superadmin);
        assert_eq!(Role::from_name("administrador"), Role::Standard);
        assert_eq!(Role::from_name("Admin"), Role::Standard);
    }

    #[test]
    fn email_shape() {
        assert!(looks_like_email("ana@lab.co"));
        assert!(!looks_like_email("ana@lab"));
        assert!(!looks_like_email("ana lab@x.co"));
        assert!(!looks_like_email("@x.co"));
        assert!(!looks_like_email("a@b@c.co"));
        assert_eq!(normalize_email("  Ana@Lab.CO "), "ana@lab.co");
    }
}
