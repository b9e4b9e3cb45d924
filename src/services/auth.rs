// src/services/auth.rs

use axum::http::{header::AUTHORIZATION, HeaderMap};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{normalize_email, Claims, Identity, LoginPayload, LoginResponse},
};

pub const BCRYPT_COST: u32 = 10;
const TOKEN_TTL_HOURS: i64 = 24;

// Claves HS256 derivadas del secreto configurado.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, identity: &Identity) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            id: identity.id,
            email: identity.email.clone(),
            rol: identity.rol.clone(),
            id_rol: identity.id_rol,
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Devuelve la identidad embebida tal cual, sin consultar la base.
    pub fn verify(&self, token: &str) -> Result<Identity, AppError> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims.into())
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => AppError::ExpiredToken,
                _ => AppError::InvalidToken,
            })
    }

    /// `Authorization: Bearer <token>`. Sin cabecera -> token requerido;
    /// cabecera mal formada o firma inválida -> token inválido.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Identity, AppError> {
        if !headers.contains_key(AUTHORIZATION) {
            return Err(AppError::MissingToken);
        }
        let Authorization(bearer) = headers
            .typed_get::<Authorization<Bearer>>()
            .ok_or(AppError::InvalidToken)?;
        self.verify(bearer.token())
    }
}

pub async fn hash_password(password: String) -> Result<String, AppError> {
    let hashed = tokio::task::spawn_blocking(move || hash(&password, BCRYPT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falla en la tarea de hashing: {}", e))??;
    Ok(hashed)
}

/// `false` para una contraseña incorrecta; error solo si el hash guardado es inválido.
pub async fn verify_password(password: String, stored_hash: String) -> Result<bool, AppError> {
    let ok = tokio::task::spawn_blocking(move || verify(&password, &stored_hash))
        .await
        .map_err(|e| anyhow::anyhow!("Falla en la tarea de verificación: {}", e))??;
    Ok(ok)
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    keys: TokenKeys,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, keys: TokenKeys) -> Self {
        Self { user_repo, keys }
    }

    pub fn keys(&self) -> &TokenKeys {
        &self.keys
    }

    pub async fn login(&self, payload: LoginPayload) -> Result<LoginResponse, AppError> {
        let email = payload.email.as_deref().map(normalize_email).unwrap_or_default();
        let password = payload.contrasena.unwrap_or_default();
        if email.is_empty() || password.is_empty() {
            return Err(AppError::validation("Falta correo o contraseña"));
        }

        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        // El estado se revisa antes de la contraseña.
        if !user.is_active() {
            return Err(AppError::InactiveUser);
        }

        if !verify_password(password, user.contrasena.clone()).await? {
            return Err(AppError::InvalidCredentials);
        }

        let identity = user.identity();
        let token = self.keys.issue(&identity)?;
        tracing::info!("Login de {} ({})", identity.email, identity.rol);

        Ok(LoginResponse {
            id_usuario: identity.id,
            email: identity.email,
            rol: identity.rol,
            id_rol: identity.id_rol,
            token,
        })
    }

    /// Verifica el token y vuelve a leer el usuario: debe existir y estar activo.
    pub async fn me(&self, headers: &HeaderMap) -> Result<Identity, AppError> {
        let claimed = self.keys.authenticate(headers)?;
        let user = self
            .user_repo
            .find_active_by_id(claimed.id)
            .await?
            .ok_or(AppError::StaleSession)?;
        Ok(user.identity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn identity() -> Identity {
        Identity {
            id: 7,
            email: "ana@lab.co".into(),
            rol: "Administrador".into(),
            id_rol: 2,
        }
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}")).unwrap());
        headers
    }

    #[test]
    fn issued_tokens_round_trip_the_identity() {
        let keys = TokenKeys::new("secreto");
        let token = keys.issue(&identity()).unwrap();
        assert_eq!(keys.authenticate(&bearer(&token)).unwrap(), identity());
    }

    #[test]
    fn missing_header_is_distinct_from_invalid() {
        let keys = TokenKeys::new("secreto");
        assert!(matches!(keys.authenticate(&HeaderMap::new()), Err(AppError::MissingToken)));
        assert!(matches!(keys.authenticate(&bearer("basura")), Err(AppError::InvalidToken)));

        let mut basic = HeaderMap::new();
        basic.insert(AUTHORIZATION, HeaderValue::from_static("Basic YWJjOmRlZg=="));
        assert!(matches!(keys.authenticate(&basic), Err(AppError::InvalidToken)));
    }

    #[test]
    fn foreign_signature_is_invalid() {
        let token = TokenKeys::new("otro").issue(&identity()).unwrap();
        assert!(matches!(
            TokenKeys::new("secreto").verify(&token),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let keys = TokenKeys::new("secreto");
        let past = Utc::now() - Duration::hours(48);
        let claims = Claims {
            id: 7,
            email: "ana@lab.co".into(),
            rol: "Usuario".into(),
            id_rol: 3,
            iat: past.timestamp(),
            exp: (past + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"secreto")).unwrap();
        assert!(matches!(keys.verify(&token), Err(AppError::ExpiredToken)));
    }

    #[tokio::test]
    async fn password_hashes_verify() {
        let hashed = hash_password("secreta1".into()).await.unwrap();
        assert!(verify_password("secreta1".into(), hashed.clone()).await.unwrap());
        assert!(!verify_password("otra".into(), hashed).await.unwrap());
    }
}
