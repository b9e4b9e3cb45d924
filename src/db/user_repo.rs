use sqlx::PgPool;

use crate::models::auth::{RoleRow, UserCredentials, UserSummary};

// O repositório de usuários, responsável por `usuarios` y `roles`
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

const CREDENTIALS_SELECT: &str = r#"
    SELECT u.id_usuario, u.email, u.contrasena, u.estado, r.nombre AS rol_nombre, r.id_rol
    FROM usuarios u
    JOIN roles r ON r.id_rol = u.rol_id
"#;

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca un usuario por e-mail (ya normalizado), junto con su rol
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, sqlx::Error> {
        let sql = format!("{CREDENTIALS_SELECT} WHERE u.email = $1");
        sqlx::query_as::<_, UserCredentials>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_active_by_id(&self, id: i32) -> Result<Option<UserCredentials>, sqlx::Error> {
        let sql = format!("{CREDENTIALS_SELECT} WHERE u.id_usuario = $1 AND u.estado = 'ACTIVO'");
        sqlx::query_as::<_, UserCredentials>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM usuarios WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn user_exists(&self, id: i32) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM usuarios WHERE id_usuario = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn role_exists(&self, id_rol: i32) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM roles WHERE id_rol = $1)")
            .bind(id_rol)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn roles(&self) -> Result<Vec<RoleRow>, sqlx::Error> {
        sqlx::query_as::<_, RoleRow>("SELECT id_rol, nombre FROM roles ORDER BY nombre")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn list(&self) -> Result<Vec<UserSummary>, sqlx::Error> {
        sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id_usuario, u.email, u.rol_id, r.nombre AS rol_nombre, u.estado, u.created_at
            FROM usuarios u
            JOIN roles r ON r.id_rol = u.rol_id
            ORDER BY u.created_at DESC, u.id_usuario DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    /// Devuelve el id generado.
    pub async fn create(&self, email: &str, password_hash: &str, rol_id: i32) -> Result<i32, sqlx::Error> {
        sqlx::query_scalar::<_, i32>(
            "INSERT INTO usuarios (email, contrasena, rol_id) VALUES ($1, $2, $3) RETURNING id_usuario",
        )
        .bind(email)
        .bind(password_hash)
        .bind(rol_id)
        .fetch_one(&self.pool)
        .await
    }

    /// Filas afectadas: 0 cuando el usuario no existe.
    pub async fn set_status(&self, id: i32, estado: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE usuarios SET estado = $1 WHERE id_usuario = $2")
            .bind(estado)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn set_role(&self, id: i32, rol_id: i32) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE usuarios SET rol_id = $1 WHERE id_usuario = $2")
            .bind(rol_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(&self, id: i32) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM usuarios WHERE id_usuario = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
