// src/config.rs

use std::{env, path::PathBuf, str::FromStr, time::Duration};

use anyhow::Context;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};

use crate::{
    db::{
        AuditRepository, DocumentRepository, EquipmentRepository, HistoryRepository, LookupRepository,
        ReportRepository, RequestRepository, ResourceRepository, UserRepository,
    },
    services::{
        audit_service::AuditRecorder,
        auth::{AuthService, TokenKeys},
        document_service::DocumentService,
        equipment_service::EquipmentService,
        history_service::HistoryService,
        pdf_storage::PdfStore,
        report_service::ReportService,
        request_service::RequestService,
        resource_service::ResourceService,
        user_service::UserService,
    },
};

pub const DEV_JWT_SECRET: &str = "secreto-temporal-desarrollo";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_name(name: Option<&str>) -> Self {
        match name.map(str::trim) {
            Some(n) if n.eq_ignore_ascii_case("production") => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        *self == Environment::Production
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database: PgConnectOptions,
    pub jwt_secret: String,
    pub port: u16,
    pub environment: Environment,
    pub uploads_dir: PathBuf,
    pub db_max_connections: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Lee la configuración desde cualquier fuente de variables.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let environment = Environment::from_name(get("APP_ENV").or_else(|| get("NODE_ENV")).as_deref());

        // DATABASE_URL manda; si no, las partes sueltas sin pasar por una URL.
        let database = match get("DATABASE_URL") {
            Some(url) => PgConnectOptions::from_str(&url).context("DATABASE_URL inválida")?,
            None => {
                let host = get("DB_HOST").unwrap_or_else(|| "localhost".into());
                let port = match get("DB_PORT") {
                    Some(raw) => raw.parse::<u16>().with_context(|| format!("DB_PORT inválido: {raw}"))?,
                    None => 5432,
                };
                let user = get("DB_USER").context("DATABASE_URL o DB_USER deben estar definidas")?;
                let name = get("DB_NAME").context("DATABASE_URL o DB_NAME deben estar definidas")?;
                let mut options = PgConnectOptions::new()
                    .host(&host)
                    .port(port)
                    .username(&user)
                    .database(&name);
                if let Some(password) = var("DB_PASSWORD").filter(|p| !p.is_empty()) {
                    options = options.password(&password);
                }
                options
            }
        };

        let jwt_secret = match get("JWT_SECRET") {
            Some(secret) => secret,
            None if environment.is_production() => {
                anyhow::bail!("JWT_SECRET es obligatorio en producción");
            }
            None => {
                tracing::warn!("JWT_SECRET no definido; usando el secreto de desarrollo");
                DEV_JWT_SECRET.to_string()
            }
        };

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().with_context(|| format!("PORT inválido: {raw}"))?,
            None => 3000,
        };

        let db_max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("DB_MAX_CONNECTIONS inválido: {raw}"))?,
            None => 10,
        };

        Ok(Self {
            database,
            jwt_secret,
            port,
            environment,
            uploads_dir: get("UPLOADS_DIR").map(PathBuf::from).unwrap_or_else(|| "./uploads".into()),
            db_max_connections,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Config,
    pub auth_service: AuthService,
    pub audit: AuditRecorder,
    pub resources: ResourceService,
    pub history: HistoryService,
    pub equipment: EquipmentService,
    pub documents: DocumentService,
    pub requests: RequestService,
    pub users: UserService,
    pub reports: ReportService,
    pub lookups: LookupRepository,
    pub equipment_pdfs: PdfStore,
    pub volumetric_pdfs: PdfStore,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(config.database.clone())
            .await
            .context("Falla al conectar con la base de datos")?;

        tracing::info!("Conexión con la base de datos establecida");
        Ok(Self::with_pool(config, db_pool))
    }

    // --- Monta el grafo de dependencias ---
    pub fn with_pool(config: Config, db_pool: PgPool) -> Self {
        let audit = AuditRecorder::new(AuditRepository::new(db_pool.clone()), db_pool.clone());
        let history_repo = HistoryRepository::new(db_pool.clone());
        let lookups = LookupRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            UserRepository::new(db_pool.clone()),
            TokenKeys::new(&config.jwt_secret),
        );
        let resources = ResourceService::new(ResourceRepository::new(db_pool.clone()), audit.clone(), db_pool.clone());
        let history = HistoryService::new(history_repo.clone(), audit.clone(), db_pool.clone());
        let equipment = EquipmentService::new(
            EquipmentRepository::new(db_pool.clone()),
            history_repo,
            audit.clone(),
            db_pool.clone(),
        );
        let documents = DocumentService::new(DocumentRepository::new(db_pool.clone()), audit.clone());
        let requests = RequestService::new(
            RequestRepository::new(db_pool.clone()),
            lookups.clone(),
            audit.clone(),
            db_pool.clone(),
        );
        let users = UserService::new(UserRepository::new(db_pool.clone()), audit.clone());
        let reports = ReportService::new(ReportRepository::new(db_pool.clone()));

        let equipment_pdfs = PdfStore::new(config.uploads_dir.join("equipos"), "/api/equipos/pdfs/download");
        let volumetric_pdfs = PdfStore::new(
            config.uploads_dir.join("volumetricos"),
            "/api/volumetricos/pdfs/download",
        );

        Self {
            db_pool,
            config,
            auth_service,
            audit,
            resources,
            history,
            equipment,
            documents,
            requests,
            users,
            reports,
            lookups,
            equipment_pdfs,
            volumetric_pdfs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_in_development() {
        let cfg = config(&[("DATABASE_URL", "postgres://lab@localhost/lab")]).unwrap();
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.db_max_connections, 10);
        assert_eq!(cfg.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(cfg.environment, Environment::Development);
        assert_eq!(cfg.uploads_dir, PathBuf::from("./uploads"));
    }

    #[test]
    fn production_requires_a_secret() {
        let err = config(&[("DATABASE_URL", "postgres://x"), ("NODE_ENV", "production")]).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));

        let cfg = config(&[
            ("DATABASE_URL", "postgres://x"),
            ("APP_ENV", "production"),
            ("JWT_SECRET", "s3cr3t"),
        ])
        .unwrap();
        assert!(cfg.environment.is_production());
        assert_eq!(cfg.jwt_secret, "s3cr3t");
    }

    #[test]
    fn connection_is_assembled_from_parts() {
        let cfg = config(&[
            ("DB_HOST", "db"),
            ("DB_USER", "lab"),
            ("DB_PASSWORD", "p@ss/w:rd#1"),
            ("DB_NAME", "laboratorio"),
        ])
        .unwrap();
        assert_eq!(cfg.database.get_host(), "db");
        assert_eq!(cfg.database.get_port(), 5432);
        assert_eq!(cfg.database.get_username(), "lab");
        assert_eq!(cfg.database.get_database(), Some("laboratorio"));
    }

    #[test]
    fn database_url_overrides_parts() {
        let cfg = config(&[
            ("DATABASE_URL", "postgres://app@pg.interno:6543/lab"),
            ("DB_HOST", "db"),
            ("DB_USER", "otro"),
            ("DB_NAME", "otra"),
        ])
        .unwrap();
        assert_eq!(cfg.database.get_host(), "pg.interno");
        assert_eq!(cfg.database.get_port(), 6543);
        assert_eq!(cfg.database.get_username(), "app");
        assert_eq!(cfg.database.get_database(), Some("lab"));
    }

    #[test]
    fn invalid_db_port_is_an_error() {
        let err = config(&[("DB_USER", "lab"), ("DB_NAME", "lab"), ("DB_PORT", "cinco")]).unwrap_err();
        assert!(err.to_string().contains("DB_PORT"));
    }

    #[test]
    fn invalid_port_is_an_error() {
        assert!(config(&[("DATABASE_URL", "postgres://x"), ("PORT", "http")]).is_err());
    }
}
