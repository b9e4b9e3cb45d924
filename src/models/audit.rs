// src/models/audit.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::common::pagination::PageInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    AdjustStock,
    UploadPdf,
    DeletePdf,
    CreateSurvey,
    ChangeRole,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "CREAR",
            AuditAction::Update => "ACTUALIZAR",
            AuditAction::Delete => "ELIMINAR",
            AuditAction::AdjustStock => "AJUSTAR_EXISTENCIAS",
            AuditAction::UploadPdf => "SUBIR_PDF",
            AuditAction::DeletePdf => "ELIMINAR_PDF",
            AuditAction::CreateSurvey => "CREAR_ENCUESTA",
            AuditAction::ChangeRole => "CAMBIAR_ROL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementKind {
    Entry,
    Exit,
    Adjustment,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Entry => "ENTRADA",
            MovementKind::Exit => "SALIDA",
            MovementKind::Adjustment => "AJUSTE",
        }
    }
}

// ---
// Lectura de logs
// ---

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct ActionLog {
    pub id: i32,
    pub usuario_id: i32,
    pub accion: String,
    pub modulo: String,
    pub fecha: DateTime<Utc>,
    pub usuario_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct MovementLog {
    pub id_movimiento: i32,
    pub producto_tipo: String,
    pub producto_referencia: String,
    pub usuario_id: i32,
    pub tipo_movimiento: String,
    pub fecha: DateTime<Utc>,
    pub usuario_email: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActionLogFilter {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub modulo: Option<String>,
    pub accion: Option<String>,
    pub usuario_id: Option<i32>,
    pub fecha_desde: Option<String>,
    pub fecha_hasta: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MovementFilter {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub producto_tipo: Option<String>,
    pub tipo_movimiento: Option<String>,
    pub fecha_desde: Option<String>,
    pub fecha_hasta: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogPage<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: PageInfo,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct ModuleStat {
    pub modulo: String,
    pub cantidad: i64,
    pub usuarios_activos: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct ActionStat {
    pub accion: String,
    pub cantidad: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogStats {
    pub estadisticas: Vec<ModuleStat>,
    pub acciones_frecuentes: Vec<ActionStat>,
}
