// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::me,

        // --- Usuarios ---
        handlers::users::list_roles,
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::update_status,
        handlers::users::delete_user,
        handlers::users::change_role,

        // --- Inventario ---
        handlers::reagents::lookups,
        handlers::inventory::supplies_aux,

        // --- Equipos ---
        handlers::equipment::list_equipment,
        handlers::equipment::equipment_summary,
        handlers::equipment::create_tech_sheet,
        handlers::equipment::signature,
        handlers::equipment::delete_equipment,

        // --- Solicitudes ---
        handlers::requests::departments,
        handlers::requests::cities,
        handlers::requests::list_requests,
        handlers::requests::detail_list,
        handlers::requests::create_survey,

        // --- Logs ---
        handlers::logs::list_actions,
        handlers::logs::list_movements,
        handlers::logs::stats,

        // --- Dashboard y reportes ---
        handlers::dashboard::get_metrics,
        handlers::dashboard::get_expiring_reagents,
        handlers::reports::inventory,
        handlers::reports::entries,
        handlers::reports::exits,
        handlers::reports::expirations,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Identity,
            models::auth::LoginPayload,
            models::auth::LoginResponse,

            // --- Usuarios ---
            models::auth::RoleRow,
            models::auth::UserSummary,
            models::auth::CreateUserPayload,
            models::auth::CreateUserResponse,
            models::auth::UpdateStatusPayload,
            models::auth::ChangeRolePayload,
            models::auth::ChangeRoleResponse,

            // --- Logs ---
            models::audit::ActionLog,
            models::audit::MovementLog,
            models::audit::ModuleStat,
            models::audit::ActionStat,
            models::audit::LogStats,

            // --- Dashboard ---
            models::reports::DashboardMetrics,

            // --- Archivos ---
            services::pdf_storage::StoredPdfFile,
        )
    ),
    tags(
        (name = "Auth", description = "Inicio de sesión y sesión actual"),
        (name = "Usuarios", description = "Gestión de usuarios y roles"),
        (name = "Reactivos", description = "Catálogo, lotes y documentos PDF de reactivos"),
        (name = "Insumos", description = "Catálogo e inventario de insumos"),
        (name = "Equipos", description = "Hojas de vida, fichas técnicas y calibración de equipos"),
        (name = "Solicitudes", description = "Clientes, solicitudes y encuestas"),
        (name = "Logs", description = "Bitácora de acciones y movimientos de inventario"),
        (name = "Dashboard", description = "Indicadores principales"),
        (name = "Reportes", description = "Reportes para administradores")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_declares_the_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
        assert!(doc.paths.paths.contains_key("/api/auth/login"));
        assert!(doc.paths.paths.contains_key("/api/usuarios/rol/{id}"));
    }
}
