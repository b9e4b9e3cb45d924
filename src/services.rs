pub mod audit_service;
pub mod auth;
pub mod document_service;
pub mod equipment_service;
pub mod history_service;
pub mod pdf_storage;
pub mod report_service;
pub mod request_service;
pub mod resource_service;
pub mod user_service;
