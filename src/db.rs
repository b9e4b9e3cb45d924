pub mod sql;

pub mod user_repo;
pub use user_repo::UserRepository;
pub mod audit_repo;
pub use audit_repo::AuditRepository;
pub mod resource_repo;
pub use resource_repo::ResourceRepository;
pub mod history_repo;
pub use history_repo::HistoryRepository;
pub mod equipment_repo;
pub use equipment_repo::EquipmentRepository;
pub mod document_repo;
pub use document_repo::DocumentRepository;
pub mod request_repo;
pub use request_repo::RequestRepository;
pub mod lookup_repo;
pub use lookup_repo::LookupRepository;
pub mod report_repo;
pub use report_repo::ReportRepository;
