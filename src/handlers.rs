pub mod auth;
pub mod dashboard;
pub mod equipment;
pub mod history;
pub mod inventory;
pub mod logs;
pub mod materials;
pub mod pdfs;
pub mod reagents;
pub mod reports;
pub mod requests;
pub mod resource;
pub mod users;
