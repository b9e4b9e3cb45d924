pub mod audit;
pub mod auth;
pub mod equipment;
pub mod history;
pub mod materials;
pub mod reagents;
pub mod reports;
pub mod requests;
pub mod resource;
pub mod stationery;
pub mod supplies;
