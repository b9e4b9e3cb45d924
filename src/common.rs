pub mod db_utils;
pub mod error;
pub mod extract;
pub mod fields;
pub mod pagination;
pub mod upload;
