// Role profile configuration endpoints

pub mod models;
pub mod service;

pub use models::*;
pub use service::ProfileService;
