// User onboarding and management endpoints

pub mod models;
pub mod service;

pub use models::*;
pub use service::UserService;
