// Belyv API client
// Session-aware typed access to the Belyv REST backend: RBAC, profile
// configuration, trainer records and user onboarding

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod profiles;
pub mod rbac;
pub mod store;
pub mod trainers;
pub mod users;
pub mod validation;

pub use auth::{AuthError, AuthService, Credentials, Navigator, SessionEvent, SessionRecord};
pub use client::BelyvClient;
pub use config::{ClientConfig, ConfigError};
pub use error::ApiError;
pub use http::ApiClient;
pub use models::{Listing, Page};
pub use store::{KeyValueStore, StoreConfig};

#[cfg(test)]
mod tests;
