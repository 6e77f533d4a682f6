// HTTP layer
// The shared backend client and its logging middleware

pub mod client;
pub mod logging;

pub use client::ApiClient;
pub use logging::RequestLogger;
