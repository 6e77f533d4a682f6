// Authentication module
// Session persistence, bearer injection, 401 handling, login and logout

pub mod error;
pub mod events;
pub mod middleware;
pub mod models;
pub mod navigator;
pub mod service;
pub mod session;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use events::{SessionEvent, SessionEvents};
pub use middleware::{BearerAuth, UnauthorizedGuard};
pub use models::{Credentials, RoleInfo, SessionRecord, UserInfo};
pub use navigator::{LogNavigator, Navigator, RecordingNavigator, ROOT_ROUTE};
pub use service::AuthService;
pub use session::Session;
