// Fixed storage keys
//
// The persisted keys match the layout the web frontend writes to local
// storage, so a store populated by either side reads the same way.

/// JSON-encoded session record
pub const SESSION_RECORD: &str = "belyv_user";

/// Bare access token kept for older readers
pub const LEGACY_ACCESS_TOKEN: &str = "access";

/// JSON boolean, true while logged in
pub const IS_AUTHENTICATED: &str = "isAuthenticated";

/// JSON boolean, set after the backend answered 401
pub const UNAUTHORIZED: &str = "unauthorized";

/// One-shot marker set by logout (transient store)
pub const SHOW_LOGOUT_TRANSITION: &str = "showLogoutTransition";

/// Set when logout had to fall back to wiping storage (transient store)
pub const SECURITY_ERROR: &str = "securityError";

/// Message of the failure that triggered the logout fallback (transient store)
pub const SECURITY_ERROR_MESSAGE: &str = "securityErrorMessage";
