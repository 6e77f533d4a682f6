// Authentication service - session lifecycle on top of the shared client

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use validator::Validate;

use crate::auth::{
    error::AuthError,
    events::SessionEvent,
    models::{Credentials, LoginResponse, RoleInfo, SessionRecord},
    navigator::{NavigateOnDrop, Navigator, ROOT_ROUTE},
    session::Session,
    token,
};
use crate::http::ApiClient;

/// Login endpoint, relative to the API base URL
pub const LOGIN_PATH: &str = "rbac/auth/login/";

/// Authentication service coordinating login, logout and session queries
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    session: Session,
    navigator: Arc<dyn Navigator>,
}

impl AuthService {
    pub fn new(api: ApiClient, session: Session, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            api,
            session,
            navigator,
        }
    }

    /// Log in with email and password
    ///
    /// On success the normalized record is persisted, the unauthorized flag
    /// is cleared and `SessionEvent::LoggedIn` is emitted. Backend and
    /// network failures are logged and returned unchanged inside
    /// `AuthError::Api`.
    pub async fn login(&self, credentials: &Credentials) -> Result<SessionRecord, AuthError> {
        credentials.validate()?;

        let response: LoginResponse = self
            .api
            .post(LOGIN_PATH, credentials)
            .await
            .inspect_err(|err| {
                error!(
                    "Login failed for {}: status={:?} detail={:?} error={}",
                    credentials.email,
                    err.status_code(),
                    err.detail(),
                    err
                )
            })?;

        let record = SessionRecord::from_login(response, &credentials.email)?;
        self.session.store_login(&record)?;

        info!(
            "Logged in as {} with role {}",
            record.user.email, record.role.code
        );
        self.session.events().emit(SessionEvent::LoggedIn {
            email: record.user.email.clone(),
        });
        Ok(record)
    }

    /// Log out and navigate to the root route
    ///
    /// Never fails. When the store refuses the normal cleanup, both stores
    /// are wiped and a security error is recorded instead. Navigation
    /// happens on every exit path.
    pub fn logout(&self) {
        let _navigate = NavigateOnDrop::new(self.navigator.as_ref(), ROOT_ROUTE);

        match self.session.end() {
            Ok(()) => info!("Logged out"),
            Err(err) => {
                error!("Logout cleanup failed, wiping session storage: {}", err);
                if let Err(wipe_err) = self.session.wipe() {
                    error!("Could not wipe session storage: {}", wipe_err);
                }
                if let Err(flag_err) = self.session.record_security_error(&err.to_string()) {
                    warn!("Could not record security error: {}", flag_err);
                }
            }
        }

        self.session.events().emit(SessionEvent::LoggedOut);
    }

    pub fn current_session(&self) -> Option<SessionRecord> {
        self.session.current()
    }

    pub fn access_token(&self) -> Option<String> {
        self.session.access_token()
    }

    pub fn has_permission(&self, code: &str) -> bool {
        self.session.has_permission(code)
    }

    pub fn has_role(&self, code: &str) -> bool {
        self.session.has_role(code)
    }

    pub fn role(&self) -> Option<RoleInfo> {
        self.session.role()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// True after a 401 until the next login or acknowledgement
    pub fn is_unauthorized(&self) -> bool {
        self.session.is_unauthorized()
    }

    pub fn acknowledge_unauthorized(&self) -> Result<(), AuthError> {
        Ok(self.session.acknowledge_unauthorized()?)
    }

    /// Whether a logout transition should be shown; consumes the marker
    pub fn take_logout_transition(&self) -> bool {
        self.session.take_logout_transition()
    }

    pub fn security_error(&self) -> Option<String> {
        self.session.security_error()
    }

    /// Expiry claim of the current token, read without verification
    pub fn token_expires_at(&self) -> Option<DateTime<Utc>> {
        self.access_token()
            .and_then(|token| token::peek_expiry(&token))
    }

    /// Whether the current token carries an `exp` claim in the past
    ///
    /// Informational only; the session is still ended by the backend's 401.
    pub fn is_token_expired(&self) -> bool {
        self.access_token()
            .is_some_and(|token| token::is_expired_at(&token, Utc::now()))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}
