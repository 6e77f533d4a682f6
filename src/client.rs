// Client facade
// Wires configuration, session stores, the shared HTTP client and every service

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use crate::auth::{AuthService, Navigator, Session, SessionEvent};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::ApiClient;
use crate::profiles::ProfileService;
use crate::rbac::{PermissionService, RoleService};
use crate::store::{KeyValueStore, MemoryStore};
use crate::trainers::TrainerService;
use crate::users::UserService;

/// Entry point to the backend API
///
/// Every service shares one `ApiClient`, so they all see the same session
/// and a 401 from any of them logs every other one out too.
#[derive(Clone)]
pub struct BelyvClient {
    api: ApiClient,
    session: Session,
    auth: AuthService,
    roles: RoleService,
    permissions: PermissionService,
    profiles: ProfileService,
    trainers: TrainerService,
    users: UserService,
}

impl BelyvClient {
    /// Open the configured session store and build the client
    pub fn from_config(config: &ClientConfig, navigator: Arc<dyn Navigator>) -> Result<Self, ApiError> {
        let persistent = config.store.open()?;
        info!(
            "Using {} session store, API at {}",
            config.store.kind(),
            config.api_url
        );
        Self::with_parts(config, persistent, navigator)
    }

    /// Build the client over an already opened persistent store
    ///
    /// The transient store is always in-memory.
    pub fn with_parts(
        config: &ClientConfig,
        persistent: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let session = Session::new(persistent, Arc::new(MemoryStore::new()));
        let api = ApiClient::new(config.api_url.clone(), config.request_timeout, &session)?;

        Ok(Self {
            auth: AuthService::new(api.clone(), session.clone(), navigator),
            roles: RoleService::new(api.clone()),
            permissions: PermissionService::new(api.clone()),
            profiles: ProfileService::new(api.clone()),
            trainers: TrainerService::new(api.clone()),
            users: UserService::new(api.clone()),
            api,
            session,
        })
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn roles(&self) -> &RoleService {
        &self.roles
    }

    pub fn permissions(&self) -> &PermissionService {
        &self.permissions
    }

    pub fn profiles(&self) -> &ProfileService {
        &self.profiles
    }

    pub fn trainers(&self) -> &TrainerService {
        &self.trainers
    }

    pub fn users(&self) -> &UserService {
        &self.users
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Session events emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.session.events().subscribe()
    }
}
