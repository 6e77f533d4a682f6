// User management service - onboarding and the user directory

use tracing::{error, info};
use validator::Validate;

use crate::error::ApiError;
use crate::http::ApiClient;
use crate::models::Listing;
use crate::users::models::{ActiveFlag, ManagedUser, OnboardResult, OnboardUser, UserFilter};

pub const ONBOARD_PATH: &str = "profiles/onboard/";
pub const USERS_PATH: &str = "profiles/users/";

#[derive(Clone)]
pub struct UserService {
    api: ApiClient,
}

impl UserService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Create identity, role assignment and profile in one call
    pub async fn onboard_user(&self, user: &OnboardUser) -> Result<OnboardResult, ApiError> {
        user.validate()?;
        let result: OnboardResult = self
            .api
            .post(ONBOARD_PATH, user)
            .await
            .inspect_err(|err| error!("Failed to onboard user {}: {}", user.email, err))?;

        info!("Onboarded {} as {} (id {})", result.email, user.role_code, result.user_id);
        Ok(result)
    }

    /// Users matching `filter`; a paginated answer yields its first page
    pub async fn list_users(&self, filter: &UserFilter) -> Result<Vec<ManagedUser>, ApiError> {
        let listing: Listing<ManagedUser> = self
            .api
            .get_with_query(USERS_PATH, filter)
            .await
            .inspect_err(|err| error!("Failed to fetch users: {}", err))?;
        Ok(listing.into_items())
    }

    pub async fn get_user(&self, user_id: i64) -> Result<ManagedUser, ApiError> {
        self.api
            .get(&user_path(user_id))
            .await
            .inspect_err(|err| error!("Failed to fetch user {}: {}", user_id, err))
    }

    /// Activate or deactivate a user
    ///
    /// The user directory may be read-only on the backend, in which case
    /// this surfaces `ApiError::Http` with status 405.
    pub async fn set_user_active(&self, user_id: i64, is_active: bool) -> Result<ManagedUser, ApiError> {
        self.api
            .patch(&user_path(user_id), &ActiveFlag { is_active })
            .await
            .inspect_err(|err| {
                error!("Failed to set is_active={} for user {}: {}", is_active, user_id, err)
            })
    }
}

fn user_path(user_id: i64) -> String {
    format!("{}{}/", USERS_PATH, user_id)
}
