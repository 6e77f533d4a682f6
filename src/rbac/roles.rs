// Role service - CRUD over `rbac/roles/` plus user role assignment

use tracing::error;
use validator::Validate;

use crate::error::ApiError;
use crate::http::ApiClient;
use crate::rbac::models::{AssignRole, Role, RoleAssignment, RoleInput};

pub const ROLES_PATH: &str = "rbac/roles/";
pub const ASSIGN_ROLE_PATH: &str = "rbac/assign-role/";

#[derive(Clone)]
pub struct RoleService {
    api: ApiClient,
}

impl RoleService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list_roles(&self) -> Result<Vec<Role>, ApiError> {
        self.api
            .get(ROLES_PATH)
            .await
            .inspect_err(|err| error!("Failed to fetch roles: {}", err))
    }

    pub async fn create_role(&self, role: &RoleInput) -> Result<Role, ApiError> {
        role.validate()?;
        self.api
            .post(ROLES_PATH, role)
            .await
            .inspect_err(|err| error!("Failed to create role {}: {}", role.code, err))
    }

    pub async fn get_role(&self, id: i64) -> Result<Role, ApiError> {
        self.api
            .get(&role_path(id))
            .await
            .inspect_err(|err| error!("Failed to fetch role {}: {}", id, err))
    }

    /// Replace a role (PUT)
    pub async fn update_role(&self, id: i64, role: &RoleInput) -> Result<Role, ApiError> {
        role.validate()?;
        self.api
            .put(&role_path(id), role)
            .await
            .inspect_err(|err| error!("Failed to update role {}: {}", id, err))
    }

    pub async fn delete_role(&self, id: i64) -> Result<(), ApiError> {
        self.api
            .delete(&role_path(id))
            .await
            .inspect_err(|err| error!("Failed to delete role {}: {}", id, err))
    }

    pub async fn assign_role_to_user(&self, user_id: i64, role_id: i64) -> Result<RoleAssignment, ApiError> {
        let body = AssignRole {
            user: user_id,
            role: role_id,
        };
        body.validate()?;
        self.api
            .post(ASSIGN_ROLE_PATH, &body)
            .await
            .inspect_err(|err| {
                error!("Failed to assign role {} to user {}: {}", role_id, user_id, err)
            })
    }
}

fn role_path(id: i64) -> String {
    format!("{}{}/", ROLES_PATH, id)
}
