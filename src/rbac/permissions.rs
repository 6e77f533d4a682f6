// Permission service - `rbac/permissions/` and role-permission links

use serde::Serialize;
use tracing::error;
use validator::Validate;

use crate::error::ApiError;
use crate::http::ApiClient;
use crate::rbac::models::{
    AssignPermissions, AssignPermissionsResult, Permission, PermissionInput, RolePermission,
};

pub const PERMISSIONS_PATH: &str = "rbac/permissions/";
pub const ROLE_PERMISSIONS_PATH: &str = "rbac/role-permissions/";

#[derive(Debug, Serialize)]
struct RoleFilter {
    role_id: i64,
}

#[derive(Clone)]
pub struct PermissionService {
    api: ApiClient,
}

impl PermissionService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list_permissions(&self) -> Result<Vec<Permission>, ApiError> {
        self.api
            .get(PERMISSIONS_PATH)
            .await
            .inspect_err(|err| error!("Failed to fetch permissions: {}", err))
    }

    pub async fn create_permission(&self, permission: &PermissionInput) -> Result<Permission, ApiError> {
        permission.validate()?;
        self.api
            .post(PERMISSIONS_PATH, permission)
            .await
            .inspect_err(|err| {
                error!("Failed to create permission {}: {}", permission.code, err)
            })
    }

    /// Link permissions to a role; links that already exist are kept
    pub async fn assign_permissions_to_role(
        &self,
        role_id: i64,
        permission_ids: Vec<i64>,
    ) -> Result<AssignPermissionsResult, ApiError> {
        let body = AssignPermissions {
            role_id,
            permission_ids,
        };
        body.validate()?;
        self.api
            .post(ROLE_PERMISSIONS_PATH, &body)
            .await
            .inspect_err(|err| error!("Failed to assign permissions to role {}: {}", role_id, err))
    }

    pub async fn role_permissions(&self, role_id: i64) -> Result<Vec<RolePermission>, ApiError> {
        self.api
            .get_with_query(ROLE_PERMISSIONS_PATH, &RoleFilter { role_id })
            .await
            .inspect_err(|err| {
                error!("Failed to fetch permissions for role {}: {}", role_id, err)
            })
    }
}
