// RBAC data models
// Roles, permissions and their assignment payloads as the backend serializes them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::{validate_code, validate_ids};

/// Role as returned by `rbac/roles/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Create/replace payload for a role
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RoleInput {
    #[validate(custom = "validate_code")]
    pub code: String,
    #[validate(length(min = 1, max = 255, message = "Role name must not be empty"))]
    pub name: String,
}

impl RoleInput {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Body of `POST rbac/assign-role/`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AssignRole {
    #[validate(range(min = 1))]
    pub user: i64,
    #[validate(range(min = 1))]
    pub role: i64,
}

/// User-role link created by an assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleAssignment {
    #[serde(default)]
    pub id: Option<i64>,
    pub user: i64,
    pub role: i64,
    #[serde(default)]
    pub role_name: Option<String>,
    #[serde(default)]
    pub assigned_at: Option<DateTime<Utc>>,
}

/// Permission as returned by `rbac/permissions/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    pub id: i64,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Create payload for a permission
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PermissionInput {
    #[validate(custom = "validate_code")]
    pub code: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub module: String,
}

/// Body of `POST rbac/role-permissions/`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AssignPermissions {
    #[validate(range(min = 1))]
    pub role_id: i64,
    #[validate(custom = "validate_ids")]
    pub permission_ids: Vec<i64>,
}

/// Backend acknowledgement of a permission assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignPermissionsResult {
    pub status: String,
    pub assigned_count: u32,
}

/// Role-permission link from `GET rbac/role-permissions/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermission {
    pub id: i64,
    pub role: i64,
    pub permission: i64,
    #[serde(default)]
    pub role_code: Option<String>,
    #[serde(default)]
    pub permission_code: Option<String>,
}
