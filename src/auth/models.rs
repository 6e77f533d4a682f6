// Authentication data models
// Login DTOs as sent/received on the wire and the persisted session record

use serde::{Deserialize, Serialize};
use tracing::warn;
use validator::Validate;

use crate::auth::error::AuthError;

/// Role code recorded when the login response carries no role
pub const UNASSIGNED_ROLE_CODE: &str = "UNASSIGNED";

/// Display name paired with `UNASSIGNED_ROLE_CODE`
pub const UNASSIGNED_ROLE_NAME: &str = "Unassigned";

/// Name used when neither a name nor an email came back
pub const DEFAULT_USER_NAME: &str = "User";

/// Login request DTO
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Credentials {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Role block of the login response; every field may be missing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRole {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// User block of the login response; every field may be missing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginUser {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Raw body of `POST rbac/auth/login/`
///
/// The backend only guarantees `access`; the rest is filled in by
/// [`SessionRecord::from_login`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub role: Option<LoginRole>,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
    #[serde(default)]
    pub user: Option<LoginUser>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleInfo {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Backend user id, absent when the login response omitted it
    #[serde(default)]
    pub id: Option<i64>,
    pub email: String,
    pub name: String,
}

/// Locally persisted view of the logged-in user
///
/// Serialized with the token under `access` so the stored JSON matches what
/// the web frontend writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(rename = "access")]
    pub access_token: String,
    pub role: RoleInfo,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub user: UserInfo,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl SessionRecord {
    /// Normalize a login response into a session record
    ///
    /// Defaults for fields the backend may omit:
    /// - role code: `UNASSIGNED` (logged as a warning, never an elevated role)
    /// - role name: the role code, or `Unassigned`
    /// - permissions: empty
    /// - user id: none
    /// - user email: the email used to log in
    /// - user name: local part of the backend email, else `User`
    ///
    /// Fails with `AuthError::MissingToken` when no usable access token came back.
    pub fn from_login(response: LoginResponse, login_email: &str) -> Result<Self, AuthError> {
        let access_token = non_empty(response.access).ok_or(AuthError::MissingToken)?;

        let role = response.role.unwrap_or_default();
        let role = match non_empty(role.code) {
            Some(code) => RoleInfo {
                name: non_empty(role.name).unwrap_or_else(|| code.clone()),
                code,
            },
            None => {
                warn!(
                    "Login response for {} carried no role code; recording {}",
                    login_email, UNASSIGNED_ROLE_CODE
                );
                RoleInfo {
                    code: UNASSIGNED_ROLE_CODE.to_string(),
                    name: non_empty(role.name).unwrap_or_else(|| UNASSIGNED_ROLE_NAME.to_string()),
                }
            }
        };

        let user = response.user.unwrap_or_default();
        let backend_email = non_empty(user.email);
        let name = non_empty(user.name)
            .or_else(|| {
                backend_email
                    .as_deref()
                    .and_then(|email| email.split('@').next())
                    .filter(|local| !local.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| DEFAULT_USER_NAME.to_string());

        Ok(Self {
            access_token,
            role,
            permissions: response.permissions.unwrap_or_default(),
            user: UserInfo {
                id: user.id,
                email: backend_email.unwrap_or_else(|| login_email.to_string()),
                name,
            },
        })
    }

    pub fn has_permission(&self, code: &str) -> bool {
        self.permissions.iter().any(|p| p == code)
    }

    pub fn has_role(&self, code: &str) -> bool {
        self.role.code == code
    }
}
