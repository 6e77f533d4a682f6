// User management data models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::validation::validate_code;

/// Body of `POST profiles/onboard/`
///
/// Creates the identity, assigns the role and builds the profile in one
/// call. `profile_data` feeds the role's dedicated profile model,
/// `extra_data` its dynamic fields.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OnboardUser {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1))]
    pub password: String,
    #[validate(custom = "validate_code", length(max = 50))]
    pub role_code: String,
    #[serde(default)]
    pub profile_data: Map<String, Value>,
    #[serde(default)]
    pub extra_data: Map<String, Value>,
}

impl OnboardUser {
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        password: impl Into<String>,
        role_code: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            password: password.into(),
            role_code: role_code.into(),
            profile_data: Map::new(),
            extra_data: Map::new(),
        }
    }

    pub fn profile(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.profile_data.insert(key.into(), value.into());
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra_data.insert(key.into(), value.into());
        self
    }
}

/// Backend answer to a successful onboarding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardResult {
    pub status: String,
    pub user_id: i64,
    pub email: String,
}

/// User as listed by `profiles/users/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagedUser {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Filters for the user list; unset filters are not sent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFilter {
    /// Role code, e.g. `STUDENT`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Body of the activation PATCH
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveFlag {
    pub is_active: bool,
}
