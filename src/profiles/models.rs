// Profile configuration data models
// Per-role profile configs and the dynamic fields attached to them

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::validation::validate_field_key;

/// Input type of a dynamic profile field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    Text,
    Number,
    Date,
    Boolean,
    Choice,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "TEXT",
            FieldType::Number => "NUMBER",
            FieldType::Date => "DATE",
            FieldType::Boolean => "BOOLEAN",
            FieldType::Choice => "CHOICE",
        }
    }
}

impl Default for FieldType {
    fn default() -> Self {
        FieldType::Text
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Dynamic field definition as nested in a config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: i64,
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub is_required: bool,
    /// Dropdown values for `CHOICE` fields
    #[serde(default)]
    pub options: Vec<String>,
}

/// Profile configuration of one role
///
/// A role either points at a dedicated profile model (`model_path`) or uses
/// the generic profile with `dynamic_fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub id: i64,
    pub role: i64,
    #[serde(default)]
    pub role_name: Option<String>,
    #[serde(default)]
    pub role_code: Option<String>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub model_path: Option<String>,
    #[serde(default)]
    pub dynamic_fields: Vec<FieldDefinition>,
}

impl ProfileConfig {
    pub fn uses_generic_profile(&self) -> bool {
        self.model_path.as_deref().map_or(true, str::is_empty)
    }
}

/// Body of `POST profiles/configs/`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProfileConfigInput {
    #[validate(range(min = 1))]
    pub role: i64,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_path: Option<String>,
}

/// Partial update of a profile config (PATCH)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileConfigPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_path: Option<String>,
}

/// Dynamic field payload; `config` is supplied by the service
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_choice_options"))]
pub struct FieldInput {
    #[validate(custom = "validate_field_key", length(max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 255, message = "Field label must not be empty"))]
    pub label: String,
    #[serde(default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub options: Vec<String>,
}

/// CHOICE fields need something to choose from
fn validate_choice_options(field: &FieldInput) -> Result<(), ValidationError> {
    if field.field_type == FieldType::Choice && field.options.is_empty() {
        Err(ValidationError::new("choice_field_without_options"))
    } else {
        Ok(())
    }
}

/// Body of `POST profiles/fields/`
#[derive(Debug, Clone, Serialize)]
pub struct NewField<'a> {
    pub config: i64,
    #[serde(flatten)]
    pub field: &'a FieldInput,
}

/// Partial update of a dynamic field (PATCH)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}
