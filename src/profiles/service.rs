// Profile configuration service - role configs and their dynamic fields

use tracing::error;
use validator::Validate;

use crate::error::ApiError;
use crate::http::ApiClient;
use crate::profiles::models::{
    FieldDefinition, FieldInput, FieldPatch, NewField, ProfileConfig, ProfileConfigInput,
    ProfileConfigPatch,
};

pub const CONFIGS_PATH: &str = "profiles/configs/";
pub const FIELDS_PATH: &str = "profiles/fields/";

#[derive(Clone)]
pub struct ProfileService {
    api: ApiClient,
}

impl ProfileService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list_configs(&self) -> Result<Vec<ProfileConfig>, ApiError> {
        self.api
            .get(CONFIGS_PATH)
            .await
            .inspect_err(|err| error!("Failed to fetch role configs: {}", err))
    }

    /// One config including its dynamic field definitions
    pub async fn config_details(&self, config_id: i64) -> Result<ProfileConfig, ApiError> {
        self.api
            .get(&format!("{}{}/", CONFIGS_PATH, config_id))
            .await
            .inspect_err(|err| error!("Failed to fetch config {}: {}", config_id, err))
    }

    pub async fn create_config(&self, config: &ProfileConfigInput) -> Result<ProfileConfig, ApiError> {
        config.validate()?;
        self.api
            .post(CONFIGS_PATH, config)
            .await
            .inspect_err(|err| error!("Failed to create config for role {}: {}", config.role, err))
    }

    pub async fn update_config(
        &self,
        config_id: i64,
        patch: &ProfileConfigPatch,
    ) -> Result<ProfileConfig, ApiError> {
        self.api
            .patch(&format!("{}{}/", CONFIGS_PATH, config_id), patch)
            .await
            .inspect_err(|err| error!("Failed to update config {}: {}", config_id, err))
    }

    pub async fn add_custom_field(
        &self,
        config_id: i64,
        field: &FieldInput,
    ) -> Result<FieldDefinition, ApiError> {
        field.validate()?;
        let body = NewField {
            config: config_id,
            field,
        };
        self.api
            .post(FIELDS_PATH, &body)
            .await
            .inspect_err(|err| error!("Failed to add custom field {}: {}", field.name, err))
    }

    pub async fn update_custom_field(
        &self,
        field_id: i64,
        patch: &FieldPatch,
    ) -> Result<FieldDefinition, ApiError> {
        self.api
            .patch(&format!("{}{}/", FIELDS_PATH, field_id), patch)
            .await
            .inspect_err(|err| error!("Failed to update field {}: {}", field_id, err))
    }

    pub async fn delete_custom_field(&self, field_id: i64) -> Result<(), ApiError> {
        self.api
            .delete(&format!("{}{}/", FIELDS_PATH, field_id))
            .await
            .inspect_err(|err| error!("Failed to delete field {}: {}", field_id, err))
    }
}
