// Trainer service - paginated list and multipart writes over `trainersdb/trainers/`

use tracing::{debug, error};

use crate::error::ApiError;
use crate::http::ApiClient;
use crate::models::Page;
use crate::trainers::models::{Trainer, TrainerForm};
use crate::trainers::query::TrainerQuery;

pub const TRAINERS_PATH: &str = "trainersdb/trainers/";

#[derive(Clone)]
pub struct TrainerService {
    api: ApiClient,
}

impl TrainerService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list_trainers(&self, query: &TrainerQuery) -> Result<Page<Trainer>, ApiError> {
        let params = query.to_params()?;
        self.api
            .get_with_query(TRAINERS_PATH, &params)
            .await
            .inspect_err(|err| error!("Failed to fetch trainers: {}", err))
    }

    pub async fn get_trainer(&self, id: i64) -> Result<Trainer, ApiError> {
        self.api
            .get(&trainer_path(id))
            .await
            .inspect_err(|err| error!("Failed to fetch trainer {}: {}", id, err))
    }

    pub async fn create_trainer(&self, form: TrainerForm) -> Result<Trainer, ApiError> {
        debug!("Creating trainer with fields {:?}", form.field_names());
        let form = form.into_form()?;
        self.api
            .post_multipart(TRAINERS_PATH, form)
            .await
            .inspect_err(|err| error!("Failed to create trainer: {}", err))
    }

    /// Replace a trainer (PUT); the form must carry every required field
    pub async fn update_trainer(&self, id: i64, form: TrainerForm) -> Result<Trainer, ApiError> {
        debug!("Updating trainer {} with fields {:?}", id, form.field_names());
        let form = form.into_form()?;
        self.api
            .put_multipart(&trainer_path(id), form)
            .await
            .inspect_err(|err| error!("Failed to update trainer {}: {}", id, err))
    }

    pub async fn delete_trainer(&self, id: i64) -> Result<(), ApiError> {
        self.api
            .delete(&trainer_path(id))
            .await
            .inspect_err(|err| error!("Failed to delete trainer {}: {}", id, err))
    }
}

fn trainer_path(id: i64) -> String {
    format!("{}{}/", TRAINERS_PATH, id)
}
