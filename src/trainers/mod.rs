// Trainer records endpoints

pub mod models;
pub mod query;
pub mod service;

pub use models::{StackCourse, Trainer, TrainerForm};
pub use query::{SortOrder, TrainerQuery, TrainerSortField, MAX_PAGE_SIZE};
pub use service::TrainerService;
