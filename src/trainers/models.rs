// Trainer data models
// Trainer records and the multipart form used to create or replace them

use chrono::NaiveDate;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Course linked to a trainer's stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackCourse {
    pub id: i64,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Trainer record from `trainersdb/trainers/`
///
/// The backend serializes every model column; the ones not modelled here
/// are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trainer {
    pub id: i64,
    #[serde(default)]
    pub trainer_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub employment_type: Option<String>,
    #[serde(default)]
    pub years_of_experience: Option<u32>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub date_of_joining: Option<NaiveDate>,
    #[serde(default)]
    pub stack_details: Vec<StackCourse>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One part of a trainer form
#[derive(Debug, Clone, PartialEq, Eq)]
enum FormPart {
    Text {
        field: String,
        value: String,
    },
    File {
        field: String,
        file_name: String,
        mime: String,
        bytes: Vec<u8>,
    },
}

impl FormPart {
    fn field(&self) -> &str {
        match self {
            FormPart::Text { field, .. } | FormPart::File { field, .. } => field,
        }
    }
}

/// `multipart/form-data` body for trainer create and update
///
/// Parts are sent in insertion order. Repeating a field name sends the
/// value several times, which is how list fields such as `stack` are
/// encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrainerForm {
    parts: Vec<FormPart>,
}

impl TrainerForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Add one value per item under the same field name
    pub fn list<I, V>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        for value in values {
            self.parts.push(FormPart::Text {
                field: field.to_string(),
                value: value.to_string(),
            });
        }
        self
    }

    pub fn file(
        mut self,
        field: impl Into<String>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.parts.push(FormPart::File {
            field: field.into(),
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Names of every part, in the order they are sent
    pub fn field_names(&self) -> Vec<&str> {
        self.parts.iter().map(FormPart::field).collect()
    }

    /// Build the reqwest form; fails on an unparseable MIME type
    pub fn into_form(self) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for part in self.parts {
            form = match part {
                FormPart::Text { field, value } => form.text(field, value),
                FormPart::File {
                    field,
                    file_name,
                    mime,
                    bytes,
                } => {
                    let part = Part::bytes(bytes)
                        .file_name(file_name)
                        .mime_str(&mime)
                        .map_err(|err| {
                            ApiError::InvalidRequest(format!("Invalid MIME type for {}: {}", field, err))
                        })?;
                    form.part(field, part)
                }
            };
        }
        Ok(form)
    }
}
