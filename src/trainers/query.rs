// Trainer list query parameters
// Filters, search, ordering and pagination for `GET trainersdb/trainers/`

use serde::Serialize;

use crate::error::ApiError;

/// Largest page the backend will serve
pub const MAX_PAGE_SIZE: u32 = 100;

/// Fields the trainer list can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerSortField {
    YearsOfExperience,
    DateOfJoining,
    Name,
}

impl TrainerSortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainerSortField::YearsOfExperience => "years_of_experience",
            TrainerSortField::DateOfJoining => "date_of_joining",
            TrainerSortField::Name => "name",
        }
    }

    /// Parse a sort field name (case-insensitive)
    pub fn parse(s: &str) -> Result<Self, ApiError> {
        match s.to_lowercase().as_str() {
            "years_of_experience" | "experience" => Ok(TrainerSortField::YearsOfExperience),
            "date_of_joining" | "joined" => Ok(TrainerSortField::DateOfJoining),
            "name" => Ok(TrainerSortField::Name),
            _ => Err(ApiError::InvalidRequest(format!(
                "Invalid sort field '{}'. Must be 'years_of_experience', 'date_of_joining' or 'name'",
                s
            ))),
        }
    }
}

/// Sort order options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Query for the paginated trainer list
///
/// Every filter is optional; unset filters are left out of the query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainerQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub search: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub is_active: Option<bool>,
    pub min_experience: Option<u32>,
    pub max_experience: Option<u32>,
    pub ordering: Option<(TrainerSortField, SortOrder)>,
}

/// Wire form of `TrainerQuery`, using the backend's filter names
#[derive(Debug, Serialize, PartialEq)]
pub struct TrainerQueryParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    employment_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_active: Option<bool>,
    #[serde(rename = "years_of_experience__gte", skip_serializing_if = "Option::is_none")]
    min_experience: Option<u32>,
    #[serde(rename = "years_of_experience__lte", skip_serializing_if = "Option::is_none")]
    max_experience: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ordering: Option<String>,
}

impl TrainerQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn employment_type(mut self, employment_type: impl Into<String>) -> Self {
        self.employment_type = Some(employment_type.into());
        self
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    /// Inclusive bounds on years of experience
    pub fn experience(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_experience = min;
        self.max_experience = max;
        self
    }

    pub fn order_by(mut self, field: TrainerSortField, order: SortOrder) -> Self {
        self.ordering = Some((field, order));
        self
    }

    /// Validates and normalizes the query into its wire form
    pub fn to_params(&self) -> Result<TrainerQueryParams, ApiError> {
        if self.page == Some(0) {
            return Err(ApiError::InvalidRequest(
                "page must be a positive number (greater than 0)".to_string(),
            ));
        }
        if let Some(size) = self.page_size {
            if size == 0 || size > MAX_PAGE_SIZE {
                return Err(ApiError::InvalidRequest(format!(
                    "page_size must be between 1 and {}",
                    MAX_PAGE_SIZE
                )));
            }
        }
        if let (Some(min), Some(max)) = (self.min_experience, self.max_experience) {
            if min > max {
                return Err(ApiError::InvalidRequest(
                    "minimum experience cannot be greater than maximum experience".to_string(),
                ));
            }
        }

        let ordering = self.ordering.map(|(field, order)| match order {
            SortOrder::Asc => field.as_str().to_string(),
            SortOrder::Desc => format!("-{}", field.as_str()),
        });

        Ok(TrainerQueryParams {
            page: self.page,
            page_size: self.page_size,
            search: normalize(&self.search),
            location: normalize(&self.location),
            employment_type: normalize(&self.employment_type),
            is_active: self.is_active,
            min_experience: self.min_experience,
            max_experience: self.max_experience,
            ordering,
        })
    }
}

/// Trims whitespace; empty strings are dropped
fn normalize(s: &Option<String>) -> Option<String> {
    s.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
