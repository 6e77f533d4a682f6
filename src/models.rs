// Shared response models

use serde::{Deserialize, Serialize};

/// One page of a paginated list endpoint
///
/// `next` and `previous` are absolute URLs of the neighbouring pages, or
/// `None` at either end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }
}

/// List body that may or may not be paginated, depending on backend settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Paged(Page<T>),
    Plain(Vec<T>),
}

impl<T> Listing<T> {
    /// Items of this listing; for a paged body only the current page
    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Paged(page) => page.results,
            Listing::Plain(items) => items,
        }
    }
}
