//! Query-string types shared by list endpoints.

use serde::Deserialize;
use tutorhub_core::search::Page;

/// `?include_inactive=true` shows rows that were toggled off. They are
/// hidden by default.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IncludeInactiveParams {
    pub include_inactive: bool,
}

/// `?limit=&offset=` for paged lists.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PageParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageParams {
    pub fn page(&self, default_limit: i64, max_limit: i64) -> Page {
        Page::clamped(self.limit, self.offset, default_limit, max_limit)
    }
}
