//! Response envelopes.
//!
//! Every success body is wrapped as `{ "data": ... }`. Paged lists add the
//! window that was applied so clients can request the next page.

use serde::Serialize;
use tutorhub_core::search::Page;

/// `{ "data": T }`.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "data": [T], "limit": n, "offset": n }`.
#[derive(Debug, Serialize)]
pub struct PageResponse<T: Serialize> {
    pub data: Vec<T>,
    pub limit: i64,
    pub offset: i64,
}

impl<T: Serialize> PageResponse<T> {
    pub fn new(data: Vec<T>, page: Page) -> Self {
        Self {
            data,
            limit: page.limit,
            offset: page.offset,
        }
    }
}
