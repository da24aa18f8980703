//! Batch entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tutorhub_core::types::{DbId, Timestamp};
use validator::Validate;

use super::course::default_true;

/// A row from the `batches` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub id: DbId,
    pub institution_id: DbId,
    pub course_id: Option<DbId>,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub schedule: String,
    pub capacity: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a batch. Date ordering and capacity are checked by
/// `tutorhub_core::batch::validate_batch`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateBatch {
    pub institution_id: DbId,
    pub course_id: Option<DbId>,
    #[validate(length(max = 120, message = "name must be at most 120 characters"))]
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub schedule: String,
    pub capacity: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateBatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<DbId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 120, message = "name must be at most 120 characters"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UpdateBatch {
    /// Overlay this patch on `current` for re-validation.
    pub fn merged_with(&self, current: &Batch) -> (String, NaiveDate, Option<NaiveDate>, i32) {
        (
            self.name.clone().unwrap_or_else(|| current.name.clone()),
            self.start_date.unwrap_or(current.start_date),
            self.end_date.or(current.end_date),
            self.capacity.unwrap_or(current.capacity),
        )
    }
}
