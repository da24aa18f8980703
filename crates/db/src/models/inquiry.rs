//! Inquiry entity model and DTOs.

use serde::{Deserialize, Serialize};
use tutorhub_core::types::{DbId, Timestamp};
use validator::Validate;

/// A row from the `inquiries` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inquiry {
    pub id: DbId,
    pub institution_id: DbId,
    pub course_id: Option<DbId>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub message: String,
    pub status: String,
    #[serde(default)]
    pub notes: String,
    pub last_contacted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Public contact-form submission.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateInquiry {
    pub institution_id: DbId,
    pub course_id: Option<DbId>,
    #[validate(length(max = 120, message = "name must be at most 120 characters"))]
    pub name: String,
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 20, message = "phone must be at most 20 characters"))]
    pub phone: String,
    pub message: String,
}

/// Staff update: move the inquiry along the pipeline and/or edit notes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateInquiry {
    pub status: Option<String>,
    pub notes: Option<String>,
}
