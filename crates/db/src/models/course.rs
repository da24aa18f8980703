//! Tutor-authored course entity model and DTOs.

use serde::{Deserialize, Serialize};
use tutorhub_core::course_catalog::{CourseListing, CourseSource};
use tutorhub_core::types::{DbId, Timestamp};
use validator::Validate;

/// A row from the `courses` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: DbId,
    pub tutor_id: DbId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub subject: String,
    pub start_time: Option<Timestamp>,
    pub duration_hours: i32,
    pub max_students: i32,
    pub price: f64,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Course {
    /// Map onto the unified listing shape.
    pub fn to_listing(&self, display_offset_minutes: i32) -> CourseListing {
        CourseListing::new(
            self.id,
            CourseSource::Tutor,
            self.tutor_id,
            self.title.clone(),
            self.description.clone(),
            self.subject.clone(),
            self.start_time,
            self.duration_hours,
            self.max_students,
            self.price,
            self.is_active,
            display_offset_minutes,
        )
    }
}

/// DTO for creating a course. The tutor is the caller.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCourse {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 1, message = "subject is required"))]
    pub subject: String,
    pub start_time: Option<Timestamp>,
    #[serde(default = "default_duration_hours")]
    #[validate(range(min = 1, max = 1000, message = "duration_hours must be between 1 and 1000"))]
    pub duration_hours: i32,
    #[validate(range(min = 1, max = 10000, message = "max_students must be between 1 and 10000"))]
    pub max_students: i32,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// DTO for updating a course in place. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateCourse {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "subject is required"))]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 1000, message = "duration_hours must be between 1 and 1000"))]
    pub duration_hours: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 10000, message = "max_students must be between 1 and 10000"))]
    pub max_students: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

pub(crate) fn default_true() -> bool {
    true
}

/// Column default for `courses.duration_hours`.
fn default_duration_hours() -> i32 {
    1
}
