//! Institution-authored course entity model and DTOs.

use serde::{Deserialize, Serialize};
use tutorhub_core::course_catalog::{
    duration_hours_from_label, CourseListing, CourseSource, INSTITUTION_DEFAULT_MAX_STUDENTS,
};
use tutorhub_core::types::{DbId, Timestamp};
use validator::Validate;

use super::course::default_true;

/// A row from the `institution_courses` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstitutionCourse {
    pub id: DbId,
    pub institution_id: DbId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    /// Free text such as "8 weeks".
    #[serde(default)]
    pub duration: String,
    pub fee: f64,
    pub start_date: Option<Timestamp>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl InstitutionCourse {
    /// Map onto the tutor-course listing shape: `category` becomes the
    /// subject, `fee` the price, and the duration label's leading number
    /// the hours. The table has no capacity column, so a fixed seat count
    /// is shown.
    pub fn to_listing(&self, display_offset_minutes: i32) -> CourseListing {
        CourseListing::new(
            self.id,
            CourseSource::Institution,
            self.institution_id,
            self.title.clone(),
            self.description.clone(),
            self.category.clone(),
            self.start_date,
            duration_hours_from_label(&self.duration),
            INSTITUTION_DEFAULT_MAX_STUDENTS,
            self.fee,
            self.is_active,
            display_offset_minutes,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateInstitutionCourse {
    pub institution_id: DbId,
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 1, message = "category is required"))]
    pub category: String,
    #[serde(default)]
    pub duration: String,
    #[validate(range(min = 0.0, message = "fee must not be negative"))]
    pub fee: f64,
    pub start_date: Option<Timestamp>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateInstitutionCourse {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "category is required"))]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "fee must not be negative"))]
    pub fee: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn listing_maps_institution_columns() {
        let now = Utc.with_ymd_and_hms(2030, 3, 1, 9, 30, 0).unwrap();
        let course = InstitutionCourse {
            id: 4,
            institution_id: 2,
            title: "JEE Foundation".into(),
            description: String::new(),
            category: "Engineering".into(),
            duration: "12 weeks".into(),
            fee: 15000.0,
            start_date: Some(now),
            is_active: false,
            created_at: now,
            updated_at: now,
        };
        let listing = course.to_listing(0);
        assert_eq!(listing.subject, "Engineering");
        assert_eq!(listing.duration_hours, 12);
        assert_eq!(listing.price, 15000.0);
        assert_eq!(listing.max_students, INSTITUTION_DEFAULT_MAX_STUDENTS);
        assert_eq!(listing.status_label, "Inactive");
        assert_eq!(listing.start_display.as_deref(), Some("3/1/2030, 9:30:00 AM"));
        assert_eq!(listing.source, CourseSource::Institution);
    }
}
