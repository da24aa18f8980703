//! Enrollment entity model and DTOs.

use serde::{Deserialize, Serialize};
use tutorhub_core::types::{DbId, Timestamp};

/// A row from the `enrollments` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: DbId,
    pub course_id: DbId,
    pub student_id: DbId,
    pub status: String,
    pub enrolled_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for enrolling. The student defaults to the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEnrollment {
    pub course_id: DbId,
    pub student_id: Option<DbId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateEnrollmentStatus {
    pub status: String,
}
