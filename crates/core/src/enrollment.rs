//! Enrollment status values, transitions and the duplicate-enrollment rule.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Status constants
// ---------------------------------------------------------------------------

/// The student is attending the course.
pub const STATUS_ENROLLED: &str = "enrolled";
/// The student finished the course.
pub const STATUS_COMPLETED: &str = "completed";
/// The enrollment was withdrawn.
pub const STATUS_CANCELLED: &str = "cancelled";

pub const VALID_STATUSES: &[&str] = &[STATUS_ENROLLED, STATUS_COMPLETED, STATUS_CANCELLED];

/// Message shown when a student tries to enroll in the same course twice.
pub const ALREADY_ENROLLED_MESSAGE: &str = "You are already enrolled in this course";

/// Backend unique index over `(course_id, student_id)`.
pub const UNIQUE_ENROLLMENT_CONSTRAINT: &str = "uq_enrollments_course_student";

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

/// Statuses that `from_status` may move to.
///
/// - `enrolled`  -> `completed`, `cancelled`
/// - `cancelled` -> `enrolled` (re-enroll)
/// - `completed` is final
pub fn valid_transitions(from_status: &str) -> &'static [&'static str] {
    match from_status {
        STATUS_ENROLLED => &[STATUS_COMPLETED, STATUS_CANCELLED],
        STATUS_CANCELLED => &[STATUS_ENROLLED],
        _ => &[],
    }
}

pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid enrollment status '{status}'. Must be one of: {VALID_STATUSES:?}"
        )))
    }
}

pub fn validate_transition(current: &str, next: &str) -> Result<(), CoreError> {
    validate_status(next)?;
    let allowed = valid_transitions(current);
    if allowed.contains(&next) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Cannot move enrollment from '{current}' to '{next}'. Allowed transitions: {allowed:?}"
        )))
    }
}

/// Reject an enrollment when a row for the same course and student already
/// exists, whatever its status.
pub fn ensure_not_enrolled(existing_status: Option<&str>) -> Result<(), CoreError> {
    match existing_status {
        None => Ok(()),
        Some(_) => Err(CoreError::Conflict(ALREADY_ENROLLED_MESSAGE.into())),
    }
}

/// Reject an enrollment into a course that has no free seats.
pub fn ensure_capacity(active_enrollments: usize, max_students: i32) -> Result<(), CoreError> {
    let max = usize::try_from(max_students).unwrap_or(0);
    if active_enrollments >= max {
        return Err(CoreError::Conflict(format!(
            "Course is full ({active_enrollments} of {max_students} seats taken)"
        )));
    }
    Ok(())
}
