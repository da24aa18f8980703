//! Inquiry (lead) tracking for institutions.
//!
//! Inquiries arrive through the public contact form and are worked through
//! a small pipeline by institution staff.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;
use crate::validation::FieldErrors;

// ---------------------------------------------------------------------------
// Status constants
// ---------------------------------------------------------------------------

/// Freshly submitted, nobody has responded yet.
pub const STATUS_NEW: &str = "new";
pub const STATUS_CONTACTED: &str = "contacted";
pub const STATUS_FOLLOW_UP: &str = "follow_up";
/// The lead enrolled.
pub const STATUS_CONVERTED: &str = "converted";
pub const STATUS_CLOSED: &str = "closed";

pub const VALID_STATUSES: &[&str] = &[
    STATUS_NEW,
    STATUS_CONTACTED,
    STATUS_FOLLOW_UP,
    STATUS_CONVERTED,
    STATUS_CLOSED,
];

pub const MAX_MESSAGE_LENGTH: usize = 5_000;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex")
});

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

/// Statuses that `from_status` may move to.
///
/// - `new`       -> `contacted`, `closed`
/// - `contacted` -> `follow_up`, `converted`, `closed`
/// - `follow_up` -> `contacted`, `converted`, `closed`
/// - `converted` -> `follow_up` (re-open)
/// - `closed`    -> `follow_up` (re-open)
pub fn valid_transitions(from_status: &str) -> &'static [&'static str] {
    match from_status {
        STATUS_NEW => &[STATUS_CONTACTED, STATUS_CLOSED],
        STATUS_CONTACTED => &[STATUS_FOLLOW_UP, STATUS_CONVERTED, STATUS_CLOSED],
        STATUS_FOLLOW_UP => &[STATUS_CONTACTED, STATUS_CONVERTED, STATUS_CLOSED],
        STATUS_CONVERTED | STATUS_CLOSED => &[STATUS_FOLLOW_UP],
        _ => &[],
    }
}

pub fn is_terminal(status: &str) -> bool {
    matches!(status, STATUS_CONVERTED | STATUS_CLOSED)
}

/// Whether moving into `status` stamps `last_contacted_at`.
pub fn stamps_contact(status: &str) -> bool {
    status == STATUS_CONTACTED
}

pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid inquiry status '{status}'. Must be one of: {VALID_STATUSES:?}"
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
            "Cannot move inquiry from '{current}' to '{next}'. Allowed transitions: {allowed:?}"
        )))
    }
}

/// Field checks for a contact-form submission.
pub fn validate_inquiry(name: &str, email: &str, message: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.require("name", name);
    errors.require("message", message);
    if email.trim().is_empty() {
        errors.add("email", "email is required");
    } else if !EMAIL_RE.is_match(email.trim()) {
        errors.add("email", "email must be a valid address");
    }
    if message.chars().count() > MAX_MESSAGE_LENGTH {
        errors.add(
            "message",
            format!("message exceeds {MAX_MESSAGE_LENGTH} characters"),
        );
    }
    errors
}
