//! Batch scheduling rules.

use chrono::NaiveDate;

use crate::validation::FieldErrors;

/// Field checks for a batch about to be written.
pub fn validate_batch(
    name: &str,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    capacity: i32,
) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.require("name", name);
    if let Some(end) = end_date {
        if end < start_date {
            errors.add("end_date", "end_date must not be before start_date");
        }
    }
    if capacity <= 0 {
        errors.add("capacity", "capacity must be greater than zero");
    }
    errors
}
