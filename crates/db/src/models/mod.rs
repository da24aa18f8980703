//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `Deserialize` + `Serialize` entity struct matching the stored row
//! - A `Deserialize` + `Validate` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod batch;
pub mod course;
pub mod enrollment;
pub mod inquiry;
pub mod institution;
pub mod institution_course;
pub mod pricing_tier;
pub mod wizard_draft;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tutorhub_core::error::CoreError;
use tutorhub_core::gateway::{GatewayError, Record};
use tutorhub_core::validation::FieldErrors;
use validator::Validate;

/// Decode a gateway row into a typed entity.
pub fn from_record<T: DeserializeOwned>(record: Record) -> Result<T, GatewayError> {
    serde_json::from_value(Value::Object(record)).map_err(GatewayError::from)
}

/// Encode a DTO as a gateway record. `None` fields marked
/// `skip_serializing_if` are left out, which makes update DTOs patches.
pub fn to_record<T: Serialize>(value: &T) -> Result<Record, GatewayError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(GatewayError::Decode(format!(
            "Expected an object to write, got {other}"
        ))),
    }
}

/// Run `validator` rules and report failures as field-level errors.
pub fn validate_input<T: Validate>(input: &T) -> Result<(), CoreError> {
    let Err(report) = input.validate() else {
        return Ok(());
    };
    let mut errors = FieldErrors::new();
    for (field, failures) in report.field_errors() {
        for failure in failures {
            let message = failure
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("{field} is invalid ({})", failure.code));
            errors.add(&field, message);
        }
    }
    errors.into_result()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Serialize, Deserialize, Validate)]
    struct Probe {
        #[validate(length(min = 1, message = "name is required"))]
        name: String,
        #[validate(range(min = 1))]
        seats: i32,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    }

    #[test]
    fn validate_input_collects_field_messages() {
        let probe = Probe {
            name: String::new(),
            seats: 0,
            note: None,
        };
        assert_matches!(
            validate_input(&probe),
            Err(CoreError::FieldValidation(e))
                if e.messages("name") == ["name is required"] && e.contains("seats")
        );
    }

    #[test]
    fn to_record_skips_absent_options() {
        let probe = Probe {
            name: "x".into(),
            seats: 2,
            note: None,
        };
        let record = to_record(&probe).unwrap();
        assert!(!record.contains_key("note"));
        let back: Probe = from_record(record).unwrap();
        assert_eq!(back.seats, 2);
    }
}
