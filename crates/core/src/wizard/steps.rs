//! Institution signup wizard step definitions.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The six steps of the institution signup wizard, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    BasicInfo,
    Contact,
    Courses,
    Batches,
    Facilities,
    Fees,
}

/// Total number of steps in the wizard.
pub const TOTAL_STEPS: u8 = 6;

/// Minimum step number (1-based).
pub const MIN_STEP: u8 = 1;

/// Maximum step number (1-based).
pub const MAX_STEP: u8 = 6;

impl StepId {
    pub const ALL: [StepId; 6] = [
        StepId::BasicInfo,
        StepId::Contact,
        StepId::Courses,
        StepId::Batches,
        StepId::Facilities,
        StepId::Fees,
    ];

    /// Convert a 1-based step number to a `StepId`.
    pub fn from_number(n: u8) -> Result<Self, CoreError> {
        match n {
            1 => Ok(Self::BasicInfo),
            2 => Ok(Self::Contact),
            3 => Ok(Self::Courses),
            4 => Ok(Self::Batches),
            5 => Ok(Self::Facilities),
            6 => Ok(Self::Fees),
            _ => Err(CoreError::Validation(format!(
                "Invalid step number {n}. Must be between {MIN_STEP} and {MAX_STEP}"
            ))),
        }
    }

    /// Convert to a 1-based step number.
    pub fn to_number(self) -> u8 {
        match self {
            Self::BasicInfo => 1,
            Self::Contact => 2,
            Self::Courses => 3,
            Self::Batches => 4,
            Self::Facilities => 5,
            Self::Fees => 6,
        }
    }

    /// Parse a step name as used in URLs and the `form_data` read model.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "basic_info" => Ok(Self::BasicInfo),
            "contact" => Ok(Self::Contact),
            "courses" => Ok(Self::Courses),
            "batches" => Ok(Self::Batches),
            "facilities" => Ok(Self::Facilities),
            "fees" => Ok(Self::Fees),
            _ => Err(CoreError::Validation(format!(
                "Invalid step '{s}'. Must be one of: basic_info, contact, courses, batches, facilities, fees"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BasicInfo => "basic_info",
            Self::Contact => "contact",
            Self::Courses => "courses",
            Self::Batches => "batches",
            Self::Facilities => "facilities",
            Self::Fees => "fees",
        }
    }

    /// Human-readable label for the step.
    pub fn label(self) -> &'static str {
        match self {
            Self::BasicInfo => "Basic Information",
            Self::Contact => "Contact & Location",
            Self::Courses => "Courses Offered",
            Self::Batches => "Batches & Faculty",
            Self::Facilities => "Facilities",
            Self::Fees => "Fees & Policies",
        }
    }

    /// Profile column holding this step's raw JSON blob. Steps without a
    /// blob are flattened into relational columns instead.
    pub fn blob_column(self) -> Option<&'static str> {
        match self {
            Self::BasicInfo | Self::Contact => None,
            Self::Courses => Some("step3_data"),
            Self::Batches => Some("step4_data"),
            Self::Facilities => Some("step5_data"),
            Self::Fees => Some("step6_data"),
        }
    }

    /// Whether the step mirrors its payload into the durable draft store.
    ///
    /// Only the fees step does this; the other steps live in the session
    /// context alone and are lost if the session is dropped.
    pub fn is_durable(self) -> bool {
        matches!(self, Self::Fees)
    }

    pub fn next(self) -> Option<Self> {
        Self::from_number(self.to_number() + 1).ok()
    }

    pub fn previous(self) -> Option<Self> {
        self.to_number()
            .checked_sub(1)
            .and_then(|n| Self::from_number(n).ok())
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate a step transition.
///
/// A transition is valid if the next step is exactly one step forward or
/// one step backward from the current step.
pub fn validate_step_transition(current: StepId, next: StepId) -> Result<(), CoreError> {
    let diff = i16::from(next.to_number()) - i16::from(current.to_number());
    if diff != 1 && diff != -1 {
        return Err(CoreError::Validation(format!(
            "Cannot transition from step {} to step {}. \
             Must advance or go back exactly one step.",
            current.to_number(),
            next.to_number()
        )));
    }
    Ok(())
}
