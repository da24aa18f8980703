//! Pricing tier rules for the admin pricing page.

use crate::error::CoreError;
use crate::validation::FieldErrors;

pub const BILLING_MONTHLY: &str = "monthly";
pub const BILLING_QUARTERLY: &str = "quarterly";
pub const BILLING_YEARLY: &str = "yearly";

pub const VALID_BILLING_PERIODS: &[&str] = &[BILLING_MONTHLY, BILLING_QUARTERLY, BILLING_YEARLY];

/// Maximum number of feature bullet points on one tier.
pub const MAX_FEATURES: usize = 20;

pub fn validate_billing_period(period: &str) -> Result<(), CoreError> {
    if VALID_BILLING_PERIODS.contains(&period) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid billing period '{period}'. Must be one of: {VALID_BILLING_PERIODS:?}"
        )))
    }
}

/// Field checks for a tier about to be written.
pub fn validate_tier(name: &str, price: f64, billing_period: &str, features: &[String]) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.require("name", name);
    errors.non_negative("price", price);
    if !VALID_BILLING_PERIODS.contains(&billing_period) {
        errors.add(
            "billing_period",
            format!("billing_period must be one of: {}", VALID_BILLING_PERIODS.join(", ")),
        );
    }
    if features.len() > MAX_FEATURES {
        errors.add("features", format!("At most {MAX_FEATURES} features are allowed"));
    }
    if features.iter().any(|f| f.trim().is_empty()) {
        errors.add("features", "Features must not be blank");
    }
    errors
}

/// Drop blank feature lines and surrounding whitespace.
pub fn normalize_features(features: Vec<String>) -> Vec<String> {
    features
        .into_iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect()
}
