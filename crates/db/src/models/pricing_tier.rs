//! Pricing tier entity model and DTOs.

use serde::{Deserialize, Serialize};
use tutorhub_core::types::{DbId, Timestamp};
use validator::Validate;

use super::course::default_true;

/// A row from the `pricing_tiers` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingTier {
    pub id: DbId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub billing_period: String,
    #[serde(default)]
    pub features: Vec<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a tier. Name, price, period and features are checked by
/// `tutorhub_core::pricing::validate_tier`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePricingTier {
    #[validate(length(max = 100, message = "name must be at most 100 characters"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub billing_period: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    #[validate(range(min = 0, message = "sort_order must not be negative"))]
    pub sort_order: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdatePricingTier {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100, message = "name must be at most 100 characters"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "sort_order must not be negative"))]
    pub sort_order: Option<i32>,
}
