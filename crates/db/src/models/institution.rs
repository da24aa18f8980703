//! Institution profile entity model.
//!
//! Writes go through `tutorhub_core::wizard::assembler::ProfileAssembler`,
//! which produces the column record, so there are no create/update DTOs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tutorhub_core::types::{DbId, Timestamp};

/// A row from the `institutions` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Institution {
    pub id: DbId,
    pub owner_id: DbId,
    pub name: String,
    #[serde(default)]
    pub institution_type: String,
    #[serde(default)]
    pub established_year: String,
    #[serde(default)]
    pub registration_number: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub pincode: String,
    #[serde(default)]
    pub step3_data: Value,
    #[serde(default)]
    pub step4_data: Value,
    #[serde(default)]
    pub step5_data: Value,
    #[serde(default)]
    pub step6_data: Value,
    pub version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
