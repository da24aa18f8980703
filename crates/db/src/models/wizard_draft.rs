//! Durable wizard draft model.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tutorhub_core::types::{DbId, Timestamp};

/// A row from the `wizard_drafts` table: the last mirrored payload of one
/// durable step for one owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardDraft {
    pub id: DbId,
    pub owner_id: DbId,
    pub step: String,
    pub payload: Value,
    pub updated_at: Timestamp,
}
