//! Repository for the `wizard_drafts` table: durable mirrors of wizard
//! steps, one row per owner and step.

use serde_json::Value;
use tutorhub_core::gateway::{Filter, GatewayError, PersistenceGateway, Query, Record, Table};
use tutorhub_core::types::DbId;
use tutorhub_core::wizard::steps::StepId;

use super::rows;
use crate::models::from_record;
use crate::models::wizard_draft::WizardDraft;

pub struct WizardDraftRepo;

impl WizardDraftRepo {
    /// Store the latest payload for `(owner_id, step)`.
    pub async fn upsert(
        gw: &dyn PersistenceGateway,
        owner_id: DbId,
        step: StepId,
        payload: Value,
    ) -> Result<WizardDraft, GatewayError> {
        let filters = [
            Filter::eq("owner_id", owner_id),
            Filter::eq("step", step.as_str()),
        ];
        let mut patch = Record::new();
        patch.insert("payload".into(), payload);

        if let Some(row) = gw
            .update(Table::WizardDrafts, patch.clone(), &filters)
            .await?
            .into_iter()
            .next()
        {
            return from_record(row);
        }

        let mut record = patch.clone();
        record.insert("owner_id".into(), owner_id.into());
        record.insert("step".into(), step.as_str().into());
        match rows::insert(gw, Table::WizardDrafts, record).await {
            Ok(draft) => Ok(draft),
            // Lost an insert race with another session of the same owner.
            Err(GatewayError::UniqueViolation { .. }) => gw
                .update(Table::WizardDrafts, patch, &filters)
                .await?
                .into_iter()
                .next()
                .map(from_record)
                .ok_or(GatewayError::NotFound {
                    table: Table::WizardDrafts.name(),
                })?,
            Err(e) => Err(e),
        }
    }

    pub async fn load(
        gw: &dyn PersistenceGateway,
        owner_id: DbId,
        step: StepId,
    ) -> Result<Option<WizardDraft>, GatewayError> {
        let query = Query::new()
            .eq("owner_id", owner_id)
            .eq("step", step.as_str())
            .limit(1);
        Ok(rows::fetch_all(gw, Table::WizardDrafts, &query)
            .await?
            .into_iter()
            .next())
    }

    /// Drop every draft of `owner_id`, after a successful submission.
    pub async fn clear(gw: &dyn PersistenceGateway, owner_id: DbId) -> Result<u64, GatewayError> {
        gw.delete(Table::WizardDrafts, &[Filter::eq("owner_id", owner_id)])
            .await
    }
}
