//! Repository for the `institutions` (profile) table.
//!
//! Every write carries the version the caller last read and bumps it, so a
//! concurrent edit surfaces as a conflict instead of being overwritten.

use serde_json::Value;
use tutorhub_core::error::CoreError;
use tutorhub_core::gateway::{Filter, GatewayError, PersistenceGateway, Query, Record, Table};
use tutorhub_core::types::DbId;
use tutorhub_core::wizard::assembler::{ProfileAssembler, ProfileRef, ProfileWrite};
use tutorhub_core::wizard::payload::StepPayload;

use super::rows;
use crate::models::from_record;
use crate::models::institution::Institution;

pub struct InstitutionRepo;

impl InstitutionRepo {
    pub async fn find_by_id(
        gw: &dyn PersistenceGateway,
        id: DbId,
    ) -> Result<Option<Institution>, GatewayError> {
        rows::find_by_id(gw, Table::Institutions, id).await
    }

    /// The raw stored row, for disassembling into wizard steps.
    pub async fn find_record(
        gw: &dyn PersistenceGateway,
        id: DbId,
    ) -> Result<Option<Record>, GatewayError> {
        let query = Query::new().eq("id", id).limit(1);
        Ok(gw.select(Table::Institutions, &query).await?.into_iter().next())
    }

    pub async fn find_by_owner(
        gw: &dyn PersistenceGateway,
        owner_id: DbId,
    ) -> Result<Vec<Institution>, GatewayError> {
        let query = Query::new().eq("owner_id", owner_id).order_by("id", true);
        rows::fetch_all(gw, Table::Institutions, &query).await
    }

    /// Execute a wizard submission as one write.
    pub async fn save_profile(
        gw: &dyn PersistenceGateway,
        write: ProfileWrite,
    ) -> Result<Institution, CoreError> {
        match write {
            ProfileWrite::Insert(mut record) => {
                record.insert("version".into(), Value::from(1));
                Ok(rows::insert(gw, Table::Institutions, record).await?)
            }
            ProfileWrite::Update {
                id,
                expected_version,
                record,
            } => Self::versioned_update(gw, id, expected_version, record).await,
        }
    }

    /// Save one step on its own (the profile edit dialog). Sibling blobs and
    /// columns are not touched.
    ///
    /// Without an `expected_version` the current version is read first, so
    /// the write still fails if the row changes in between.
    pub async fn patch_step(
        gw: &dyn PersistenceGateway,
        id: DbId,
        expected_version: Option<i64>,
        payload: &StepPayload,
    ) -> Result<Institution, CoreError> {
        let expected_version = match expected_version {
            Some(version) => version,
            None => Self::current_version(gw, id).await?,
        };
        let patch = ProfileAssembler::patch_step(payload);
        Self::versioned_update(gw, id, expected_version, patch).await
    }

    async fn current_version(gw: &dyn PersistenceGateway, id: DbId) -> Result<i64, CoreError> {
        let query = Query::new().columns(&["id", "version"]).eq("id", id).limit(1);
        let row = gw
            .select(Table::Institutions, &query)
            .await?
            .into_iter()
            .next()
            .ok_or(CoreError::NotFound {
                entity: "Institution",
                id,
            })?;
        ProfileRef::from_row(&row)
            .map(|r| r.version)
            .ok_or_else(|| CoreError::Internal(format!("Institution {id} has no version")))
    }

    async fn versioned_update(
        gw: &dyn PersistenceGateway,
        id: DbId,
        expected_version: i64,
        mut patch: Record,
    ) -> Result<Institution, CoreError> {
        patch.remove("owner_id");
        patch.insert("version".into(), Value::from(expected_version + 1));
        let filters = [Filter::eq("id", id), Filter::eq("version", expected_version)];

        let updated = gw.update(Table::Institutions, patch, &filters).await?;
        if let Some(row) = updated.into_iter().next() {
            return Ok(from_record(row)?);
        }

        let actual = Self::current_version(gw, id).await?;
        tracing::warn!(
            institution_id = id,
            expected_version,
            actual,
            "Stale profile write rejected"
        );
        Err(CoreError::Conflict(format!(
            "Profile was changed by another session (expected version {expected_version}, found {actual}). Reload and try again."
        )))
    }
}
