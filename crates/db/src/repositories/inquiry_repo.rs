//! Repository for the `inquiries` table.

use chrono::Utc;
use tutorhub_core::error::CoreError;
use tutorhub_core::gateway::{GatewayError, PersistenceGateway, Query, Record, Table};
use tutorhub_core::inquiry;
use tutorhub_core::search::Page;
use tutorhub_core::types::DbId;

use super::rows;
use crate::models::inquiry::{CreateInquiry, Inquiry, UpdateInquiry};
use crate::models::to_record;

pub struct InquiryRepo;

impl InquiryRepo {
    pub async fn create(
        gw: &dyn PersistenceGateway,
        input: &CreateInquiry,
    ) -> Result<Inquiry, GatewayError> {
        let mut record = to_record(input)?;
        record.insert("status".into(), inquiry::STATUS_NEW.into());
        rows::insert(gw, Table::Inquiries, record).await
    }

    pub async fn find_by_id(
        gw: &dyn PersistenceGateway,
        id: DbId,
    ) -> Result<Option<Inquiry>, GatewayError> {
        rows::find_by_id(gw, Table::Inquiries, id).await
    }

    /// Inquiries for one institution, newest first.
    pub async fn list(
        gw: &dyn PersistenceGateway,
        institution_id: DbId,
        status: Option<&str>,
        page: Page,
    ) -> Result<Vec<Inquiry>, GatewayError> {
        let mut query = Query::new()
            .eq("institution_id", institution_id)
            .order_by("created_at", false)
            .order_by("id", false)
            .page(page);
        if let Some(status) = status {
            query = query.eq("status", status);
        }
        rows::fetch_all(gw, Table::Inquiries, &query).await
    }

    /// Apply a staff update. A status change must follow the pipeline, and
    /// moving to `contacted` stamps `last_contacted_at`.
    pub async fn update(
        gw: &dyn PersistenceGateway,
        id: DbId,
        input: &UpdateInquiry,
    ) -> Result<Inquiry, CoreError> {
        let current = Self::find_by_id(gw, id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Inquiry",
                id,
            })?;

        let mut patch = Record::new();
        if let Some(status) = input.status.as_deref() {
            if status != current.status {
                inquiry::validate_transition(&current.status, status)?;
                patch.insert("status".into(), status.into());
                if inquiry::stamps_contact(status) {
                    patch.insert("last_contacted_at".into(), Utc::now().to_rfc3339().into());
                }
            }
        }
        if let Some(notes) = &input.notes {
            patch.insert("notes".into(), notes.clone().into());
        }

        rows::update_by_id(gw, Table::Inquiries, id, patch)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Inquiry",
                id,
            })
    }
}
