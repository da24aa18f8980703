//! Repository for the `batches` table.

use tutorhub_core::gateway::{GatewayError, PersistenceGateway, Query, Table};
use tutorhub_core::types::DbId;

use super::rows;
use crate::models::batch::{Batch, CreateBatch, UpdateBatch};
use crate::models::to_record;

pub struct BatchRepo;

impl BatchRepo {
    /// List batches, optionally narrowed to one course and/or institution.
    pub async fn list(
        gw: &dyn PersistenceGateway,
        course_id: Option<DbId>,
        institution_id: Option<DbId>,
    ) -> Result<Vec<Batch>, GatewayError> {
        let mut query = Query::new().order_by("start_date", true).order_by("id", true);
        if let Some(course_id) = course_id {
            query = query.eq("course_id", course_id);
        }
        if let Some(institution_id) = institution_id {
            query = query.eq("institution_id", institution_id);
        }
        rows::fetch_all(gw, Table::Batches, &query).await
    }

    pub async fn find_by_id(
        gw: &dyn PersistenceGateway,
        id: DbId,
    ) -> Result<Option<Batch>, GatewayError> {
        rows::find_by_id(gw, Table::Batches, id).await
    }

    pub async fn create(
        gw: &dyn PersistenceGateway,
        input: &CreateBatch,
    ) -> Result<Batch, GatewayError> {
        rows::insert(gw, Table::Batches, to_record(input)?).await
    }

    pub async fn update(
        gw: &dyn PersistenceGateway,
        id: DbId,
        input: &UpdateBatch,
    ) -> Result<Option<Batch>, GatewayError> {
        rows::update_by_id(gw, Table::Batches, id, to_record(input)?).await
    }

    pub async fn toggle_active(
        gw: &dyn PersistenceGateway,
        id: DbId,
    ) -> Result<Option<Batch>, GatewayError> {
        rows::toggle_active(gw, Table::Batches, id).await
    }

    pub async fn delete(gw: &dyn PersistenceGateway, id: DbId) -> Result<bool, GatewayError> {
        rows::delete_by_id(gw, Table::Batches, id).await
    }
}
