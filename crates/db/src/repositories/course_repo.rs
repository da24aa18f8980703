//! Repository for the `courses` table.

use tutorhub_core::gateway::{GatewayError, PersistenceGateway, Query, Table};
use tutorhub_core::types::DbId;

use super::rows;
use crate::models::course::{Course, CreateCourse, UpdateCourse};
use crate::models::to_record;

pub struct CourseRepo;

impl CourseRepo {
    /// List courses, optionally for one tutor, soonest start first.
    pub async fn list(
        gw: &dyn PersistenceGateway,
        tutor_id: Option<DbId>,
    ) -> Result<Vec<Course>, GatewayError> {
        let mut query = Query::new().order_by("start_time", true).order_by("id", true);
        if let Some(tutor_id) = tutor_id {
            query = query.eq("tutor_id", tutor_id);
        }
        rows::fetch_all(gw, Table::Courses, &query).await
    }

    pub async fn find_by_id(
        gw: &dyn PersistenceGateway,
        id: DbId,
    ) -> Result<Option<Course>, GatewayError> {
        rows::find_by_id(gw, Table::Courses, id).await
    }

    pub async fn create(
        gw: &dyn PersistenceGateway,
        tutor_id: DbId,
        input: &CreateCourse,
    ) -> Result<Course, GatewayError> {
        let mut record = to_record(input)?;
        record.insert("tutor_id".into(), tutor_id.into());
        rows::insert(gw, Table::Courses, record).await
    }

    pub async fn update(
        gw: &dyn PersistenceGateway,
        id: DbId,
        input: &UpdateCourse,
    ) -> Result<Option<Course>, GatewayError> {
        rows::update_by_id(gw, Table::Courses, id, to_record(input)?).await
    }

    pub async fn toggle_active(
        gw: &dyn PersistenceGateway,
        id: DbId,
    ) -> Result<Option<Course>, GatewayError> {
        rows::toggle_active(gw, Table::Courses, id).await
    }

    pub async fn delete(gw: &dyn PersistenceGateway, id: DbId) -> Result<bool, GatewayError> {
        rows::delete_by_id(gw, Table::Courses, id).await
    }
}
