//! Repository for the `institution_courses` table.

use tutorhub_core::gateway::{GatewayError, PersistenceGateway, Query, Table};
use tutorhub_core::types::DbId;

use super::rows;
use crate::models::institution_course::{
    CreateInstitutionCourse, InstitutionCourse, UpdateInstitutionCourse,
};
use crate::models::to_record;

pub struct InstitutionCourseRepo;

impl InstitutionCourseRepo {
    pub async fn list(
        gw: &dyn PersistenceGateway,
        institution_id: Option<DbId>,
    ) -> Result<Vec<InstitutionCourse>, GatewayError> {
        let mut query = Query::new().order_by("start_date", true).order_by("id", true);
        if let Some(institution_id) = institution_id {
            query = query.eq("institution_id", institution_id);
        }
        rows::fetch_all(gw, Table::InstitutionCourses, &query).await
    }

    pub async fn find_by_id(
        gw: &dyn PersistenceGateway,
        id: DbId,
    ) -> Result<Option<InstitutionCourse>, GatewayError> {
        rows::find_by_id(gw, Table::InstitutionCourses, id).await
    }

    pub async fn create(
        gw: &dyn PersistenceGateway,
        input: &CreateInstitutionCourse,
    ) -> Result<InstitutionCourse, GatewayError> {
        rows::insert(gw, Table::InstitutionCourses, to_record(input)?).await
    }

    pub async fn update(
        gw: &dyn PersistenceGateway,
        id: DbId,
        input: &UpdateInstitutionCourse,
    ) -> Result<Option<InstitutionCourse>, GatewayError> {
        rows::update_by_id(gw, Table::InstitutionCourses, id, to_record(input)?).await
    }

    pub async fn toggle_active(
        gw: &dyn PersistenceGateway,
        id: DbId,
    ) -> Result<Option<InstitutionCourse>, GatewayError> {
        rows::toggle_active(gw, Table::InstitutionCourses, id).await
    }

    pub async fn delete(gw: &dyn PersistenceGateway, id: DbId) -> Result<bool, GatewayError> {
        rows::delete_by_id(gw, Table::InstitutionCourses, id).await
    }
}
