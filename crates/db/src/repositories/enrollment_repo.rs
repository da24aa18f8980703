//! Repository for the `enrollments` table.

use chrono::Utc;
use tutorhub_core::enrollment::{
    self, ALREADY_ENROLLED_MESSAGE, STATUS_ENROLLED, UNIQUE_ENROLLMENT_CONSTRAINT,
};
use tutorhub_core::error::CoreError;
use tutorhub_core::gateway::{GatewayError, PersistenceGateway, Query, Record, Table};
use tutorhub_core::types::DbId;

use super::rows;
use crate::models::enrollment::Enrollment;

pub struct EnrollmentRepo;

impl EnrollmentRepo {
    pub async fn find_by_id(
        gw: &dyn PersistenceGateway,
        id: DbId,
    ) -> Result<Option<Enrollment>, GatewayError> {
        rows::find_by_id(gw, Table::Enrollments, id).await
    }

    /// The enrollment row for a course/student pair, whatever its status.
    pub async fn find_by_course_and_student(
        gw: &dyn PersistenceGateway,
        course_id: DbId,
        student_id: DbId,
    ) -> Result<Option<Enrollment>, GatewayError> {
        let query = Query::new()
            .eq("course_id", course_id)
            .eq("student_id", student_id)
            .limit(1);
        Ok(rows::fetch_all(gw, Table::Enrollments, &query)
            .await?
            .into_iter()
            .next())
    }

    pub async fn list_by_student(
        gw: &dyn PersistenceGateway,
        student_id: DbId,
    ) -> Result<Vec<Enrollment>, GatewayError> {
        let query = Query::new()
            .eq("student_id", student_id)
            .order_by("enrolled_at", false);
        rows::fetch_all(gw, Table::Enrollments, &query).await
    }

    pub async fn list_by_course(
        gw: &dyn PersistenceGateway,
        course_id: DbId,
    ) -> Result<Vec<Enrollment>, GatewayError> {
        let query = Query::new()
            .eq("course_id", course_id)
            .order_by("enrolled_at", false);
        rows::fetch_all(gw, Table::Enrollments, &query).await
    }

    /// Number of `enrolled` rows for a course.
    pub async fn count_active_for_course(
        gw: &dyn PersistenceGateway,
        course_id: DbId,
    ) -> Result<usize, GatewayError> {
        let query = Query::new()
            .columns(&["id"])
            .eq("course_id", course_id)
            .eq("status", STATUS_ENROLLED);
        Ok(gw.select(Table::Enrollments, &query).await?.len())
    }

    /// Enroll a student in a course with `max_students` seats.
    ///
    /// An existing row for the pair is rejected before seats are counted, so
    /// a student already in a full course hears that they are enrolled.
    /// Two concurrent requests can both pass that check, so a violation of
    /// the backend unique index is reported as the same conflict.
    pub async fn enroll(
        gw: &dyn PersistenceGateway,
        course_id: DbId,
        student_id: DbId,
        max_students: i32,
    ) -> Result<Enrollment, CoreError> {
        let existing = Self::find_by_course_and_student(gw, course_id, student_id).await?;
        enrollment::ensure_not_enrolled(existing.as_ref().map(|e| e.status.as_str()))?;
        let active = Self::count_active_for_course(gw, course_id).await?;
        enrollment::ensure_capacity(active, max_students)?;

        let mut record = Record::new();
        record.insert("course_id".into(), course_id.into());
        record.insert("student_id".into(), student_id.into());
        record.insert("status".into(), STATUS_ENROLLED.into());
        match rows::insert(gw, Table::Enrollments, record).await {
            Ok(created) => Ok(created),
            Err(GatewayError::UniqueViolation { constraint })
                if constraint == UNIQUE_ENROLLMENT_CONSTRAINT =>
            {
                tracing::info!(course_id, student_id, "Concurrent duplicate enrollment rejected");
                Err(CoreError::Conflict(ALREADY_ENROLLED_MESSAGE.into()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Move an enrollment to `status`, enforcing the allowed transitions.
    pub async fn update_status(
        gw: &dyn PersistenceGateway,
        id: DbId,
        status: &str,
    ) -> Result<Enrollment, CoreError> {
        let current = Self::find_by_id(gw, id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Enrollment",
                id,
            })?;
        enrollment::validate_transition(&current.status, status)?;

        let mut patch = Record::new();
        patch.insert("status".into(), status.into());
        patch.insert("updated_at".into(), Utc::now().to_rfc3339().into());
        rows::update_by_id(gw, Table::Enrollments, id, patch)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Enrollment",
                id,
            })
    }
}
