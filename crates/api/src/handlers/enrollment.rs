//! Handlers for course enrollments.
//!
//! A student may see and change their own enrollments; a tutor may see and
//! change enrollments in courses they teach.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tutorhub_core::enrollment::validate_status;
use tutorhub_core::error::CoreError;
use tutorhub_core::types::DbId;
use tutorhub_db::models::course::Course;
use tutorhub_db::models::enrollment::{CreateEnrollment, Enrollment, UpdateEnrollmentStatus};
use tutorhub_db::repositories::{CourseRepo, EnrollmentRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EnrollmentListParams {
    pub student_id: Option<DbId>,
    pub course_id: Option<DbId>,
}

async fn find_course(state: &AppState, id: DbId) -> AppResult<Course> {
    CourseRepo::find_by_id(state.gw(), id)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "Course",
                id,
            }
            .into()
        })
}

/// Allow the enrolled student or the course's tutor.
async fn ensure_participant(
    state: &AppState,
    auth: &AuthUser,
    enrollment: &Enrollment,
) -> AppResult<()> {
    if enrollment.student_id == auth.user_id {
        return Ok(());
    }
    let course = find_course(state, enrollment.course_id).await?;
    auth.ensure_owner(course.tutor_id, "enrollment")
}

/// GET /api/v1/enrollments?student_id= | ?course_id=
///
/// With `course_id` the caller must teach the course. Otherwise the
/// student's own enrollments are returned; `student_id` defaults to the
/// caller and may not name anyone else.
pub async fn list_enrollments(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<EnrollmentListParams>,
) -> AppResult<impl IntoResponse> {
    let enrollments = match params.course_id {
        Some(course_id) => {
            let course = find_course(&state, course_id).await?;
            auth.ensure_owner(course.tutor_id, "course")?;
            EnrollmentRepo::list_by_course(state.gw(), course_id).await?
        }
        None => {
            let student_id = params.student_id.unwrap_or(auth.user_id);
            auth.ensure_owner(student_id, "enrollment list")?;
            EnrollmentRepo::list_by_student(state.gw(), student_id).await?
        }
    };
    Ok(Json(DataResponse { data: enrollments }))
}

/// GET /api/v1/enrollments/{id}
pub async fn get_enrollment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let enrollment = EnrollmentRepo::find_by_id(state.gw(), id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Enrollment",
            id,
        })?;
    ensure_participant(&state, &auth, &enrollment).await?;
    Ok(Json(DataResponse { data: enrollment }))
}

/// POST /api/v1/enrollments
///
/// Enroll the caller in an active course with free seats. A second
/// enrollment for the same course is rejected with 409, whatever the status
/// of the first.
pub async fn enroll(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateEnrollment>,
) -> AppResult<impl IntoResponse> {
    let student_id = input.student_id.unwrap_or(auth.user_id);
    if student_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only enroll yourself".into(),
        )));
    }

    let course = find_course(&state, input.course_id).await?;
    if !course.is_active {
        return Err(AppError::BadRequest(format!(
            "Course '{}' is not open for enrollment",
            course.title
        )));
    }
    let enrollment =
        EnrollmentRepo::enroll(state.gw(), course.id, student_id, course.max_students).await?;

    tracing::info!(
        enrollment_id = enrollment.id,
        course_id = course.id,
        student_id,
        "Student enrolled"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: enrollment })))
}

/// PUT /api/v1/enrollments/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEnrollmentStatus>,
) -> AppResult<impl IntoResponse> {
    validate_status(&input.status)?;
    let current = EnrollmentRepo::find_by_id(state.gw(), id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Enrollment",
            id,
        })?;
    ensure_participant(&state, &auth, &current).await?;

    let enrollment = EnrollmentRepo::update_status(state.gw(), id, &input.status).await?;

    tracing::info!(
        enrollment_id = id,
        from = %current.status,
        to = %enrollment.status,
        "Enrollment status changed"
    );

    Ok(Json(DataResponse { data: enrollment }))
}
