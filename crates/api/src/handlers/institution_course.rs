//! Handlers for institution-authored courses.
//!
//! Mutations are allowed only for the owner of the parent institution.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tutorhub_core::error::CoreError;
use tutorhub_core::types::DbId;
use tutorhub_db::models::institution_course::{
    CreateInstitutionCourse, InstitutionCourse, UpdateInstitutionCourse,
};
use tutorhub_db::models::validate_input;
use tutorhub_db::repositories::InstitutionCourseRepo;

use super::institution::owned_institution;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct InstitutionCourseListParams {
    pub institution_id: Option<DbId>,
}

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "InstitutionCourse",
        id,
    }
}

async fn owned_course(
    state: &AppState,
    auth: &AuthUser,
    id: DbId,
) -> AppResult<InstitutionCourse> {
    let course = InstitutionCourseRepo::find_by_id(state.gw(), id)
        .await?
        .ok_or_else(|| not_found(id))?;
    owned_institution(state, auth, course.institution_id).await?;
    Ok(course)
}

/// GET /api/v1/institution-courses?institution_id=
pub async fn list_institution_courses(
    State(state): State<AppState>,
    Query(params): Query<InstitutionCourseListParams>,
) -> AppResult<impl IntoResponse> {
    let courses = InstitutionCourseRepo::list(state.gw(), params.institution_id).await?;
    Ok(Json(DataResponse { data: courses }))
}

/// GET /api/v1/institution-courses/{id}
pub async fn get_institution_course(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let course = InstitutionCourseRepo::find_by_id(state.gw(), id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: course }))
}

/// POST /api/v1/institution-courses
pub async fn create_institution_course(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateInstitutionCourse>,
) -> AppResult<impl IntoResponse> {
    validate_input(&input)?;
    owned_institution(&state, &auth, input.institution_id).await?;

    let course = InstitutionCourseRepo::create(state.gw(), &input).await?;

    tracing::info!(
        institution_course_id = course.id,
        institution_id = course.institution_id,
        title = %course.title,
        "Institution course created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: course })))
}

/// PUT /api/v1/institution-courses/{id}
pub async fn update_institution_course(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateInstitutionCourse>,
) -> AppResult<impl IntoResponse> {
    validate_input(&input)?;
    owned_course(&state, &auth, id).await?;

    let course = InstitutionCourseRepo::update(state.gw(), id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(institution_course_id = id, "Institution course updated");
    Ok(Json(DataResponse { data: course }))
}

/// POST /api/v1/institution-courses/{id}/toggle-active
pub async fn toggle_institution_course(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    owned_course(&state, &auth, id).await?;

    let course = InstitutionCourseRepo::toggle_active(state.gw(), id)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(
        institution_course_id = id,
        is_active = course.is_active,
        "Institution course toggled"
    );
    Ok(Json(DataResponse { data: course }))
}

/// DELETE /api/v1/institution-courses/{id}
pub async fn delete_institution_course(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    owned_course(&state, &auth, id).await?;

    if !InstitutionCourseRepo::delete(state.gw(), id).await? {
        return Err(not_found(id).into());
    }

    tracing::info!(institution_course_id = id, "Institution course deleted");
    Ok(StatusCode::NO_CONTENT)
}
