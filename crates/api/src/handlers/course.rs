//! Handlers for tutor courses and the unified course listing.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tutorhub_core::course_catalog::{CourseFilter, CourseListing};
use tutorhub_core::error::CoreError;
use tutorhub_core::types::DbId;
use tutorhub_db::models::course::{Course, CreateCourse, UpdateCourse};
use tutorhub_db::models::validate_input;
use tutorhub_db::repositories::{CourseRepo, InstitutionCourseRepo};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

fn course_not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Course",
        id,
    }
}

/// Load a course the caller teaches.
async fn owned_course(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<Course> {
    let course = CourseRepo::find_by_id(state.gw(), id)
        .await?
        .ok_or_else(|| course_not_found(id))?;
    auth.ensure_owner(course.tutor_id, "course")?;
    Ok(course)
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// GET /api/v1/courses?search=&subject=&active=
///
/// Tutor and institution courses in one list, soonest start first.
pub async fn list_courses(
    State(state): State<AppState>,
    Query(filter): Query<CourseFilter>,
) -> AppResult<impl IntoResponse> {
    let offset = state.config.display_utc_offset_minutes;

    let mut listings: Vec<CourseListing> = CourseRepo::list(state.gw(), None)
        .await?
        .iter()
        .map(|c| c.to_listing(offset))
        .collect();
    listings.extend(
        InstitutionCourseRepo::list(state.gw(), None)
            .await?
            .iter()
            .map(|c| c.to_listing(offset)),
    );

    Ok(Json(DataResponse {
        data: filter.apply(listings),
    }))
}

/// GET /api/v1/courses/{id}
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let course = CourseRepo::find_by_id(state.gw(), id)
        .await?
        .ok_or_else(|| course_not_found(id))?;
    Ok(Json(DataResponse {
        data: course.to_listing(state.config.display_utc_offset_minutes),
    }))
}

// ---------------------------------------------------------------------------
// Tutor CRUD
// ---------------------------------------------------------------------------

/// POST /api/v1/courses
pub async fn create_course(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateCourse>,
) -> AppResult<impl IntoResponse> {
    validate_input(&input)?;
    let course = CourseRepo::create(state.gw(), auth.user_id, &input).await?;

    tracing::info!(course_id = course.id, tutor_id = auth.user_id, title = %course.title, "Course created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: course })))
}

/// PUT /api/v1/courses/{id}
pub async fn update_course(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCourse>,
) -> AppResult<impl IntoResponse> {
    validate_input(&input)?;
    owned_course(&state, &auth, id).await?;

    let course = CourseRepo::update(state.gw(), id, &input)
        .await?
        .ok_or_else(|| course_not_found(id))?;

    tracing::info!(course_id = id, tutor_id = auth.user_id, "Course updated");
    Ok(Json(DataResponse { data: course }))
}

/// POST /api/v1/courses/{id}/toggle-active
pub async fn toggle_course(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    owned_course(&state, &auth, id).await?;

    let course = CourseRepo::toggle_active(state.gw(), id)
        .await?
        .ok_or_else(|| course_not_found(id))?;

    tracing::info!(course_id = id, is_active = course.is_active, "Course toggled");
    Ok(Json(DataResponse { data: course }))
}

/// DELETE /api/v1/courses/{id}
pub async fn delete_course(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    owned_course(&state, &auth, id).await?;

    if !CourseRepo::delete(state.gw(), id).await? {
        return Err(course_not_found(id).into());
    }

    tracing::info!(course_id = id, tutor_id = auth.user_id, "Course deleted");
    Ok(StatusCode::NO_CONTENT)
}
