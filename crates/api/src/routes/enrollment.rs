use axum::routing::{get, put};
use axum::Router;

use crate::handlers::enrollment;
use crate::state::AppState;

/// Enrollment routes mounted at `/enrollments`.
///
/// ```text
/// GET  /              -> list_enrollments (?student_id | ?course_id)
/// POST /              -> enroll
/// GET  /{id}          -> get_enrollment
/// PUT  /{id}/status   -> update_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(enrollment::list_enrollments).post(enrollment::enroll),
        )
        .route("/{id}", get(enrollment::get_enrollment))
        .route("/{id}/status", put(enrollment::update_status))
}
