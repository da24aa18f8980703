//! Route definitions for tutor courses and the unified course listing.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::course;
use crate::state::AppState;

/// Course routes mounted at `/courses`.
///
/// ```text
/// GET    /                    -> list_courses (tutor + institution courses)
/// POST   /                    -> create_course
/// GET    /{id}                -> get_course
/// PUT    /{id}                -> update_course
/// DELETE /{id}                -> delete_course
/// POST   /{id}/toggle-active  -> toggle_course
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(course::list_courses).post(course::create_course))
        .route(
            "/{id}",
            get(course::get_course)
                .put(course::update_course)
                .delete(course::delete_course),
        )
        .route("/{id}/toggle-active", post(course::toggle_course))
}
