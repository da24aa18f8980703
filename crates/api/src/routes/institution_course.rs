//! Route definitions for institution-authored courses.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::institution_course;
use crate::state::AppState;

/// Institution course routes mounted at `/institution-courses`.
///
/// ```text
/// GET    /                    -> list (?institution_id)
/// POST   /                    -> create
/// GET    /{id}                -> get
/// PUT    /{id}                -> update
/// DELETE /{id}                -> delete
/// POST   /{id}/toggle-active  -> toggle
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(institution_course::list_institution_courses)
                .post(institution_course::create_institution_course),
        )
        .route(
            "/{id}",
            get(institution_course::get_institution_course)
                .put(institution_course::update_institution_course)
                .delete(institution_course::delete_institution_course),
        )
        .route(
            "/{id}/toggle-active",
            post(institution_course::toggle_institution_course),
        )
}
