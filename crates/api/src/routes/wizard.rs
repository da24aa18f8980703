//! Route definitions for the institution signup wizard.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::wizard;
use crate::state::AppState;

/// Wizard session routes mounted at `/wizard-sessions`.
///
/// ```text
/// POST   /                                                   -> create_session
/// GET    /{id}                                               -> get_session
/// DELETE /{id}                                               -> abandon_session
/// GET    /{id}/steps/{step}                                  -> get_step
/// PUT    /{id}/steps/{step}                                  -> replace_step
/// PUT    /{id}/steps/{step}/fields/{field}                   -> set_field
/// POST   /{id}/course-categories/{category}                  -> select_category
/// POST   /{id}/course-categories/{category}/subjects/{subject} -> select_subject
/// POST   /{id}/advance                                       -> advance
/// POST   /{id}/go-back                                       -> go_back
/// POST   /{id}/submit                                        -> submit
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(wizard::create_session))
        .route(
            "/{id}",
            get(wizard::get_session).delete(wizard::abandon_session),
        )
        .route(
            "/{id}/steps/{step}",
            get(wizard::get_step).put(wizard::replace_step),
        )
        .route("/{id}/steps/{step}/fields/{field}", put(wizard::set_field))
        .route(
            "/{id}/course-categories/{category}",
            post(wizard::select_category),
        )
        .route(
            "/{id}/course-categories/{category}/subjects/{subject}",
            post(wizard::select_subject),
        )
        .route("/{id}/advance", post(wizard::advance))
        .route("/{id}/go-back", post(wizard::go_back))
        .route("/{id}/submit", post(wizard::submit))
}
