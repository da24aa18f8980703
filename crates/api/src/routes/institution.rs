//! Route definitions for saved institution profiles.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::institution;
use crate::state::AppState;

/// Institution routes mounted at `/institutions`.
///
/// ```text
/// GET   /                    -> list_mine
/// GET   /{id}                -> get_institution
/// PATCH /{id}/steps/{step}   -> patch_step
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(institution::list_mine))
        .route("/{id}", get(institution::get_institution))
        .route("/{id}/steps/{step}", patch(institution::patch_step))
}
