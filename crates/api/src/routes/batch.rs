//! Route definitions for course batches.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::batch;
use crate::state::AppState;

/// Batch routes mounted at `/batches`.
///
/// ```text
/// GET    /                    -> list_batches (?course_id, ?institution_id)
/// POST   /                    -> create_batch
/// GET    /{id}                -> get_batch
/// PUT    /{id}                -> update_batch
/// DELETE /{id}                -> delete_batch
/// POST   /{id}/toggle-active  -> toggle_batch
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(batch::list_batches).post(batch::create_batch))
        .route(
            "/{id}",
            get(batch::get_batch)
                .put(batch::update_batch)
                .delete(batch::delete_batch),
        )
        .route("/{id}/toggle-active", post(batch::toggle_batch))
}
