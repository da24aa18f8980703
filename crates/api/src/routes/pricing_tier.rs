//! Route definitions for subscription pricing tiers.
//!
//! Reads are public; every mutation requires the `admin` role.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::pricing_tier;
use crate::state::AppState;

/// Pricing tier routes mounted at `/pricing-tiers`.
///
/// ```text
/// GET    /                    -> list_tiers (?include_inactive)
/// POST   /                    -> create_tier
/// GET    /{id}                -> get_tier
/// PUT    /{id}                -> update_tier
/// DELETE /{id}                -> delete_tier
/// POST   /{id}/toggle-active  -> toggle_tier
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(pricing_tier::list_tiers).post(pricing_tier::create_tier),
        )
        .route(
            "/{id}",
            get(pricing_tier::get_tier)
                .put(pricing_tier::update_tier)
                .delete(pricing_tier::delete_tier),
        )
        .route("/{id}/toggle-active", post(pricing_tier::toggle_tier))
}
