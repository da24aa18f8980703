use axum::routing::get;
use axum::Router;

use crate::handlers::inquiry;
use crate::state::AppState;

/// Inquiry routes mounted at `/inquiries`.
///
/// ```text
/// GET  /      -> list_inquiries (?institution_id, ?status, ?limit, ?offset)
/// POST /      -> create_inquiry (public contact form)
/// GET  /{id}  -> get_inquiry
/// PUT  /{id}  -> update_inquiry
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(inquiry::list_inquiries).post(inquiry::create_inquiry),
        )
        .route(
            "/{id}",
            get(inquiry::get_inquiry).put(inquiry::update_inquiry),
        )
}
