use axum::routing::get;
use axum::Router;

use crate::handlers::me;
use crate::state::AppState;

/// Current-user route mounted at `/me`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(me::get_me))
}
