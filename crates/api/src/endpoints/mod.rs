//! API endpoints.

mod meta;
mod polls;

use axum::Router;

use crate::state::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(meta::router())
        .nest("/polls", polls::router())
}
