//! Route modules.

use axum::Router;

use crate::state::AppState;

pub mod health;
pub mod wheel;

/// Builds the full application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .nest("/api/v1/wheel", wheel::router())
        .with_state(state)
}
