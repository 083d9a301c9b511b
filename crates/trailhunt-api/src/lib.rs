//! Trailhunt API: HTTP surface over a running hunt.

pub mod config;
pub mod error;
pub mod outbox;
pub mod routes;
pub mod state;

use axum::Router;

use crate::state::AppState;

/// Builds the application router without middleware layers.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/messages", routes::messages::router())
        .nest("/api/v1/channels", routes::channels::router())
        .nest("/api/v1/teams", routes::teams::router())
        .nest("/api/v1/admin", routes::admin::router())
        .with_state(state)
}
