//! Organiser operations.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use tracing::instrument;

use crate::state::AppState;

/// Result of a bulk operation.
#[derive(Debug, Serialize)]
pub struct AdminResponse {
    /// The operation that ran.
    pub operation: &'static str,
    /// Number of teams it reached.
    pub teams: usize,
    /// Whether the hunt has been ended.
    pub hunt_ended: bool,
}

async fn respond(state: &AppState, operation: &'static str) -> Json<AdminResponse> {
    Json(AdminResponse {
        operation,
        teams: state.hunt.channels().await.len(),
        hunt_ended: state.hunt.is_ended(),
    })
}

/// POST /api/v1/admin/start
#[instrument(skip(state))]
async fn start(State(state): State<AppState>) -> Json<AdminResponse> {
    state.hunt.start().await;
    respond(&state, "start").await
}

/// POST /api/v1/admin/end-phase
#[instrument(skip(state))]
async fn end_phase(State(state): State<AppState>) -> Json<AdminResponse> {
    state.hunt.enter_end_phase().await;
    respond(&state, "end_phase").await
}

/// POST /api/v1/admin/end
#[instrument(skip(state))]
async fn end(State(state): State<AppState>) -> Json<AdminResponse> {
    state.hunt.end_all_games().await;
    respond(&state, "end").await
}

/// Returns the router for organiser operations.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/start", post(start))
        .route("/end-phase", post(end_phase))
        .route("/end", post(end))
}
