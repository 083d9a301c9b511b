//! Team progress queries.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tracing::instrument;
use trailhunt_core::message::ChannelId;
use trailhunt_game::application::hunt::TeamStatus;

use crate::error::ApiError;
use crate::state::AppState;

/// Registered teams.
#[derive(Debug, Serialize)]
pub struct TeamList {
    /// Channels of all registered teams.
    pub channels: Vec<ChannelId>,
}

/// GET /api/v1/teams
#[instrument(skip(state))]
async fn list_teams(State(state): State<AppState>) -> Json<TeamList> {
    Json(TeamList {
        channels: state.hunt.channels().await,
    })
}

/// GET /api/v1/teams/{channel_id}
#[instrument(skip(state))]
async fn get_team(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> Result<Json<TeamStatus>, ApiError> {
    let channel_id = ChannelId::new(channel_id);
    state
        .hunt
        .team_status(&channel_id)
        .await
        .map(Json)
        .ok_or(ApiError::TeamNotFound(channel_id))
}

/// Returns the router for team queries.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_teams))
        .route("/{channel_id}", get(get_team))
}
