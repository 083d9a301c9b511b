//! Inbound chat messages.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use tracing::instrument;
use trailhunt_core::message::{ChannelId, InboundMessage};

use crate::error::ApiError;
use crate::outbox::OutboundMessage;
use crate::state::AppState;

/// Replies produced while handling one message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// The team's channel.
    pub channel_id: ChannelId,
    /// Everything queued for the channel, including the replies.
    pub replies: Vec<OutboundMessage>,
}

/// POST /api/v1/messages
#[instrument(skip(state, message), fields(channel = %message.channel_id))]
async fn post_message(
    State(state): State<AppState>,
    Json(message): Json<InboundMessage>,
) -> Result<Json<MessageResponse>, ApiError> {
    let channel_id = message.channel_id.clone();
    let outbox = Arc::clone(&state.outbox);
    // Drained under the team lock so a concurrent message cannot take these replies.
    let replies = state
        .hunt
        .on_team_message_with(message, |channel| outbox.drain(channel))
        .await?;
    Ok(Json(MessageResponse {
        channel_id,
        replies,
    }))
}

/// Returns the router for inbound messages.
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(post_message))
}
