//! Outbound message collection.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tracing::instrument;
use trailhunt_core::message::ChannelId;

use crate::outbox::OutboundMessage;
use crate::state::AppState;

/// Messages collected from a channel's outbox.
#[derive(Debug, Serialize)]
pub struct OutboxResponse {
    /// The channel.
    pub channel_id: ChannelId,
    /// Queued messages, oldest first.
    pub messages: Vec<OutboundMessage>,
}

/// GET /api/v1/channels/{channel_id}/outbox
///
/// Drains the queue: each message is returned once.
#[instrument(skip(state))]
async fn drain_outbox(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> Json<OutboxResponse> {
    let channel_id = ChannelId::new(channel_id);
    let messages = state.outbox.drain(&channel_id);
    Json(OutboxResponse {
        channel_id,
        messages,
    })
}

/// Returns the router for channel outboxes.
pub fn router() -> Router<AppState> {
    Router::new().route("/{channel_id}/outbox", get(drain_outbox))
}
