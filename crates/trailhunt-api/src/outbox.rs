//! In-memory outbound mailbox.
//!
//! The hunt talks to teams through the `Messenger` port. Over HTTP there is
//! no chat platform to push to, so outbound messages are queued per channel
//! until a client collects them.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;
use trailhunt_core::error::GameError;
use trailhunt_core::message::ChannelId;
use trailhunt_core::ports::Messenger;

/// How an outbound message was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryKind {
    /// Answer to an inbound message.
    Reply,
    /// Pushed by the organiser.
    Broadcast,
}

/// One queued outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    /// Reply or broadcast.
    pub kind: DeliveryKind,
    /// Message text.
    pub text: String,
}

/// `Messenger` that queues messages per channel.
#[derive(Debug, Default)]
pub struct OutboxMessenger {
    queues: Mutex<HashMap<ChannelId, Vec<OutboundMessage>>>,
}

impl OutboxMessenger {
    /// Creates an empty outbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns everything queued for `channel`, oldest first.
    pub fn drain(&self, channel: &ChannelId) -> Vec<OutboundMessage> {
        self.queues
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(channel)
            .unwrap_or_default()
    }

    /// Number of messages queued for `channel`.
    pub fn pending(&self, channel: &ChannelId) -> usize {
        self.queues
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(channel)
            .map_or(0, Vec::len)
    }

    fn push(&self, channel: &ChannelId, kind: DeliveryKind, text: &str) -> Result<(), GameError> {
        let mut queues = self
            .queues
            .lock()
            .map_err(|_| GameError::Transport("outbox lock poisoned".to_owned()))?;
        queues
            .entry(channel.clone())
            .or_default()
            .push(OutboundMessage {
                kind,
                text: text.to_owned(),
            });
        debug!(%channel, ?kind, "message queued");
        Ok(())
    }
}

#[async_trait]
impl Messenger for OutboxMessenger {
    async fn send_reply(&self, channel: &ChannelId, text: &str) -> Result<(), GameError> {
        self.push(channel, DeliveryKind::Reply, text)
    }

    async fn broadcast(&self, channel: &ChannelId, text: &str) -> Result<(), GameError> {
        self.push(channel, DeliveryKind::Broadcast, text)
    }
}
