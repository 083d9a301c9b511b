//! Test messengers: `Messenger` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use trailhunt_core::error::GameError;
use trailhunt_core::message::ChannelId;
use trailhunt_core::ports::Messenger;

/// How a recorded message was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Sent as a reply to an inbound message.
    Reply,
    /// Pushed to the channel without an inbound message.
    Broadcast,
}

/// One message captured by [`RecordingMessenger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// Target channel.
    pub channel: ChannelId,
    /// Reply or broadcast.
    pub delivery: Delivery,
    /// Message text.
    pub text: String,
}

/// A messenger that records every outbound message and always succeeds.
#[derive(Debug, Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<SentMessage>>,
}

impl RecordingMessenger {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of everything sent so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Returns the texts sent to `channel`, replies and broadcasts alike.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn texts_for(&self, channel: &ChannelId) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|m| &m.channel == channel)
            .map(|m| m.text.clone())
            .collect()
    }

    /// Returns and forgets everything sent so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn take(&self) -> Vec<SentMessage> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }

    /// Returns and forgets the texts sent to `channel`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn take_for(&self, channel: &ChannelId) -> Vec<String> {
        let mut sent = self.sent.lock().unwrap();
        let (taken, kept): (Vec<_>, Vec<_>) =
            sent.drain(..).partition(|m| &m.channel == channel);
        *sent = kept;
        taken.into_iter().map(|m| m.text).collect()
    }

    fn record(&self, channel: &ChannelId, delivery: Delivery, text: &str) {
        self.sent.lock().unwrap().push(SentMessage {
            channel: channel.clone(),
            delivery,
            text: text.to_owned(),
        });
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_reply(&self, channel: &ChannelId, text: &str) -> Result<(), GameError> {
        self.record(channel, Delivery::Reply, text);
        Ok(())
    }

    async fn broadcast(&self, channel: &ChannelId, text: &str) -> Result<(), GameError> {
        self.record(channel, Delivery::Broadcast, text);
        Ok(())
    }
}

/// A messenger whose transport is always down.
#[derive(Debug)]
pub struct FailingMessenger;

#[async_trait]
impl Messenger for FailingMessenger {
    async fn send_reply(&self, _channel: &ChannelId, _text: &str) -> Result<(), GameError> {
        Err(GameError::Transport("channel unreachable".into()))
    }

    async fn broadcast(&self, _channel: &ChannelId, _text: &str) -> Result<(), GameError> {
        Err(GameError::Transport("channel unreachable".into()))
    }
}
