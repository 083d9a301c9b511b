//! Ports to the external collaborators of the game engine.
//!
//! The chat transport and the image decode service live outside this
//! workspace's core; the engine only ever talks to them through these traits,
//! which are injected at construction time.

use async_trait::async_trait;

use crate::error::{DecodeError, GameError};
use crate::message::ChannelId;

/// Outbound side of the chat transport.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Sends a reply in the team's channel as part of handling its message.
    async fn send_reply(&self, channel: &ChannelId, text: &str) -> Result<(), GameError>;

    /// Pushes an unsolicited message into the team's channel.
    async fn broadcast(&self, channel: &ChannelId, text: &str) -> Result<(), GameError>;
}

/// Turns the image behind a URL into the text encoded in it (e.g. a QR code).
#[async_trait]
pub trait ImageDecoder: Send + Sync {
    /// Decodes the image at `image_url`.
    ///
    /// An image without a readable code decodes to an empty string.
    async fn decode(&self, image_url: &str) -> Result<String, DecodeError>;
}
