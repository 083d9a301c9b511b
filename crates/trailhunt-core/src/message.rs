//! Inbound messages and channel identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity of a team's chat channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    /// Wraps a raw channel identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The part of an inbound message the game looks at: its text and the
/// remote URLs of its attachments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Message text, as typed.
    #[serde(default)]
    pub text: String,
    /// Remote URLs of the attachments, in message order.
    #[serde(default)]
    pub attachment_urls: Vec<String>,
}

impl Response {
    /// A text-only response.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachment_urls: Vec::new(),
        }
    }

    /// A response carrying attachments and the given text.
    #[must_use]
    pub fn with_attachments(text: impl Into<String>, attachment_urls: Vec<String>) -> Self {
        Self {
            text: text.into(),
            attachment_urls,
        }
    }

    /// Returns true if at least one attachment is present.
    #[must_use]
    pub fn has_attachments(&self) -> bool {
        !self.attachment_urls.is_empty()
    }

    /// The first attachment, if any.
    #[must_use]
    pub fn first_attachment(&self) -> Option<&str> {
        self.attachment_urls.first().map(String::as_str)
    }
}

/// Unit of work delivered by the chat transport for one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// The channel the message was posted in.
    pub channel_id: ChannelId,
    /// Text and attachments.
    #[serde(flatten)]
    pub response: Response,
}

impl InboundMessage {
    /// Creates an inbound message for a channel.
    #[must_use]
    pub fn new(channel_id: impl Into<ChannelId>, response: Response) -> Self {
        Self {
            channel_id: channel_id.into(),
            response,
        }
    }
}

impl From<String> for ChannelId {
    fn from(value: String) -> Self {
        Self(value)
    }
}
