//! Error types shared by the game engine and its adapters.

use thiserror::Error;

use crate::message::ChannelId;

/// Faults that can escape a team's dispatch.
///
/// Failed proofs and wrong answers are not errors: they are answered with a
/// feedback reply and never surface here.
#[derive(Debug, Error)]
pub enum GameError {
    /// The game for a team cannot be played as configured, e.g. it has no
    /// start location.
    #[error("configuration fault for channel {channel}: {reason}")]
    ConfigurationFault {
        /// The team channel whose game is misconfigured.
        channel: ChannelId,
        /// What is wrong with it.
        reason: String,
    },

    /// A location graph or course definition was assembled incorrectly.
    #[error("validation error: {0}")]
    Validation(String),

    /// The outbound messaging port failed to deliver a message.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Failure reported by the image decode port.
///
/// The proof verifier treats every variant as "no match".
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The decode service could not be reached or timed out.
    #[error("decode service unavailable: {0}")]
    Unavailable(String),

    /// The decode service answered with something other than decoded text.
    #[error("invalid decode response: {0}")]
    InvalidResponse(String),
}
