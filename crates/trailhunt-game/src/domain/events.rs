//! Progression events recorded by a game.

use serde::{Deserialize, Serialize};
use trailhunt_core::event::{DomainEvent, EventMetadata};

/// Emitted when a team proves presence with a proof code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofConfirmed {
    /// The location whose code was confirmed.
    pub location: String,
}

/// Emitted when a team solves the task of a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationFinished {
    /// The finished location.
    pub location: String,
    /// Text of the message that solved the task.
    pub response_text: String,
    /// Attachment URLs of that message.
    pub attachment_urls: Vec<String>,
}

/// Emitted when a team finishes the last location of its chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameCompleted {
    /// The location that completed the chain.
    pub last_location: String,
}

/// Emitted when a game is forced onto the end location and closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEnded {
    /// The end location.
    pub end_location: String,
}

/// Emitted when a team is called to the end location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndPhaseEntered {
    /// The end location.
    pub end_location: String,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventKind {
    /// A proof code was confirmed.
    ProofConfirmed(ProofConfirmed),
    /// A location was finished.
    LocationFinished(LocationFinished),
    /// The whole chain was finished.
    GameCompleted(GameCompleted),
    /// The game was ended.
    GameEnded(GameEnded),
    /// The end phase started for this team.
    EndPhaseEntered(EndPhaseEntered),
}

impl GameEventKind {
    /// The event type name for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ProofConfirmed(_) => "game.proof_confirmed",
            Self::LocationFinished(_) => "game.location_finished",
            Self::GameCompleted(_) => "game.completed",
            Self::GameEnded(_) => "game.ended",
            Self::EndPhaseEntered(_) => "game.end_phase_entered",
        }
    }
}

/// Event envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: GameEventKind,
}

impl DomainEvent for GameEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).unwrap_or(serde_json::Value::Null)
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_payload_is_tagged_by_variant() {
        // Arrange
        let event = GameEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: "game.location_finished".to_owned(),
                aggregate_id: Uuid::new_v4(),
                sequence_number: 3,
                correlation_id: Uuid::new_v4(),
                occurred_at: Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
            },
            kind: GameEventKind::LocationFinished(LocationFinished {
                location: "the kitchen".to_owned(),
                response_text: "6".to_owned(),
                attachment_urls: Vec::new(),
            }),
        };

        // Act
        let payload = event.to_payload();

        // Assert
        assert_eq!(event.event_type(), "game.location_finished");
        assert_eq!(payload["LocationFinished"]["location"], "the kitchen");
        assert_eq!(payload["LocationFinished"]["response_text"], "6");
    }
}
