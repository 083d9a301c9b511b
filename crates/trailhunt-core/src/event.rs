//! Progression event abstractions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata attached to every recorded game event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Type name, e.g. `game.location_finished`.
    pub event_type: String,
    /// The game this event belongs to.
    pub aggregate_id: Uuid,
    /// Monotonically increasing position within the game's event log.
    pub sequence_number: i64,
    /// Identifier of the inbound message or admin operation that caused it.
    pub correlation_id: Uuid,
    /// When the event was recorded.
    pub occurred_at: DateTime<Utc>,
}

/// Trait that all recorded events implement.
pub trait DomainEvent: Send + Sync + std::fmt::Debug {
    /// Returns the event type name.
    fn event_type(&self) -> &'static str;

    /// Serializes the event payload to JSON.
    fn to_payload(&self) -> serde_json::Value;

    /// Returns the metadata for this event.
    fn metadata(&self) -> &EventMetadata;
}
