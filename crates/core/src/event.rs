//! Domain events raised by aggregates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A domain event raised by an aggregate during the current operation.
///
/// Events are buffered on the aggregate base and drained by the
/// persistence/publish step. The payload is already in wire shape
/// (JSON) so the publish step does not need a type registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Stable topic name (e.g. "events.authora.user_created").
    pub topic: String,

    /// Schema version of the payload.
    pub version: u32,

    /// Event payload in wire shape.
    pub payload: JsonValue,

    /// When the event occurred (business time).
    pub occurred_at: DateTime<Utc>,
}

impl DomainEvent {
    pub fn new(topic: impl Into<String>, version: u32, payload: JsonValue) -> Self {
        Self {
            topic: topic.into(),
            version,
            payload,
            occurred_at: Utc::now(),
        }
    }
}
