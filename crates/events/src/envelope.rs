//! Discriminated event envelope.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use authora_core::{DomainEvent, Error, Result};

/// Typed event payload carried on the bus.
///
/// Each payload declares its stable topic and schema version; consumers use
/// them to validate an envelope before dispatch.
pub trait EventPayload: Serialize + DeserializeOwned {
    const TOPIC: &'static str;
    const VERSION: u32;
}

/// The unit published to and consumed from the bus: a discriminated
/// `{type, version, payload}` triple plus business time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub event_type: String,
    pub version: u32,
    pub payload: JsonValue,
    pub occurred_at: DateTime<Utc>,
}

impl Envelope {
    /// Wrap a typed payload.
    pub fn of<P: EventPayload>(payload: &P) -> Result<Self> {
        Ok(Self {
            event_type: P::TOPIC.to_string(),
            version: P::VERSION,
            payload: serde_json::to_value(payload).map_err(Error::internal)?,
            occurred_at: Utc::now(),
        })
    }

    /// Validate the discriminator and schema version, then decode.
    ///
    /// This is the consumer-boundary check: a mismatched type or version is
    /// rejected before any handler logic runs.
    pub fn decode<P: EventPayload>(&self) -> Result<P> {
        if self.event_type != P::TOPIC {
            return Err(Error::validation(format!(
                "envelope type mismatch: expected {}, got {}",
                P::TOPIC,
                self.event_type
            )));
        }
        if self.version != P::VERSION {
            return Err(Error::validation(format!(
                "unsupported schema version {} for {} (expected {})",
                self.version,
                self.event_type,
                P::VERSION
            )));
        }
        serde_json::from_value(self.payload.clone())
            .map_err(|e| Error::validation(format!("malformed {} payload: {e}", self.event_type)))
    }
}

impl From<DomainEvent> for Envelope {
    fn from(event: DomainEvent) -> Self {
        Self {
            event_type: event.topic,
            version: event.version,
            payload: event.payload,
            occurred_at: event.occurred_at,
        }
    }
}
