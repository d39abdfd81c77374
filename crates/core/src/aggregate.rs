//! Aggregate base shared by every domain aggregate.
//!
//! Value composition, not inheritance: each aggregate embeds an
//! [`AggregateBase`] and exposes it through the small [`AggregateRoot`]
//! capability trait.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::DomainEvent;

/// Shared aggregate state: identity, monotonic version, timestamps, and the
/// in-memory list of domain events raised during the current operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateBase {
    id: Uuid,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    events: Vec<DomainEvent>,
}

impl AggregateBase {
    /// Fresh aggregate at version 0 with a time-ordered id.
    pub fn new() -> Self {
        Self::with_id(Uuid::now_v7())
    }

    pub fn with_id(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            version: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            events: Vec::new(),
        }
    }

    /// Rehydrate a persisted aggregate.
    pub fn existing(
        id: Uuid,
        version: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        deleted_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            version,
            created_at,
            updated_at,
            deleted_at,
            events: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Bump the version and stamp the update time. Called on every mutation.
    pub fn touch(&mut self) {
        self.version += 1;
        self.updated_at = Utc::now();
    }

    /// Soft delete: stamps `deleted_at` and touches. Records are never
    /// hard-deleted in the core.
    pub fn mark_deleted(&mut self) {
        self.deleted_at = Some(Utc::now());
        self.touch();
    }

    /// Buffer a domain event for the persistence/publish step.
    pub fn record(&mut self, event: DomainEvent) {
        self.events.push(event);
    }

    /// Drain buffered events, leaving the list empty.
    pub fn drain_events(&mut self) -> Vec<DomainEvent> {
        core::mem::take(&mut self.events)
    }
}

impl Default for AggregateBase {
    fn default() -> Self {
        Self::new()
    }
}

/// Capability interface every aggregate exposes over its embedded base.
pub trait AggregateRoot {
    fn base(&self) -> &AggregateBase;
    fn base_mut(&mut self) -> &mut AggregateBase;

    /// Aggregate identity as a string (stable wire representation).
    fn identity(&self) -> String {
        self.base().id().to_string()
    }

    fn version(&self) -> i64 {
        self.base().version()
    }

    fn touch(&mut self) {
        self.base_mut().touch();
    }

    fn drain_events(&mut self) -> Vec<DomainEvent> {
        self.base_mut().drain_events()
    }
}
