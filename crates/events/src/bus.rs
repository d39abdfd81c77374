//! Event bus capability.
//!
//! Delivery is at-least-once and consumer-group based. A handler error is
//! logged and returned to the bus layer, which owns redelivery/backoff;
//! the core never runs its own retry loop, so handlers must tolerate replay.

use core::future::Future;
use core::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use authora_core::Result;

use crate::envelope::Envelope;

/// Boxed future returned by an event handler.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

/// An event handler: one concurrent invocation per inbound message.
pub type Handler = Arc<dyn Fn(Envelope) -> HandlerFuture + Send + Sync>;

/// Publish/subscribe port over a durable, named stream.
#[async_trait]
pub trait Bus: Send + Sync {
    /// Ensure the named stream exists and covers the given topics.
    async fn ensure_stream(&self, name: &str, topics: &[&str]) -> Result<()>;

    async fn publish(&self, topic: &str, envelope: Envelope) -> Result<()>;

    /// Register `handler` under a consumer group. Within one group each
    /// message is delivered once (per attempt); distinct groups each get a
    /// copy.
    async fn subscribe(&self, topic: &str, group: &str, handler: Handler) -> Result<()>;
}
