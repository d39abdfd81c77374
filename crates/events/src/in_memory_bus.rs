//! In-memory bus for tests/dev.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use authora_core::Result;

use crate::bus::{Bus, Handler};
use crate::envelope::Envelope;

/// In-memory pub/sub bus.
///
/// - No IO, delivery is inline and sequential (deterministic for tests)
/// - One handler per consumer group per topic; later registrations for the
///   same group are ignored, mirroring broker semantics
/// - Handler errors are logged and swallowed here; a real broker would own
///   redelivery
#[derive(Default)]
pub struct InMemoryBus {
    streams: Mutex<HashMap<String, Vec<String>>>,
    subscribers: Mutex<HashMap<String, Vec<(String, Handler)>>>,
}

impl InMemoryBus {
    pub fn new() -> Self {
        Self::default()
    }
}

impl core::fmt::Debug for InMemoryBus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InMemoryBus").finish_non_exhaustive()
    }
}

#[async_trait]
impl Bus for InMemoryBus {
    async fn ensure_stream(&self, name: &str, topics: &[&str]) -> Result<()> {
        let mut streams = self.streams.lock().await;
        let entry = streams.entry(name.to_string()).or_default();
        for topic in topics {
            if !entry.iter().any(|t| t == topic) {
                entry.push((*topic).to_string());
            }
        }
        Ok(())
    }

    async fn publish(&self, topic: &str, envelope: Envelope) -> Result<()> {
        let handlers: Vec<(String, Handler)> = {
            let subscribers = self.subscribers.lock().await;
            subscribers.get(topic).cloned().unwrap_or_default()
        };

        for (group, handler) in handlers {
            if let Err(err) = handler(envelope.clone()).await {
                tracing::error!(
                    topic,
                    group = group.as_str(),
                    error = %err,
                    "event handler failed"
                );
            }
        }

        Ok(())
    }

    async fn subscribe(&self, topic: &str, group: &str, handler: Handler) -> Result<()> {
        let mut subscribers = self.subscribers.lock().await;
        let entry = subscribers.entry(topic.to_string()).or_default();
        if entry.iter().any(|(g, _)| g == group) {
            return Ok(());
        }
        entry.push((group.to_string(), handler));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;

    use super::*;

    fn envelope() -> Envelope {
        Envelope {
            event_type: "events.test".to_string(),
            version: 1,
            payload: serde_json::json!({}),
            occurred_at: Utc::now(),
        }
    }

    fn counting_handler(counter: Arc<AtomicUsize>) -> Handler {
        Arc::new(move |_env| {
            let counter = counter.clone();
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        })
    }

    #[tokio::test]
    async fn each_group_receives_one_copy() {
        let bus = InMemoryBus::new();
        let a = Arc::new(AtomicUsize::new(0));
        let b = Arc::new(AtomicUsize::new(0));

        bus.subscribe("events.test", "group-a", counting_handler(a.clone()))
            .await
            .unwrap();
        bus.subscribe("events.test", "group-b", counting_handler(b.clone()))
            .await
            .unwrap();

        bus.publish("events.test", envelope()).await.unwrap();

        assert_eq!(a.load(Ordering::SeqCst), 1);
        assert_eq!(b.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn duplicate_group_registration_is_ignored() {
        let bus = InMemoryBus::new();
        let counter = Arc::new(AtomicUsize::new(0));

        bus.subscribe("events.test", "group-a", counting_handler(counter.clone()))
            .await
            .unwrap();
        bus.subscribe("events.test", "group-a", counting_handler(counter.clone()))
            .await
            .unwrap();

        bus.publish("events.test", envelope()).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn handler_errors_do_not_fail_publish() {
        let bus = InMemoryBus::new();
        let failing: Handler = Arc::new(|_env| {
            Box::pin(async { Err(authora_core::Error::internal("handler boom")) })
        });

        bus.subscribe("events.test", "group-a", failing).await.unwrap();
        assert!(bus.publish("events.test", envelope()).await.is_ok());
    }
}
