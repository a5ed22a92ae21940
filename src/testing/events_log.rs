// Log of every event published on the in-process bus.
//
// Purpose
// - Give tests a queryable, ordered view of what the application published.
//
// Responsibilities
// - Append events in publication order; never mutate recorded entries.
// - Hand out snapshots so readers never hold the lock while asserting.

use crate::shared::core::event::{Event, PublishedEvent};
use crate::shared::infrastructure::event_bus::AnyEventHandler;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::trace;

/// Read side of a recorded event stream. Every call reflects all appends made before it.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn snapshot(&self) -> Vec<PublishedEvent>;
}

#[derive(Debug, Default)]
pub struct EventsLog {
    events: RwLock<Vec<PublishedEvent>>,
}

impl EventsLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, event: PublishedEvent) {
        trace!(event_type = event.event_type, event_id = %event.event_id, "recording event");
        self.events.write().await.push(event);
    }

    pub async fn events_of_type<E: Event + Clone>(&self) -> Vec<E> {
        self.events
            .read()
            .await
            .iter()
            .filter_map(|e| e.downcast_ref::<E>().cloned())
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

#[async_trait]
impl EventSource for EventsLog {
    async fn snapshot(&self) -> Vec<PublishedEvent> {
        self.events.read().await.clone()
    }
}

/// Catch-all bus handler that writes every published event into an [`EventsLog`].
pub struct EventListener {
    log: Arc<EventsLog>,
}

impl EventListener {
    pub fn new(log: Arc<EventsLog>) -> Self {
        Self { log }
    }
}

#[async_trait]
impl AnyEventHandler for EventListener {
    async fn handle(&self, event: &PublishedEvent) -> anyhow::Result<()> {
        self.log.record(event.clone()).await;
        Ok(())
    }
}
