// In memory implementations of the external event ports.
//
// Purpose
// - Let tests verify that external events were produced without running a broker.
//
// Responsibilities
// - Collect produced events in publication order for inspection.
// - Provide a consumer that starts and never delivers anything.

use crate::shared::core::event::{Event, PublishedEvent};
use crate::shared::infrastructure::external_events::{ExternalEventConsumer, ExternalEventProducer};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Default)]
pub struct InMemoryExternalEventProducer {
    published: RwLock<Vec<PublishedEvent>>,
    is_offline: bool,
}

impl InMemoryExternalEventProducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    pub async fn published_events(&self) -> Vec<PublishedEvent> {
        self.published.read().await.clone()
    }

    pub async fn events_of_type<E: Event + Clone>(&self) -> Vec<E> {
        self.published
            .read()
            .await
            .iter()
            .filter_map(|e| e.downcast_ref::<E>().cloned())
            .collect()
    }
}

#[async_trait::async_trait]
impl ExternalEventProducer for InMemoryExternalEventProducer {
    async fn publish(&self, event: PublishedEvent) -> anyhow::Result<()> {
        if self.is_offline {
            return Err(anyhow::anyhow!("External event producer offline"));
        }

        debug!(
            event_type = event.event_type,
            event_id = %event.event_id,
            "recording external event"
        );
        self.published.write().await.push(event);
        Ok(())
    }
}

#[derive(Default)]
pub struct NoopExternalEventConsumer {
    started: AtomicBool,
}

impl NoopExternalEventConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }
}

#[async_trait::async_trait]
impl ExternalEventConsumer for NoopExternalEventConsumer {
    async fn start(&self) -> anyhow::Result<()> {
        info!("external event consumer replaced by a no-op");
        self.started.store(true, Ordering::Release);
        Ok(())
    }
}
