// External event ports.
//
// Purpose
// - Describe how events leave the process (producer) and how events from other services
//   enter it (consumer), without committing to a broker.

pub mod in_memory;

use crate::shared::core::event::PublishedEvent;
use async_trait::async_trait;

#[async_trait]
pub trait ExternalEventProducer: Send + Sync {
    async fn publish(&self, event: PublishedEvent) -> anyhow::Result<()>;
}

#[async_trait]
pub trait ExternalEventConsumer: Send + Sync {
    async fn start(&self) -> anyhow::Result<()>;
}
