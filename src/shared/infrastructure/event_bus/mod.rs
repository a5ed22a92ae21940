// Event bus ports.
//
// Purpose
// - Describe how application code publishes events and how handlers receive them.
//
// Boundaries
// - No dispatch logic here. `in_memory` dispatches in process, `with_external_producer`
//   forwards external events out of the process.

pub mod in_memory;
pub mod with_external_producer;

use crate::shared::core::event::{Event, PublishedEvent};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventBusError {
    #[error("handler failed for {event_type}: {reason}")]
    Handler {
        event_type: &'static str,
        reason: String,
    },

    #[error("external producer failed for {event_type}: {reason}")]
    ExternalProducer {
        event_type: &'static str,
        reason: String,
    },
}

#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, event: PublishedEvent) -> Result<(), EventBusError>;
}

/// Handles one concrete event type.
#[async_trait]
pub trait EventHandler<E: Event>: Send + Sync {
    async fn handle(&self, event: &E) -> anyhow::Result<()>;
}

/// Handles every event, whatever its type.
#[async_trait]
pub trait AnyEventHandler: Send + Sync {
    async fn handle(&self, event: &PublishedEvent) -> anyhow::Result<()>;
}

#[async_trait]
impl<E, H> EventHandler<E> for std::sync::Arc<H>
where
    E: Event,
    H: EventHandler<E> + ?Sized,
{
    async fn handle(&self, event: &E) -> anyhow::Result<()> {
        (**self).handle(event).await
    }
}
