// Event bus decorator forwarding external events.
//
// Responsibilities
// - Publish every event on the wrapped bus first.
// - Forward events flagged as external to the producer once internal dispatch succeeded.

use crate::shared::core::event::PublishedEvent;
use crate::shared::infrastructure::event_bus::{EventBus, EventBusError};
use crate::shared::infrastructure::external_events::ExternalEventProducer;
use std::sync::Arc;
use tracing::debug;

pub struct EventBusWithExternalProducer<TBus, TProducer>
where
    TBus: EventBus + ?Sized,
    TProducer: ExternalEventProducer + ?Sized,
{
    inner: Arc<TBus>,
    producer: Arc<TProducer>,
}

impl<TBus, TProducer> EventBusWithExternalProducer<TBus, TProducer>
where
    TBus: EventBus + ?Sized,
    TProducer: ExternalEventProducer + ?Sized,
{
    pub fn new(inner: Arc<TBus>, producer: Arc<TProducer>) -> Self {
        Self { inner, producer }
    }
}

#[async_trait::async_trait]
impl<TBus, TProducer> EventBus for EventBusWithExternalProducer<TBus, TProducer>
where
    TBus: EventBus + ?Sized,
    TProducer: ExternalEventProducer + ?Sized,
{
    async fn publish(&self, event: PublishedEvent) -> Result<(), EventBusError> {
        self.inner.publish(event.clone()).await?;

        if !event.is_external {
            return Ok(());
        }

        let event_type = event.event_type;
        debug!(event_type, "forwarding external event");
        self.producer
            .publish(event)
            .await
            .map_err(|err| EventBusError::ExternalProducer {
                event_type,
                reason: format!("{err:#}"),
            })
    }
}
