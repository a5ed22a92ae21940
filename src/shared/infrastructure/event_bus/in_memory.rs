// In memory implementation of the EventBus port.
//
// Purpose
// - Dispatch published events to handlers living in the same process.
//
// Responsibilities
// - Keep subscriptions in the order they were made, typed and catch-all alike.
// - Await every handler in that order; the first failure stops dispatch.

use crate::shared::core::event::{Event, PublishedEvent};
use crate::shared::infrastructure::event_bus::{
    AnyEventHandler, EventBus, EventBusError, EventHandler,
};
use std::any::TypeId;
use std::marker::PhantomData;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

struct Subscription {
    event_type: Option<TypeId>,
    handler: Arc<dyn AnyEventHandler>,
}

struct TypedHandler<E, H> {
    handler: H,
    _event: PhantomData<fn(E)>,
}

#[async_trait::async_trait]
impl<E, H> AnyEventHandler for TypedHandler<E, H>
where
    E: Event,
    H: EventHandler<E>,
{
    async fn handle(&self, event: &PublishedEvent) -> anyhow::Result<()> {
        match event.downcast_ref::<E>() {
            Some(typed) => self.handler.handle(typed).await,
            None => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct InMemoryEventBus {
    subscriptions: RwLock<Vec<Subscription>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<E, H>(&self, handler: H)
    where
        E: Event,
        H: EventHandler<E> + 'static,
    {
        debug!(event_type = E::event_type(), "subscribing handler");
        self.push(Subscription {
            event_type: Some(TypeId::of::<E>()),
            handler: Arc::new(TypedHandler {
                handler,
                _event: PhantomData,
            }),
        });
    }

    pub fn subscribe_all(&self, handler: Arc<dyn AnyEventHandler>) {
        debug!("subscribing catch-all handler");
        self.push(Subscription {
            event_type: None,
            handler,
        });
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn push(&self, subscription: Subscription) {
        self.subscriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(subscription);
    }

    fn handlers_for(&self, event: &PublishedEvent) -> Vec<Arc<dyn AnyEventHandler>> {
        let type_id = event.payload_type_id();
        self.subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|s| s.event_type.is_none_or(|t| t == type_id))
            .map(|s| s.handler.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, event: PublishedEvent) -> Result<(), EventBusError> {
        let handlers = self.handlers_for(&event);
        debug!(
            event_type = event.event_type,
            event_id = %event.event_id,
            handlers = handlers.len(),
            "dispatching event"
        );
        for handler in handlers {
            handler
                .handle(&event)
                .await
                .map_err(|err| EventBusError::Handler {
                    event_type: event.event_type,
                    reason: format!("{err:#}"),
                })?;
        }
        Ok(())
    }
}
