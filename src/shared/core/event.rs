// Events as they travel over the in-process bus.
//
// Purpose
// - Let any Rust type be published, and let tests filter the recorded events by that type.
//
// Responsibilities
// - Erase the concrete type behind `PublishedEvent` while keeping typed access by downcast.
// - Stamp every published event with an id, a short type name and the publish time.

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

pub trait Event: Any + fmt::Debug + Send + Sync {
    /// External events leave the process through the external producer after internal dispatch.
    const EXTERNAL: bool = false;

    fn event_type() -> &'static str
    where
        Self: Sized,
    {
        short_type_name(type_name::<Self>())
    }
}

pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

trait Payload: fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

impl<E: Event> Payload for E {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone)]
pub struct PublishedEvent {
    pub event_id: Uuid,
    pub event_type: &'static str,
    pub occurred_at: i64,
    pub is_external: bool,
    payload: Arc<dyn Payload>,
}

impl PublishedEvent {
    pub fn new<E: Event>(event: E) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            event_type: E::event_type(),
            occurred_at: Utc::now().timestamp_millis(),
            is_external: E::EXTERNAL,
            payload: Arc::new(event),
        }
    }

    pub fn payload_type_id(&self) -> TypeId {
        Any::type_id(self.payload.as_any())
    }

    pub fn is<E: Event>(&self) -> bool {
        self.payload_type_id() == TypeId::of::<E>()
    }

    pub fn downcast_ref<E: Event>(&self) -> Option<&E> {
        self.payload.as_any().downcast_ref::<E>()
    }
}
