use crate::shared::core::event::{Event, PublishedEvent};
use crate::shared::infrastructure::event_bus::{AnyEventHandler, EventHandler};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Keeps a clone of every event it handles, tagged with the handler's name.
pub struct RecordingHandler<E> {
    pub name: &'static str,
    pub journal: Arc<Mutex<Vec<String>>>,
    pub seen: Mutex<Vec<E>>,
}

impl<E> RecordingHandler<E> {
    pub fn new(name: &'static str, journal: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name,
            journal,
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl<E: Event + Clone> EventHandler<E> for RecordingHandler<E> {
    async fn handle(&self, event: &E) -> anyhow::Result<()> {
        self.journal.lock().await.push(self.name.to_string());
        self.seen.lock().await.push(event.clone());
        Ok(())
    }
}

/// Catch-all handler writing the event type of everything it sees into the journal.
pub struct JournalingHandler {
    pub name: &'static str,
    pub journal: Arc<Mutex<Vec<String>>>,
}

#[async_trait::async_trait]
impl AnyEventHandler for JournalingHandler {
    async fn handle(&self, event: &PublishedEvent) -> anyhow::Result<()> {
        self.journal
            .lock()
            .await
            .push(format!("{}:{}", self.name, event.event_type));
        Ok(())
    }
}

pub struct FailingHandler;

#[async_trait::async_trait]
impl<E: Event> EventHandler<E> for FailingHandler {
    async fn handle(&self, _event: &E) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("Handler offline"))
    }
}
