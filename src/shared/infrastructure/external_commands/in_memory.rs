// In memory implementation of the ExternalCommandBus port.
//
// Purpose
// - Let tests verify which commands the application sent to other services.
//
// Responsibilities
// - Collect sent commands in order instead of calling the target service.

use crate::shared::infrastructure::external_commands::{
    CommandBusError, ExternalCommand, ExternalCommandBus,
};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
pub struct InMemoryExternalCommandBus {
    sent: RwLock<Vec<ExternalCommand>>,
    is_offline: bool,
}

impl InMemoryExternalCommandBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    pub async fn sent_commands(&self) -> Vec<ExternalCommand> {
        self.sent.read().await.clone()
    }

    pub async fn sent_to(&self, path: &str) -> Vec<ExternalCommand> {
        self.sent
            .read()
            .await
            .iter()
            .filter(|c| c.path == path)
            .cloned()
            .collect()
    }
}

#[async_trait::async_trait]
impl ExternalCommandBus for InMemoryExternalCommandBus {
    async fn send(&self, command: ExternalCommand) -> Result<(), CommandBusError> {
        if self.is_offline {
            return Err(CommandBusError::Rejected {
                url: command.url,
                path: command.path,
                reason: "External command bus offline".into(),
            });
        }

        debug!(
            method = ?command.method,
            url = %command.url,
            path = %command.path,
            command_type = %command.command_type,
            "recording external command"
        );
        self.sent.write().await.push(command);
        Ok(())
    }
}
