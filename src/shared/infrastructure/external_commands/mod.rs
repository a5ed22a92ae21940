// External command bus port.
//
// Purpose
// - Describe commands the application sends to other services over HTTP.
//
// Boundaries
// - Only the command shape and the sending capability. `in_memory` records instead of sending.

pub mod in_memory;

use crate::shared::core::event::short_type_name;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandBusError {
    #[error("command body: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("command rejected by {url}{path}: {reason}")]
    Rejected {
        url: String,
        path: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CommandMethod {
    Post,
    Put,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalCommand {
    pub method: CommandMethod,
    pub url: String,
    pub path: String,
    pub command_type: String,
    pub body: serde_json::Value,
}

impl ExternalCommand {
    pub fn new<C: Serialize>(
        method: CommandMethod,
        url: impl Into<String>,
        path: impl Into<String>,
        command: &C,
    ) -> Result<Self, CommandBusError> {
        Ok(Self {
            method,
            url: url.into(),
            path: path.into(),
            command_type: short_type_name(std::any::type_name::<C>()).to_string(),
            body: serde_json::to_value(command)?,
        })
    }

    pub fn post<C: Serialize>(
        url: impl Into<String>,
        path: impl Into<String>,
        command: &C,
    ) -> Result<Self, CommandBusError> {
        Self::new(CommandMethod::Post, url, path, command)
    }

    pub fn put<C: Serialize>(
        url: impl Into<String>,
        path: impl Into<String>,
        command: &C,
    ) -> Result<Self, CommandBusError> {
        Self::new(CommandMethod::Put, url, path, command)
    }

    pub fn delete<C: Serialize>(
        url: impl Into<String>,
        path: impl Into<String>,
        command: &C,
    ) -> Result<Self, CommandBusError> {
        Self::new(CommandMethod::Delete, url, path, command)
    }

    pub fn body_as<C: DeserializeOwned>(&self) -> Result<C, CommandBusError> {
        Ok(serde_json::from_value(self.body.clone())?)
    }
}

#[async_trait]
pub trait ExternalCommandBus: Send + Sync {
    async fn send(&self, command: ExternalCommand) -> Result<(), CommandBusError>;
}
