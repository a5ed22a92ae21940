// Test host configuration.
//
// Responsibilities
// - Carry the per-host schema name and the default retry policy explicitly.
// - Optionally read overrides from the environment (and a `.env` file) without writing to it.

use crate::shared::core::retry_policy::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

pub const SCHEMA_NAME_VAR: &str = "TEST_HOST_SCHEMA_NAME";
pub const RETRY_ATTEMPTS_VAR: &str = "TEST_HOST_RETRY_ATTEMPTS";
pub const RETRY_INTERVAL_MS_VAR: &str = "TEST_HOST_RETRY_INTERVAL_MS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
    #[error("unreadable .env file: {reason}")]
    DotEnv { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestHostConfig {
    pub schema_name: String,
    pub retry_policy: RetryPolicy,
}

/// Lowercase hex without hyphens, unique per call.
pub fn generate_schema_name() -> String {
    Uuid::now_v7().simple().to_string()
}

impl Default for TestHostConfig {
    fn default() -> Self {
        Self {
            schema_name: generate_schema_name(),
            retry_policy: RetryPolicy::default(),
        }
    }
}

impl TestHostConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema_name(mut self, schema_name: impl Into<String>) -> Self {
        self.schema_name = schema_name.into();
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Process environment first, then `.env`, then defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let dotenv = read_dotenv(dotenvy::dotenv_iter())?;
        Self::from_lookup(|key| std::env::var(key).ok().or_else(|| dotenv.get(key).cloned()))
    }

    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(SCHEMA_NAME_VAR) {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: SCHEMA_NAME_VAR,
                    value,
                });
            }
            config.schema_name = value;
        }
        if let Some(value) = lookup(RETRY_ATTEMPTS_VAR) {
            config.retry_policy.max_attempts = parse(RETRY_ATTEMPTS_VAR, value)?;
        }
        if let Some(value) = lookup(RETRY_INTERVAL_MS_VAR) {
            config.retry_policy.interval_ms = parse(RETRY_INTERVAL_MS_VAR, value)?;
        }

        Ok(config)
    }
}

/// A missing `.env` file is an empty one; any other failure is an error.
fn read_dotenv<R: std::io::Read>(
    iter: Result<dotenvy::Iter<R>, dotenvy::Error>,
) -> Result<HashMap<String, String>, ConfigError> {
    let iter = match iter {
        Ok(iter) => iter,
        Err(err) if err.not_found() => return Ok(HashMap::new()),
        Err(err) => return Err(dotenv_error(err)),
    };
    iter.map(|item| item.map_err(dotenv_error)).collect()
}

fn dotenv_error(err: dotenvy::Error) -> ConfigError {
    ConfigError::DotEnv {
        reason: err.to_string(),
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}
