//! # Engine Configuration
//!
//! Tunables for the executor, the serialized sink and logging. Every field has
//! a default, so an empty configuration is a working one.
//!
//! ## Sources
//!
//! [`ConfigLoader`] layers, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. an optional file (TOML, YAML or JSON, chosen by extension)
//! 3. environment variables `TASKFLOW__<SECTION>__<FIELD>`
//!
//! ```rust,no_run
//! use taskflow_core::config::ConfigLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::load(None)?;
//! let limit = config.executor.max_concurrent_steps;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigLoader;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub executor: ExecutorConfig,
    pub sink: SinkConfig,
    pub logging: LoggingConfig,
}

/// Executor limits. Both are off unless configured.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Upper bound on concurrently running steps per executor.
    pub max_concurrent_steps: Option<usize>,
    /// Per-generation deadline; expiry fails the step.
    pub generation_timeout_ms: Option<u64>,
}

impl ExecutorConfig {
    pub fn generation_timeout(&self) -> Option<Duration> {
        self.generation_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Bounded queue depth per task writer in `SerializedPatchSink`.
    pub queue_capacity: usize,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Overrides the environment-derived default level. `RUST_LOG` still wins.
    pub level: Option<String>,
    pub format: LogFormat,
}

impl EngineConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.executor.max_concurrent_steps == Some(0) {
            return Err(ConfigurationError::invalid_value(
                "executor.max_concurrent_steps",
                "0",
                "concurrency limit must be greater than 0",
            ));
        }

        if self.executor.generation_timeout_ms == Some(0) {
            return Err(ConfigurationError::invalid_value(
                "executor.generation_timeout_ms",
                "0",
                "timeout must be greater than 0",
            ));
        }

        if self.sink.queue_capacity == 0 {
            return Err(ConfigurationError::invalid_value(
                "sink.queue_capacity",
                "0",
                "queue capacity must be greater than 0",
            ));
        }

        if let Some(level) = &self.logging.level {
            if level.parse::<tracing::Level>().is_err() {
                return Err(ConfigurationError::invalid_value(
                    "logging.level",
                    level,
                    "expected one of trace, debug, info, warn, error",
                ));
            }
        }

        Ok(())
    }
}
