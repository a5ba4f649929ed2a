//! Error types for the taskflow engine.
//!
//! Patch engine errors are caller defects and abort the `apply` call that
//! produced them. Execution-time failures never surface here: the executor folds
//! them into task status, annotations and the summary's `has_error` flag.

use thiserror::Error;

use crate::config::ConfigurationError;
use crate::orchestration::sink::SinkError;
use crate::patch::PatchError;
use crate::state_machine::StateMachineError;

#[derive(Debug, Error)]
pub enum TaskflowError {
    #[error("Patch error: {0}")]
    Patch(#[from] PatchError),
    #[error("State transition error: {0}")]
    StateTransition(#[from] StateMachineError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigurationError),
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid task: {0}")]
    InvalidTask(String),
}

pub type Result<T> = std::result::Result<T, TaskflowError>;
