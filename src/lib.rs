#![allow(clippy::doc_markdown)] // Allow technical terms like camelCase, JSON in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Taskflow Core
//!
//! Task execution engine: takes a planned task (an ordered list of sequences,
//! each a set of independent generation steps) and drives it to completion,
//! keeping an externally observable state tree consistent under partial
//! failure and concurrent step dispatch.
//!
//! ## Architecture
//!
//! Every state change is expressed as a patch. The executor applies typed
//! patches to its own working copy and ships the lowered, path-addressed wire
//! form to a [`PatchSink`](orchestration::PatchSink), the same form used by
//! persistence and live UI streams.
//!
//! ## Module Organization
//!
//! - [`patch`] - Path-addressed document updates, typed task patches, step-count moves
//! - [`state_machine`] - Task and generation status enums and transition legality
//! - [`models`] - Task, sequence, step and annotation types
//! - [`orchestration`] - The executor and its collaborator seams
//! - [`events`] - Broadcast publisher for lifecycle events
//! - [`config`] - Layered configuration
//! - [`logging`] - Structured logging setup
//! - [`error`] - Crate-level error type
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use taskflow_core::config::ConfigLoader;
//! use taskflow_core::logging::init_structured_logging;
//! use taskflow_core::orchestration::{GenerationDriver, InMemoryTaskStore, TaskExecutor};
//! use taskflow_core::models::Task;
//!
//! # async fn example(task: Task, driver: Arc<dyn GenerationDriver>) -> taskflow_core::Result<()> {
//! let config = ConfigLoader::load(None)?;
//! init_structured_logging(&config.logging);
//!
//! let store = Arc::new(InMemoryTaskStore::new());
//! store.insert(&task)?;
//!
//! let executor = TaskExecutor::new(store.clone(), driver).with_config(config.executor);
//! let summary = executor.execute_task(task).await;
//! println!("finished {} with status {}", summary.task_id, summary.status);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod orchestration;
pub mod patch;
pub mod state_machine;

pub use config::{EngineConfig, ExecutorConfig};
pub use error::{Result, TaskflowError};
pub use events::{EventPublisher, PublishedEvent};
pub use models::{Annotation, Sequence, Step, StepBucket, StepCounts, Task, TaskId};
pub use orchestration::{
    ExecutionSummary, GenerationDriver, GenerationHandle, LifecycleObserver, PatchSink,
    TaskExecutor,
};
pub use patch::{apply, move_patches, Patch, PatchError, PatchOp, PatchPath, TaskPatch};
pub use state_machine::{
    is_valid_generation_transition, is_valid_task_transition, GenerationStatus, TaskStatus,
};
