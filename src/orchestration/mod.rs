//! # Orchestration Engine
//!
//! Drives a planned [`Task`](crate::models::Task) to completion.
//!
//! ## Core Components
//!
//! - **TaskExecutor**: sequence traversal, concurrent step dispatch, failure
//!   cascade and bookkeeping
//! - **GenerationDriver**: seam to whatever actually performs a generation
//! - **PatchSink**: seam to persistence and live streams
//! - **LifecycleObserver**: optional callbacks at every lifecycle point
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use taskflow_core::orchestration::{
//!     GenerationDriver, GenerationError, GenerationHandle, GenerationReport, InMemoryTaskStore,
//!     TaskExecutor,
//! };
//! use taskflow_core::models::{GenerationId, Sequence, Step, Task, TaskStarter, Usage};
//!
//! struct Echo;
//!
//! #[async_trait::async_trait]
//! impl GenerationDriver for Echo {
//!     async fn start_generation(
//!         &self,
//!         _generation_id: &GenerationId,
//!         handle: GenerationHandle,
//!     ) -> Result<(), GenerationError> {
//!         handle.complete(GenerationReport::new(Usage::new(10, 20)));
//!         Ok(())
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let task = Task::new(
//!     "workspace-1",
//!     TaskStarter::Manual { user_id: "user-1".into() },
//!     vec![Sequence::new(vec![Step::new("draft", "gen-1")])],
//! );
//!
//! let store = Arc::new(InMemoryTaskStore::new());
//! store.insert(&task).unwrap();
//!
//! let executor = TaskExecutor::new(store.clone(), Arc::new(Echo));
//! let summary = executor.execute_task(task).await;
//! assert!(!summary.has_error);
//! # });
//! ```

pub mod driver;
pub mod executor;
pub mod observer;
pub mod sink;
pub mod types;

pub use driver::{GenerationDriver, GenerationError, GenerationHandle};
pub use executor::TaskExecutor;
pub use observer::{CompositeObserver, LifecycleObserver, NoopObserver};
pub use sink::{InMemoryTaskStore, PatchSink, RecordingSink, SerializedPatchSink, SinkError};
pub use types::{ExecutionSummary, GenerationFailure, GenerationReport};
