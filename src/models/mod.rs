//! # Models
//!
//! The task tree an executor drives: a [`Task`] owns ordered [`Sequence`]s, each
//! owning concurrently dispatched [`Step`]s. Field names serialize in camelCase;
//! they are the contract surface for persistence and stream consumers, and the
//! paths addressed by [`crate::patch`].

pub mod annotation;
pub mod ids;
pub mod sequence;
pub mod step;
pub mod task;

pub use annotation::{Annotation, AnnotationLevel};
pub use ids::{GenerationId, SequenceId, StepId, TaskId};
pub use sequence::Sequence;
pub use step::Step;
pub use task::{ExecutionDuration, StepBucket, StepCounts, Task, TaskStarter, Usage};
