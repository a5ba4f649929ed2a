//! # System Constants
//!
//! Event names published for live streams and the fixed messages the executor
//! writes into annotations.

/// Lifecycle events, one per observer hook.
pub mod events {
    // Task lifecycle events
    pub const TASK_STARTED: &str = "task.started";
    pub const TASK_COMPLETED: &str = "task.completed";

    // Sequence lifecycle events
    pub const SEQUENCE_STARTED: &str = "sequence.started";
    pub const SEQUENCE_SKIPPED: &str = "sequence.skipped";
    pub const SEQUENCE_COMPLETED: &str = "sequence.completed";

    // Step lifecycle events
    pub const STEP_STARTED: &str = "step.started";
    pub const STEP_COMPLETED: &str = "step.completed";
    pub const STEP_FAILED: &str = "step.failed";
}

/// Default broadcast capacity for [`crate::events::EventPublisher`].
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 1000;

