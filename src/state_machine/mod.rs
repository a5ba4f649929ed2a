// State machine module for task and generation lifecycles.
//
// Pure status enums and the legality tables the executor consults before it
// emits a status-changing patch.

pub mod errors;
pub mod guards;
pub mod states;

// Re-export main types for convenient access
pub use errors::{StateMachineError, StateMachineResult};
pub use guards::{
    ensure_generation_transition, ensure_task_transition, is_valid_generation_transition,
    is_valid_task_transition,
};
pub use states::{GenerationStatus, TaskStatus};
