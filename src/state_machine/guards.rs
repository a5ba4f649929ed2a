//! Transition legality tables.
//!
//! These predicates are advisory. The executor consults them before emitting a
//! status patch; the patch engine itself writes whatever it is given.

use super::errors::{StateMachineError, StateMachineResult};
use super::states::{GenerationStatus, TaskStatus};

/// `created -> inProgress | cancelled`, `inProgress -> completed | failed |
/// cancelled`. Terminal states have no outgoing transitions.
pub fn is_valid_task_transition(from: TaskStatus, to: TaskStatus) -> bool {
    use TaskStatus::*;
    matches!(
        (from, to),
        (Created, InProgress)
            | (Created, Cancelled)
            | (InProgress, Completed)
            | (InProgress, Failed)
            | (InProgress, Cancelled)
    )
}

/// `created -> queued -> running -> completed | failed`, with `cancelled`
/// reachable from any non-terminal state. No self-transitions, no backward
/// moves, nothing leaves a terminal state.
pub fn is_valid_generation_transition(from: GenerationStatus, to: GenerationStatus) -> bool {
    use GenerationStatus::*;
    matches!(
        (from, to),
        (Created, Queued)
            | (Queued, Running)
            | (Running, Completed)
            | (Running, Failed)
            | (Created | Queued | Running, Cancelled)
    )
}

pub fn ensure_task_transition(from: TaskStatus, to: TaskStatus) -> StateMachineResult<()> {
    if is_valid_task_transition(from, to) {
        Ok(())
    } else {
        Err(StateMachineError::InvalidTransition {
            entity: "task",
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

pub fn ensure_generation_transition(
    from: GenerationStatus,
    to: GenerationStatus,
) -> StateMachineResult<()> {
    if is_valid_generation_transition(from, to) {
        Ok(())
    } else {
        Err(StateMachineError::InvalidTransition {
            entity: "generation",
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}
