//! Value types exchanged between the executor, generation drivers and callers.

use serde::{Deserialize, Serialize};

use crate::models::{StepCounts, Task, TaskId, Usage};
use crate::state_machine::TaskStatus;

/// Successful outcome of one generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    /// Reported generation time. When absent the executor uses its own
    /// measurement from dispatch to completion.
    pub duration_ms: Option<u64>,
    pub usage: Usage,
}

impl GenerationReport {
    pub fn new(usage: Usage) -> Self {
        Self {
            duration_ms: None,
            usage,
        }
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

/// Failed outcome of one generation, whichever way it failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationFailure {
    pub message: String,
    pub code: Option<String>,
}

impl GenerationFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl std::fmt::Display for GenerationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "[{code}] {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Result of [`crate::orchestration::TaskExecutor::execute_task`].
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// True when any step, sequence, task-level, observer or sink failure
    /// occurred during the run.
    pub has_error: bool,
    pub task_id: TaskId,
    pub status: TaskStatus,
    pub steps: StepCounts,
    /// Final working copy, equal to the persisted task when the sink accepted
    /// every batch.
    pub task: Task,
}

impl ExecutionSummary {
    pub fn wall_clock_ms(&self) -> u64 {
        self.task.duration.wall_clock
    }

    pub fn usage(&self) -> Usage {
        self.task.usage
    }
}
