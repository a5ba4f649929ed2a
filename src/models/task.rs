//! # Task Model
//!
//! Root aggregate of one execution run: ordered sequences, the six-bucket step
//! counter, cumulative duration and token usage, and the annotation trail.
//!
//! The counter invariant `steps.total() == total_step_count()` holds at every
//! observable point. [`Task::new`] establishes it by queueing every step; after
//! that the executor only moves counts between buckets in equal pairs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Annotation, Sequence, TaskId};
use crate::state_machine::TaskStatus;

/// How a run was triggered. Carried as opaque metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TaskStarter {
    Manual { user_id: String },
    Schedule { schedule_id: String },
    Api { client_id: String },
    Webhook { hook_id: String },
}

/// The six mutually exclusive step buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepBucket {
    Queued,
    InProgress,
    Completed,
    Warning,
    Cancelled,
    Failed,
}

impl StepBucket {
    pub const ALL: [StepBucket; 6] = [
        Self::Queued,
        Self::InProgress,
        Self::Completed,
        Self::Warning,
        Self::Cancelled,
        Self::Failed,
    ];

    /// Field name under `steps` in the persisted document.
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::InProgress => "inProgress",
            Self::Completed => "completed",
            Self::Warning => "warning",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for StepBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field_name())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepCounts {
    pub queued: u64,
    pub in_progress: u64,
    pub completed: u64,
    pub warning: u64,
    pub cancelled: u64,
    pub failed: u64,
}

impl StepCounts {
    pub fn queued(count: u64) -> Self {
        Self {
            queued: count,
            ..Default::default()
        }
    }

    pub fn get(&self, bucket: StepBucket) -> u64 {
        match bucket {
            StepBucket::Queued => self.queued,
            StepBucket::InProgress => self.in_progress,
            StepBucket::Completed => self.completed,
            StepBucket::Warning => self.warning,
            StepBucket::Cancelled => self.cancelled,
            StepBucket::Failed => self.failed,
        }
    }

    pub fn get_mut(&mut self, bucket: StepBucket) -> &mut u64 {
        match bucket {
            StepBucket::Queued => &mut self.queued,
            StepBucket::InProgress => &mut self.in_progress,
            StepBucket::Completed => &mut self.completed,
            StepBucket::Warning => &mut self.warning,
            StepBucket::Cancelled => &mut self.cancelled,
            StepBucket::Failed => &mut self.failed,
        }
    }

    pub fn total(&self) -> u64 {
        StepBucket::ALL.iter().map(|b| self.get(*b)).sum()
    }
}

/// Wall-clock and summed-work durations, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionDuration {
    pub wall_clock: u64,
    pub total_task: u64,
}

/// Token usage counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input: u64,
    pub output: u64,
    pub total: u64,
}

impl Usage {
    pub fn new(input: u64, output: u64) -> Self {
        Self {
            input,
            output,
            total: input.saturating_add(output),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.input == 0 && self.output == 0 && self.total == 0
    }

    /// Field-wise sum, or `None` if any counter would overflow.
    pub fn checked_add(&self, other: &Usage) -> Option<Usage> {
        Some(Usage {
            input: self.input.checked_add(other.input)?,
            output: self.output.checked_add(other.output)?,
            total: self.total.checked_add(other.total)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub workspace_id: String,
    pub starter: TaskStarter,
    pub status: TaskStatus,
    pub steps: StepCounts,
    pub duration: ExecutionDuration,
    pub usage: Usage,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub annotations: Vec<Annotation>,
    pub sequences: Vec<Sequence>,
}

impl Task {
    /// Create a task in `created` status with every step queued.
    pub fn new(
        workspace_id: impl Into<String>,
        starter: TaskStarter,
        sequences: Vec<Sequence>,
    ) -> Self {
        let total = sequences.iter().map(|s| s.steps.len() as u64).sum();
        Self {
            id: TaskId::new(),
            workspace_id: workspace_id.into(),
            starter,
            status: TaskStatus::Created,
            steps: StepCounts::queued(total),
            duration: ExecutionDuration::default(),
            usage: Usage::default(),
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            annotations: Vec::new(),
            sequences,
        }
    }

    pub fn total_step_count(&self) -> u64 {
        self.sequences.iter().map(|s| s.steps.len() as u64).sum()
    }

    pub fn step_counts_consistent(&self) -> bool {
        self.steps.total() == self.total_step_count()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GenerationId, Step};
    use serde_json::json;

    fn sample_task() -> Task {
        Task::new(
            "workspace-1",
            TaskStarter::Manual {
                user_id: "user-1".to_string(),
            },
            vec![
                Sequence::new(vec![Step::new("outline", GenerationId::new("g1"))]),
                Sequence::new(vec![
                    Step::new("draft", GenerationId::new("g2")),
                    Step::new("review", GenerationId::new("g3")),
                ]),
            ],
        )
    }

    #[test]
    fn test_new_task_queues_every_step() {
        let task = sample_task();
        assert_eq!(task.total_step_count(), 3);
        assert_eq!(task.steps, StepCounts::queued(3));
        assert!(task.step_counts_consistent());
        assert_eq!(task.status, TaskStatus::Created);
    }

    #[test]
    fn test_step_counts_accessors() {
        let mut counts = StepCounts::queued(2);
        *counts.get_mut(StepBucket::Queued) -= 1;
        *counts.get_mut(StepBucket::Failed) += 1;
        assert_eq!(counts.get(StepBucket::Failed), 1);
        assert_eq!(counts.total(), 2);
    }

    #[test]
    fn test_json_field_names() {
        let task = sample_task();
        let value = serde_json::to_value(&task).unwrap();

        assert_eq!(value["status"], "created");
        assert_eq!(value["workspaceId"], "workspace-1");
        assert_eq!(value["starter"], json!({"type": "manual", "userId": "user-1"}));
        assert_eq!(value["steps"]["inProgress"], 0);
        assert_eq!(value["duration"], json!({"wallClock": 0, "totalTask": 0}));
        assert_eq!(value["usage"], json!({"input": 0, "output": 0, "total": 0}));
        assert!(value["startedAt"].is_null());
        assert_eq!(value["sequences"][1]["steps"][0]["generationId"], "g2");
        assert_eq!(value["sequences"][1]["steps"][0]["status"], "queued");
    }

    #[test]
    fn test_usage_checked_add() {
        let usage = Usage::default();
        assert!(usage.is_zero());
        let usage = usage.checked_add(&Usage::new(10, 5)).unwrap();
        let usage = usage.checked_add(&Usage::new(1, 1)).unwrap();
        assert_eq!(usage, Usage { input: 11, output: 6, total: 17 });

        let huge = Usage::new(u64::MAX, 1);
        assert_eq!(huge.total, u64::MAX);
        assert_eq!(huge.checked_add(&Usage::new(0, 0)), Some(huge));
        assert_eq!(huge.checked_add(&Usage::new(1, 0)), None);
    }

    #[test]
    fn test_bucket_field_names() {
        let names: Vec<_> = StepBucket::ALL.iter().map(|b| b.field_name()).collect();
        assert_eq!(
            names,
            ["queued", "inProgress", "completed", "warning", "cancelled", "failed"]
        );
        assert_eq!(
            serde_json::to_value(StepBucket::InProgress).unwrap(),
            json!("inProgress")
        );
    }
}
