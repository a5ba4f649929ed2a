use serde::{Deserialize, Serialize};

use super::{ExecutionDuration, SequenceId, Step, Usage};
use crate::state_machine::GenerationStatus;

/// A barrier unit: its steps run concurrently, and the next sequence does not
/// start until every one of them has settled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sequence {
    pub id: SequenceId,
    pub status: GenerationStatus,
    pub duration: ExecutionDuration,
    pub usage: Usage,
    pub steps: Vec<Step>,
}

impl Sequence {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            id: SequenceId::new(),
            status: GenerationStatus::Queued,
            duration: ExecutionDuration::default(),
            usage: Usage::default(),
            steps,
        }
    }

    pub fn with_status(mut self, status: GenerationStatus) -> Self {
        self.status = status;
        self
    }

    pub fn step_count(&self) -> u64 {
        self.steps.len() as u64
    }
}
