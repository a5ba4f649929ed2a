use serde::{Deserialize, Serialize};

use super::{GenerationId, StepId, Usage};
use crate::state_machine::GenerationStatus;

/// The atomic unit of work, bound to exactly one generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: StepId,
    pub status: GenerationStatus,
    pub name: String,
    pub generation_id: GenerationId,
    /// Milliseconds spent in the generation.
    pub duration: u64,
    pub usage: Usage,
}

impl Step {
    pub fn new(name: impl Into<String>, generation_id: impl Into<GenerationId>) -> Self {
        Self {
            id: StepId::new(),
            status: GenerationStatus::Queued,
            name: name.into(),
            generation_id: generation_id.into(),
            duration: 0,
            usage: Usage::default(),
        }
    }

    pub fn with_status(mut self, status: GenerationStatus) -> Self {
        self.status = status;
        self
    }
}
