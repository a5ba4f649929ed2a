use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{SequenceId, StepId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationLevel {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for AnnotationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Append-only audit record. Annotations are pushed onto the task and never
/// edited or removed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub level: AnnotationLevel,
    pub message: String,
    pub sequence_id: Option<SequenceId>,
    pub step_id: Option<StepId>,
    pub created_at: DateTime<Utc>,
}

impl Annotation {
    pub fn new(level: AnnotationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            sequence_id: None,
            step_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(AnnotationLevel::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(AnnotationLevel::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(AnnotationLevel::Info, message)
    }

    pub fn for_sequence(mut self, sequence_id: SequenceId) -> Self {
        self.sequence_id = Some(sequence_id);
        self
    }

    pub fn for_step(mut self, sequence_id: SequenceId, step_id: StepId) -> Self {
        self.sequence_id = Some(sequence_id);
        self.step_id = Some(step_id);
        self
    }
}
