//! # Typed Task Patches
//!
//! Closed descriptors for every mutation the executor makes to a task tree.
//! A typed patch can only address fields that exist in the model, applies
//! directly to a [`Task`] working copy without touching the rest of the tree,
//! and lowers to the generic wire [`Patch`]es shipped to sinks.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Number, Value};

use super::errors::{PatchError, PatchResult};
use super::path::PatchPath;
use super::step_counts::bucket_path;
use super::{Patch, PatchOp};
use crate::models::{Annotation, Sequence, Step, StepBucket, Task, Usage};
use crate::state_machine::{GenerationStatus, TaskStatus};

#[derive(Debug, Clone, PartialEq)]
pub enum TaskPatch {
    SetStatus(TaskStatus),
    SetStartedAt(DateTime<Utc>),
    SetCompletedAt(DateTime<Utc>),
    IncrementSteps { bucket: StepBucket, count: u64 },
    DecrementSteps { bucket: StepBucket, count: u64 },
    SetWallClock(u64),
    SetTotalTask(u64),
    AddUsage(Usage),
    AppendAnnotation(Annotation),
    Sequence { index: usize, patch: SequencePatch },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SequencePatch {
    SetStatus(GenerationStatus),
    SetWallClock(u64),
    SetTotalTask(u64),
    AddUsage(Usage),
    Step { index: usize, patch: StepPatch },
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepPatch {
    SetStatus(GenerationStatus),
    SetDuration(u64),
    AddUsage(Usage),
}

impl TaskPatch {
    /// Typed counterpart of [`move_patches`](super::move_patches); lowers to exactly that pair.
    pub fn move_steps(from: StepBucket, to: StepBucket, count: u64) -> [TaskPatch; 2] {
        [
            TaskPatch::DecrementSteps {
                bucket: from,
                count,
            },
            TaskPatch::IncrementSteps { bucket: to, count },
        ]
    }

    pub fn sequence(index: usize, patch: SequencePatch) -> Self {
        Self::Sequence { index, patch }
    }

    pub fn step(sequence_index: usize, step_index: usize, patch: StepPatch) -> Self {
        Self::Sequence {
            index: sequence_index,
            patch: SequencePatch::Step {
                index: step_index,
                patch,
            },
        }
    }

    /// Apply to a typed working copy.
    pub fn apply_to(&self, task: &mut Task) -> PatchResult<()> {
        match self {
            Self::SetStatus(status) => task.status = *status,
            Self::SetStartedAt(at) => task.started_at = Some(*at),
            Self::SetCompletedAt(at) => task.completed_at = Some(*at),
            Self::IncrementSteps { bucket, count } => {
                let slot = task.steps.get_mut(*bucket);
                *slot = slot
                    .checked_add(*count)
                    .ok_or_else(|| counter_error(bucket_path(*bucket), "overflow"))?;
            }
            Self::DecrementSteps { bucket, count } => {
                let slot = task.steps.get_mut(*bucket);
                *slot = slot
                    .checked_sub(*count)
                    .ok_or_else(|| counter_error(bucket_path(*bucket), "underflow"))?;
            }
            Self::SetWallClock(ms) => task.duration.wall_clock = *ms,
            Self::SetTotalTask(ms) => task.duration.total_task = *ms,
            Self::AddUsage(usage) => {
                task.usage = task
                    .usage
                    .checked_add(usage)
                    .ok_or_else(|| usage_error(PatchPath::root("usage")))?;
            }
            Self::AppendAnnotation(annotation) => task.annotations.push(annotation.clone()),
            Self::Sequence { index, patch } => {
                let sequence = task
                    .sequences
                    .get_mut(*index)
                    .ok_or_else(|| not_found(&sequence_path(*index)))?;
                patch.apply_to(sequence, *index)?;
            }
        }
        Ok(())
    }

    /// Lower to wire patches.
    pub fn to_wire(&self) -> serde_json::Result<Vec<Patch>> {
        let patches = match self {
            Self::SetStatus(status) => vec![set(PatchPath::root("status"), serde_json::to_value(status)?)],
            Self::SetStartedAt(at) => vec![set(PatchPath::root("startedAt"), timestamp(at))],
            Self::SetCompletedAt(at) => vec![set(PatchPath::root("completedAt"), timestamp(at))],
            Self::IncrementSteps { bucket, count } => vec![Patch::new(
                bucket_path(*bucket),
                PatchOp::Increment(Number::from(*count)),
            )],
            Self::DecrementSteps { bucket, count } => vec![Patch::new(
                bucket_path(*bucket),
                PatchOp::Decrement(Number::from(*count)),
            )],
            Self::SetWallClock(ms) => vec![set(
                PatchPath::root("duration").key("wallClock"),
                Value::from(*ms),
            )],
            Self::SetTotalTask(ms) => vec![set(
                PatchPath::root("duration").key("totalTask"),
                Value::from(*ms),
            )],
            Self::AddUsage(usage) => usage_increments(PatchPath::root("usage"), usage),
            Self::AppendAnnotation(annotation) => vec![Patch::new(
                PatchPath::root("annotations"),
                PatchOp::Push(vec![serde_json::to_value(annotation)?]),
            )],
            Self::Sequence { index, patch } => patch.to_wire(sequence_path(*index))?,
        };
        Ok(patches)
    }
}

impl SequencePatch {
    /// Apply to the sequence at `index` of a working copy.
    pub fn apply_to(&self, sequence: &mut Sequence, index: usize) -> PatchResult<()> {
        match self {
            Self::SetStatus(status) => sequence.status = *status,
            Self::SetWallClock(ms) => sequence.duration.wall_clock = *ms,
            Self::SetTotalTask(ms) => sequence.duration.total_task = *ms,
            Self::AddUsage(usage) => {
                sequence.usage = sequence
                    .usage
                    .checked_add(usage)
                    .ok_or_else(|| usage_error(sequence_path(index).key("usage")))?;
            }
            Self::Step {
                index: step_index,
                patch,
            } => {
                let step = sequence.steps.get_mut(*step_index).ok_or_else(|| {
                    not_found(&sequence_path(index).key("steps").index(*step_index))
                })?;
                patch.apply_to(step, sequence_path(index).key("steps").index(*step_index))?;
            }
        }
        Ok(())
    }

    fn to_wire(&self, base: PatchPath) -> serde_json::Result<Vec<Patch>> {
        let patches = match self {
            Self::SetStatus(status) => vec![set(base.key("status"), serde_json::to_value(status)?)],
            Self::SetWallClock(ms) => vec![set(
                base.key("duration").key("wallClock"),
                Value::from(*ms),
            )],
            Self::SetTotalTask(ms) => vec![set(
                base.key("duration").key("totalTask"),
                Value::from(*ms),
            )],
            Self::AddUsage(usage) => usage_increments(base.key("usage"), usage),
            Self::Step { index, patch } => patch.to_wire(base.key("steps").index(*index))?,
        };
        Ok(patches)
    }
}

impl StepPatch {
    /// Apply to a step; `path` locates the step in error reports.
    pub fn apply_to(&self, step: &mut Step, path: PatchPath) -> PatchResult<()> {
        match self {
            Self::SetStatus(status) => step.status = *status,
            Self::SetDuration(ms) => step.duration = *ms,
            Self::AddUsage(usage) => {
                step.usage = step
                    .usage
                    .checked_add(usage)
                    .ok_or_else(|| usage_error(path.key("usage")))?;
            }
        }
        Ok(())
    }

    fn to_wire(&self, base: PatchPath) -> serde_json::Result<Vec<Patch>> {
        let patches = match self {
            Self::SetStatus(status) => vec![set(base.key("status"), serde_json::to_value(status)?)],
            Self::SetDuration(ms) => vec![set(base.key("duration"), Value::from(*ms))],
            Self::AddUsage(usage) => usage_increments(base.key("usage"), usage),
        };
        Ok(patches)
    }
}

/// Lower a batch of typed patches, preserving order.
pub fn lower_all(patches: &[TaskPatch]) -> serde_json::Result<Vec<Patch>> {
    let mut wire = Vec::with_capacity(patches.len());
    for patch in patches {
        wire.extend(patch.to_wire()?);
    }
    Ok(wire)
}

fn sequence_path(index: usize) -> PatchPath {
    PatchPath::root("sequences").index(index)
}

fn set(path: PatchPath, value: Value) -> Patch {
    Patch::new(path, PatchOp::Set(value))
}

fn timestamp(at: &DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

fn usage_increments(base: PatchPath, usage: &Usage) -> Vec<Patch> {
    [
        ("input", usage.input),
        ("output", usage.output),
        ("total", usage.total),
    ]
    .into_iter()
    .map(|(field, value)| {
        Patch::new(
            base.clone().key(field),
            PatchOp::Increment(Number::from(value)),
        )
    })
    .collect()
}

fn not_found(path: &PatchPath) -> PatchError {
    PatchError::PathNotFound {
        path: path.to_string(),
    }
}

fn counter_error(path: PatchPath, found: &'static str) -> PatchError {
    PatchError::TypeMismatch {
        path: path.to_string(),
        expected: "non-negative step count",
        found,
    }
}

fn usage_error(path: PatchPath) -> PatchError {
    PatchError::TypeMismatch {
        path: path.to_string(),
        expected: "u64 usage counter",
        found: "overflow",
    }
}
