//! Lifecycle observer that records every callback and can be told to fail.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use taskflow_core::models::{Sequence, SequenceId, Step, Task, TaskId};
use taskflow_core::orchestration::{GenerationFailure, GenerationReport, LifecycleObserver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Misbehavior {
    Error,
    Panic,
}

/// Records callbacks as strings such as `"sequence_skip:1"` or
/// `"step_complete:draft"`.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<String>>,
    failing: Option<(&'static str, Misbehavior)>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `hook` (e.g. `"on_step_start"`) return an error.
    pub fn failing_on(hook: &'static str) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            failing: Some((hook, Misbehavior::Error)),
        }
    }

    /// Make `hook` panic.
    pub fn panicking_on(hook: &'static str) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            failing: Some((hook, Misbehavior::Panic)),
        }
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|event| event.starts_with(prefix))
            .count()
    }

    pub fn skipped_indices(&self) -> Vec<usize> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| event.strip_prefix("sequence_skip:"))
            .filter_map(|index| index.parse().ok())
            .collect()
    }

    fn record(&self, hook: &'static str, event: String) -> anyhow::Result<()> {
        self.events.lock().push(event);
        match self.failing {
            Some((failing, Misbehavior::Error)) if failing == hook => {
                anyhow::bail!("observer refused {hook}")
            }
            Some((failing, Misbehavior::Panic)) if failing == hook => {
                panic!("observer exploded in {hook}")
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl LifecycleObserver for RecordingObserver {
    async fn on_task_start(&self, _task: &Task) -> anyhow::Result<()> {
        self.record("on_task_start", "task_start".to_string())
    }

    async fn on_sequence_start(
        &self,
        _task_id: &TaskId,
        _sequence: &Sequence,
        index: usize,
    ) -> anyhow::Result<()> {
        self.record("on_sequence_start", format!("sequence_start:{index}"))
    }

    async fn on_sequence_skip(
        &self,
        _task_id: &TaskId,
        _sequence: &Sequence,
        index: usize,
    ) -> anyhow::Result<()> {
        self.record("on_sequence_skip", format!("sequence_skip:{index}"))
    }

    async fn on_step_start(
        &self,
        _task_id: &TaskId,
        _sequence_id: &SequenceId,
        step: &Step,
    ) -> anyhow::Result<()> {
        self.record("on_step_start", format!("step_start:{}", step.name))
    }

    async fn on_step_complete(
        &self,
        _task_id: &TaskId,
        _sequence_id: &SequenceId,
        step: &Step,
        _report: &GenerationReport,
    ) -> anyhow::Result<()> {
        self.record("on_step_complete", format!("step_complete:{}", step.name))
    }

    async fn on_step_error(
        &self,
        _task_id: &TaskId,
        _sequence_id: &SequenceId,
        step: &Step,
        _failure: &GenerationFailure,
    ) -> anyhow::Result<()> {
        self.record("on_step_error", format!("step_error:{}", step.name))
    }

    async fn on_sequence_complete(
        &self,
        _task_id: &TaskId,
        sequence: &Sequence,
        index: usize,
    ) -> anyhow::Result<()> {
        self.record(
            "on_sequence_complete",
            format!("sequence_complete:{index}:{}", sequence.status),
        )
    }

    async fn on_task_complete(&self, task: &Task) -> anyhow::Result<()> {
        self.record("on_task_complete", format!("task_complete:{}", task.status))
    }
}
