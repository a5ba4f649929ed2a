use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::broadcast;

use crate::constants::{events, DEFAULT_EVENT_CHANNEL_CAPACITY};
use crate::models::{Sequence, SequenceId, Step, Task, TaskId};
use crate::orchestration::{GenerationFailure, GenerationReport, LifecycleObserver};

/// Broadcasts executor lifecycle events to live subscribers (UI streams,
/// audit tails). Register it as the executor's observer, or inside a
/// [`CompositeObserver`](crate::orchestration::CompositeObserver).
#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: broadcast::Sender<PublishedEvent>,
}

/// Event that has been published
#[derive(Debug, Clone)]
pub struct PublishedEvent {
    pub name: String,
    pub context: Value,
    pub published_at: chrono::DateTime<chrono::Utc>,
}

impl EventPublisher {
    /// Create a new event publisher with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event with the given name and context
    pub fn publish(&self, event_name: impl Into<String>, context: Value) {
        let event = PublishedEvent {
            name: event_name.into(),
            context,
            published_at: chrono::Utc::now(),
        };

        // No subscribers is fine; events are fire-and-forget.
        if self.sender.send(event).is_err() {
            tracing::trace!("Published event with no subscribers");
        }
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<PublishedEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CHANNEL_CAPACITY)
    }
}

fn sequence_context(task_id: &TaskId, sequence: &Sequence, index: usize) -> Value {
    json!({
        "taskId": task_id,
        "sequenceId": sequence.id,
        "index": index,
        "status": sequence.status,
        "stepCount": sequence.steps.len(),
        "duration": sequence.duration,
    })
}

fn step_context(task_id: &TaskId, sequence_id: &SequenceId, step: &Step) -> Value {
    json!({
        "taskId": task_id,
        "sequenceId": sequence_id,
        "stepId": step.id,
        "name": step.name,
        "generationId": step.generation_id,
        "status": step.status,
    })
}

fn task_context(task: &Task) -> Value {
    json!({
        "taskId": task.id,
        "workspaceId": task.workspace_id,
        "status": task.status,
        "steps": task.steps,
        "duration": task.duration,
        "usage": task.usage,
    })
}

#[async_trait]
impl LifecycleObserver for EventPublisher {
    async fn on_task_start(&self, task: &Task) -> anyhow::Result<()> {
        self.publish(events::TASK_STARTED, task_context(task));
        Ok(())
    }

    async fn on_sequence_start(
        &self,
        task_id: &TaskId,
        sequence: &Sequence,
        index: usize,
    ) -> anyhow::Result<()> {
        self.publish(
            events::SEQUENCE_STARTED,
            sequence_context(task_id, sequence, index),
        );
        Ok(())
    }

    async fn on_sequence_skip(
        &self,
        task_id: &TaskId,
        sequence: &Sequence,
        index: usize,
    ) -> anyhow::Result<()> {
        self.publish(
            events::SEQUENCE_SKIPPED,
            sequence_context(task_id, sequence, index),
        );
        Ok(())
    }

    async fn on_step_start(
        &self,
        task_id: &TaskId,
        sequence_id: &SequenceId,
        step: &Step,
    ) -> anyhow::Result<()> {
        self.publish(events::STEP_STARTED, step_context(task_id, sequence_id, step));
        Ok(())
    }

    async fn on_step_complete(
        &self,
        task_id: &TaskId,
        sequence_id: &SequenceId,
        step: &Step,
        report: &GenerationReport,
    ) -> anyhow::Result<()> {
        let mut context = step_context(task_id, sequence_id, step);
        context["durationMs"] = json!(step.duration);
        context["usage"] = serde_json::to_value(report.usage)?;
        self.publish(events::STEP_COMPLETED, context);
        Ok(())
    }

    async fn on_step_error(
        &self,
        task_id: &TaskId,
        sequence_id: &SequenceId,
        step: &Step,
        failure: &GenerationFailure,
    ) -> anyhow::Result<()> {
        let mut context = step_context(task_id, sequence_id, step);
        context["error"] = serde_json::to_value(failure)?;
        self.publish(events::STEP_FAILED, context);
        Ok(())
    }

    async fn on_sequence_complete(
        &self,
        task_id: &TaskId,
        sequence: &Sequence,
        index: usize,
    ) -> anyhow::Result<()> {
        self.publish(
            events::SEQUENCE_COMPLETED,
            sequence_context(task_id, sequence, index),
        );
        Ok(())
    }

    async fn on_task_complete(&self, task: &Task) -> anyhow::Result<()> {
        self.publish(events::TASK_COMPLETED, task_context(task));
        Ok(())
    }
}
