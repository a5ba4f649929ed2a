//! # Lifecycle Observer
//!
//! Callbacks fired by the executor as a run progresses. Every method defaults
//! to a no-op, so implementors override only what they need.
//!
//! Each hook fires at most once per entity. A hook that returns an error (or
//! panics) fails the entity it was observing:
//!
//! | hook                   | effect of an error                                   |
//! |------------------------|------------------------------------------------------|
//! | `on_task_start`        | task fails, every sequence is skipped                |
//! | `on_sequence_start`    | sequence fails, its steps are cancelled              |
//! | `on_step_start`        | step fails, the generation is never started          |
//! | `on_step_complete`     | step is recorded as failed instead of completed      |
//! | `on_sequence_complete` | sequence is recorded as failed                       |
//! | `on_task_complete`     | task is recorded as failed                           |
//! | `on_sequence_skip`     | task fails (already failing), error annotation added |
//! | `on_step_error`        | task fails (already failing), error annotation added |
//!
//! The `*_complete` hooks receive the entity as it is about to be committed.

use std::sync::Arc;

use async_trait::async_trait;

use super::types::{GenerationFailure, GenerationReport};
use crate::models::{Sequence, SequenceId, Step, Task, TaskId};

#[async_trait]
pub trait LifecycleObserver: Send + Sync {
    async fn on_task_start(&self, _task: &Task) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_sequence_start(
        &self,
        _task_id: &TaskId,
        _sequence: &Sequence,
        _index: usize,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_sequence_skip(
        &self,
        _task_id: &TaskId,
        _sequence: &Sequence,
        _index: usize,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_step_start(
        &self,
        _task_id: &TaskId,
        _sequence_id: &SequenceId,
        _step: &Step,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_step_complete(
        &self,
        _task_id: &TaskId,
        _sequence_id: &SequenceId,
        _step: &Step,
        _report: &GenerationReport,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_step_error(
        &self,
        _task_id: &TaskId,
        _sequence_id: &SequenceId,
        _step: &Step,
        _failure: &GenerationFailure,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_sequence_complete(
        &self,
        _task_id: &TaskId,
        _sequence: &Sequence,
        _index: usize,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_task_complete(&self, _task: &Task) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl LifecycleObserver for NoopObserver {}

/// Forwards each event to every inner observer in order. All observers are
/// notified even when an earlier one fails; the first error is returned.
#[derive(Clone, Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn LifecycleObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn LifecycleObserver>>) -> Self {
        Self { observers }
    }

    pub fn with(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl std::fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers", &self.observers.len())
            .finish()
    }
}

fn first_error(results: Vec<anyhow::Result<()>>) -> anyhow::Result<()> {
    results.into_iter().collect()
}

#[async_trait]
impl LifecycleObserver for CompositeObserver {
    async fn on_task_start(&self, task: &Task) -> anyhow::Result<()> {
        let mut results = Vec::with_capacity(self.observers.len());
        for observer in &self.observers {
            results.push(observer.on_task_start(task).await);
        }
        first_error(results)
    }

    async fn on_sequence_start(
        &self,
        task_id: &TaskId,
        sequence: &Sequence,
        index: usize,
    ) -> anyhow::Result<()> {
        let mut results = Vec::with_capacity(self.observers.len());
        for observer in &self.observers {
            results.push(observer.on_sequence_start(task_id, sequence, index).await);
        }
        first_error(results)
    }

    async fn on_sequence_skip(
        &self,
        task_id: &TaskId,
        sequence: &Sequence,
        index: usize,
    ) -> anyhow::Result<()> {
        let mut results = Vec::with_capacity(self.observers.len());
        for observer in &self.observers {
            results.push(observer.on_sequence_skip(task_id, sequence, index).await);
        }
        first_error(results)
    }

    async fn on_step_start(
        &self,
        task_id: &TaskId,
        sequence_id: &SequenceId,
        step: &Step,
    ) -> anyhow::Result<()> {
        let mut results = Vec::with_capacity(self.observers.len());
        for observer in &self.observers {
            results.push(observer.on_step_start(task_id, sequence_id, step).await);
        }
        first_error(results)
    }

    async fn on_step_complete(
        &self,
        task_id: &TaskId,
        sequence_id: &SequenceId,
        step: &Step,
        report: &GenerationReport,
    ) -> anyhow::Result<()> {
        let mut results = Vec::with_capacity(self.observers.len());
        for observer in &self.observers {
            results.push(
                observer
                    .on_step_complete(task_id, sequence_id, step, report)
                    .await,
            );
        }
        first_error(results)
    }

    async fn on_step_error(
        &self,
        task_id: &TaskId,
        sequence_id: &SequenceId,
        step: &Step,
        failure: &GenerationFailure,
    ) -> anyhow::Result<()> {
        let mut results = Vec::with_capacity(self.observers.len());
        for observer in &self.observers {
            results.push(
                observer
                    .on_step_error(task_id, sequence_id, step, failure)
                    .await,
            );
        }
        first_error(results)
    }

    async fn on_sequence_complete(
        &self,
        task_id: &TaskId,
        sequence: &Sequence,
        index: usize,
    ) -> anyhow::Result<()> {
        let mut results = Vec::with_capacity(self.observers.len());
        for observer in &self.observers {
            results.push(
                observer
                    .on_sequence_complete(task_id, sequence, index)
                    .await,
            );
        }
        first_error(results)
    }

    async fn on_task_complete(&self, task: &Task) -> anyhow::Result<()> {
        let mut results = Vec::with_capacity(self.observers.len());
        for observer in &self.observers {
            results.push(observer.on_task_complete(task).await);
        }
        first_error(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskStarter;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting {
        starts: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl LifecycleObserver for Counting {
        async fn on_task_start(&self, _task: &Task) -> anyhow::Result<()> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("refused");
            }
            Ok(())
        }
    }

    fn task() -> Task {
        Task::new(
            "ws",
            TaskStarter::Manual {
                user_id: "u".to_string(),
            },
            Vec::new(),
        )
    }

    #[tokio::test]
    async fn test_noop_observer_accepts_everything() {
        let observer = NoopObserver;
        assert!(observer.on_task_start(&task()).await.is_ok());
        assert!(observer.on_task_complete(&task()).await.is_ok());
    }

    #[tokio::test]
    async fn test_composite_notifies_all_and_reports_first_error() {
        let failing = Arc::new(Counting {
            fail: true,
            ..Default::default()
        });
        let healthy = Arc::new(Counting::default());
        let composite = CompositeObserver::default()
            .with(failing.clone())
            .with(healthy.clone());
        assert_eq!(composite.len(), 2);

        let err = composite.on_task_start(&task()).await.unwrap_err();
        assert_eq!(err.to_string(), "refused");
        assert_eq!(failing.starts.load(Ordering::SeqCst), 1);
        assert_eq!(healthy.starts.load(Ordering::SeqCst), 1);
    }
}
