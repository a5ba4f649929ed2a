//! # Task Executor
//!
//! Drives one [`Task`] from `created` to a terminal status.
//!
//! ## Execution model
//!
//! Sequences run strictly in order. Inside a sequence every step is dispatched
//! concurrently through the [`GenerationDriver`] and the sequence settles only
//! once all of them have (join, never cancel). After the first failed sequence
//! the remaining ones are still visited, but only to cancel their steps.
//!
//! ## State
//!
//! The executor owns a typed working copy of the task. Each logical event
//! (a step starting, a step completing, a sequence settling...) is one batch of
//! [`TaskPatch`]es: applied to the working copy, lowered to wire patches and
//! handed to the [`PatchSink`] in a single `apply_patches` call. Bucket moves
//! are always paired, so `sum(steps.*)` never changes.
//!
//! ## Failure containment
//!
//! `execute_task` does not return errors. Generation failures, driver errors
//! and panics, observer errors and panics, and sink errors all end up in task,
//! sequence and step status, error annotations and
//! [`ExecutionSummary::has_error`].

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::future::join_all;
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tracing::{debug, error, instrument, warn};

use super::driver::{GenerationDriver, GenerationHandle};
use super::observer::{LifecycleObserver, NoopObserver};
use super::sink::PatchSink;
use super::types::{ExecutionSummary, GenerationFailure, GenerationReport};
use crate::config::ExecutorConfig;
use crate::logging::{log_sequence_operation, log_step_operation, log_task_operation};
use crate::models::{
    Annotation, GenerationId, Sequence, SequenceId, Step, StepBucket, StepId, Task, TaskId,
    Usage,
};
use crate::patch::{lower_all, PatchPath, SequencePatch, StepPatch, TaskPatch};
use crate::state_machine::{is_valid_task_transition, GenerationStatus, TaskStatus};

pub struct TaskExecutor {
    sink: Arc<dyn PatchSink>,
    driver: Arc<dyn GenerationDriver>,
    observer: Arc<dyn LifecycleObserver>,
    config: ExecutorConfig,
    /// Bounds concurrently running steps across every task this executor runs.
    step_semaphore: Option<Arc<Semaphore>>,
}

impl TaskExecutor {
    pub fn new(sink: Arc<dyn PatchSink>, driver: Arc<dyn GenerationDriver>) -> Self {
        Self {
            sink,
            driver,
            observer: Arc::new(NoopObserver),
            config: ExecutorConfig::default(),
            step_semaphore: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_config(mut self, config: ExecutorConfig) -> Self {
        self.step_semaphore = config
            .max_concurrent_steps
            .map(|limit| Arc::new(Semaphore::new(limit.max(1))));
        self.config = config;
        self
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run `task` to completion and report how it went.
    ///
    /// The task is expected to be freshly planned: `created`, with every step
    /// counted in `steps.queued`.
    #[instrument(skip(self, task), fields(task_id = %task.id, sequences = task.sequences.len()))]
    pub async fn execute_task(&self, task: Task) -> ExecutionSummary {
        TaskRun::new(self, task).execute().await
    }
}

impl std::fmt::Debug for TaskExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskExecutor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

struct StepOutcome {
    failed: bool,
    duration: u64,
}

struct SequenceOutcome {
    failed: bool,
    total_task: u64,
}

/// State of a single `execute_task` call.
struct TaskRun<'a> {
    executor: &'a TaskExecutor,
    task_id: TaskId,
    working: Mutex<Task>,
    /// Set by observer failures that fail the task without failing a sequence.
    task_failed: AtomicBool,
    /// Set when a batch could not be delivered or lowered.
    commit_failed: AtomicBool,
}

impl<'a> TaskRun<'a> {
    fn new(executor: &'a TaskExecutor, task: Task) -> Self {
        Self {
            executor,
            task_id: task.id,
            working: Mutex::new(task),
            task_failed: AtomicBool::new(false),
            commit_failed: AtomicBool::new(false),
        }
    }

    async fn execute(self) -> ExecutionSummary {
        let started = Instant::now();

        let initial = self.task_snapshot();
        if !initial.step_counts_consistent() {
            warn!(
                task_id = %self.task_id,
                counted = initial.steps.total(),
                planned = initial.total_step_count(),
                "Step counters do not match the planned step count"
            );
        }

        let mut batch = self.task_status_patches(initial.status, TaskStatus::InProgress);
        batch.push(TaskPatch::SetStartedAt(Utc::now()));
        self.commit(batch).await;
        log_task_operation("start", &self.task_id, "inProgress", None);

        let mut prior_failure = false;
        let snapshot = self.task_snapshot();
        if let Err(message) = self
            .notify("on_task_start", self.executor.observer.on_task_start(&snapshot))
            .await
        {
            self.record_observer_failure(message, None, None).await;
            prior_failure = true;
        }

        let mut total_task = 0;
        for index in 0..initial.sequences.len() {
            if prior_failure || self.task_failed.load(Ordering::SeqCst) {
                self.skip_sequence(index).await;
                continue;
            }
            let outcome = self.run_sequence(index).await;
            total_task = outcome.total_task.saturating_add(total_task);
            prior_failure |= outcome.failed;
        }

        let wall_clock = elapsed_ms(started);
        let mut failed = prior_failure || self.task_failed.load(Ordering::SeqCst);
        let mut finals = self.final_task_patches(failed, wall_clock, total_task);

        let projected = self.project(&finals);
        if let Err(message) = self
            .notify(
                "on_task_complete",
                self.executor.observer.on_task_complete(&projected),
            )
            .await
        {
            if !failed {
                failed = true;
                finals = self.final_task_patches(true, wall_clock, total_task);
            }
            finals.push(TaskPatch::AppendAnnotation(Annotation::error(message)));
        }
        self.commit(finals).await;
        self.executor.sink.finish(&self.task_id).await;

        let task = self.working.into_inner();
        let has_error = failed || self.commit_failed.load(Ordering::SeqCst);
        log_task_operation(
            "complete",
            &self.task_id,
            &task.status.to_string(),
            has_error.then_some("run recorded errors"),
        );

        ExecutionSummary {
            has_error,
            task_id: self.task_id,
            status: task.status,
            steps: task.steps,
            task,
        }
    }

    fn final_task_patches(&self, failed: bool, wall_clock: u64, total_task: u64) -> Vec<TaskPatch> {
        let current = self.working.lock().status;
        let target = if failed {
            TaskStatus::Failed
        } else {
            TaskStatus::Completed
        };
        let mut patches = self.task_status_patches(current, target);
        patches.extend([
            TaskPatch::SetWallClock(wall_clock),
            TaskPatch::SetTotalTask(total_task),
            TaskPatch::SetCompletedAt(Utc::now()),
        ]);
        patches
    }

    #[instrument(skip(self), fields(task_id = %self.task_id))]
    async fn run_sequence(&self, index: usize) -> SequenceOutcome {
        let Some(sequence) = self.sequence_snapshot(index) else {
            error!(task_id = %self.task_id, index, "Sequence vanished from working copy");
            return SequenceOutcome {
                failed: true,
                total_task: 0,
            };
        };
        let started = Instant::now();

        self.commit(self.sequence_status_patches(index, &sequence, GenerationStatus::Running))
            .await;
        log_sequence_operation("start", &self.task_id, &sequence.id, index, "running", None);

        let running = self.sequence_snapshot(index).unwrap_or_else(|| sequence.clone());
        if let Err(message) = self
            .notify(
                "on_sequence_start",
                self.executor
                    .observer
                    .on_sequence_start(&self.task_id, &running, index),
            )
            .await
        {
            self.abort_sequence(index, &running, message).await;
            return SequenceOutcome {
                failed: true,
                total_task: 0,
            };
        }

        let outcomes = join_all(
            (0..sequence.steps.len()).map(|step_index| self.run_step(index, step_index, sequence.id)),
        )
        .await;

        let mut failed = outcomes.iter().any(|outcome| outcome.failed);
        let total_task = outcomes
            .iter()
            .fold(0u64, |sum, outcome| sum.saturating_add(outcome.duration));
        let wall_clock = elapsed_ms(started);

        let settled = self.sequence_snapshot(index).unwrap_or(running);
        let target = settle_status(failed);
        let mut batch = self.settle_sequence_patches(index, &settled, target, wall_clock, total_task);

        let mut projected = settled.clone();
        for patch in &batch {
            if let TaskPatch::Sequence { patch, .. } = patch {
                if let Err(error) = patch.apply_to(&mut projected, index) {
                    debug!(task_id = %self.task_id, error = %error, "Projection skipped patch");
                }
            }
        }
        if let Err(message) = self
            .notify(
                "on_sequence_complete",
                self.executor
                    .observer
                    .on_sequence_complete(&self.task_id, &projected, index),
            )
            .await
        {
            if !failed {
                failed = true;
                batch = self.settle_sequence_patches(
                    index,
                    &settled,
                    GenerationStatus::Failed,
                    wall_clock,
                    total_task,
                );
            }
            batch.push(TaskPatch::AppendAnnotation(
                Annotation::error(message).for_sequence(settled.id),
            ));
        }
        self.commit(batch).await;

        log_sequence_operation(
            "complete",
            &self.task_id,
            &settled.id,
            index,
            &settle_status(failed).to_string(),
            None,
        );

        SequenceOutcome { failed, total_task }
    }

    fn settle_sequence_patches(
        &self,
        index: usize,
        sequence: &Sequence,
        target: GenerationStatus,
        wall_clock: u64,
        total_task: u64,
    ) -> Vec<TaskPatch> {
        let mut patches = self.sequence_status_patches(index, sequence, target);
        patches.push(TaskPatch::sequence(index, SequencePatch::SetWallClock(wall_clock)));
        patches.push(TaskPatch::sequence(index, SequencePatch::SetTotalTask(total_task)));
        patches
    }

    /// Cancel every step of a sequence that will not run because an earlier
    /// sequence failed.
    async fn skip_sequence(&self, index: usize) {
        let Some(sequence) = self.sequence_snapshot(index) else {
            return;
        };

        let mut batch = self.cancel_steps_patches(index, &sequence);
        batch.extend(self.sequence_status_patches(index, &sequence, GenerationStatus::Cancelled));
        self.commit(batch).await;
        log_sequence_operation(
            "skip",
            &self.task_id,
            &sequence.id,
            index,
            "cancelled",
            Some("prior sequence failed"),
        );

        let skipped = self.sequence_snapshot(index).unwrap_or(sequence);
        if let Err(message) = self
            .notify(
                "on_sequence_skip",
                self.executor
                    .observer
                    .on_sequence_skip(&self.task_id, &skipped, index),
            )
            .await
        {
            self.record_observer_failure(message, Some(skipped.id), None)
                .await;
        }
    }

    /// Fail a sequence whose start hook refused it. None of its steps run.
    async fn abort_sequence(&self, index: usize, sequence: &Sequence, message: String) {
        let mut batch = self.cancel_steps_patches(index, sequence);
        batch.extend(self.sequence_status_patches(index, sequence, GenerationStatus::Failed));
        batch.push(TaskPatch::AppendAnnotation(
            Annotation::error(message.clone()).for_sequence(sequence.id),
        ));
        self.commit(batch).await;
        log_sequence_operation(
            "abort",
            &self.task_id,
            &sequence.id,
            index,
            "failed",
            Some(&message),
        );
    }

    fn cancel_steps_patches(&self, index: usize, sequence: &Sequence) -> Vec<TaskPatch> {
        let mut patches = Vec::new();
        if !sequence.steps.is_empty() {
            patches.extend(TaskPatch::move_steps(
                StepBucket::Queued,
                StepBucket::Cancelled,
                sequence.step_count(),
            ));
        }
        for (step_index, step) in sequence.steps.iter().enumerate() {
            patches.extend(self.step_status_patches(
                index,
                step_index,
                sequence.id,
                step,
                GenerationStatus::Cancelled,
            ));
        }
        patches
    }

    async fn run_step(
        &self,
        sequence_index: usize,
        step_index: usize,
        sequence_id: SequenceId,
    ) -> StepOutcome {
        let _permit = match &self.executor.step_semaphore {
            Some(semaphore) => semaphore.acquire().await.ok(),
            None => None,
        };

        let Some(step) = self.step_snapshot(sequence_index, step_index) else {
            error!(task_id = %self.task_id, sequence_index, step_index, "Step vanished from working copy");
            return StepOutcome {
                failed: true,
                duration: 0,
            };
        };

        let mut batch = TaskPatch::move_steps(StepBucket::Queued, StepBucket::InProgress, 1).to_vec();
        batch.extend(self.step_status_patches(
            sequence_index,
            step_index,
            sequence_id,
            &step,
            GenerationStatus::Running,
        ));
        self.commit(batch).await;
        log_step_operation("start", &self.task_id, &step.id, &step.name, "running", None);

        let running = self
            .step_snapshot(sequence_index, step_index)
            .unwrap_or_else(|| step.clone());
        if let Err(message) = self
            .notify(
                "on_step_start",
                self.executor
                    .observer
                    .on_step_start(&self.task_id, &sequence_id, &running),
            )
            .await
        {
            let failure = GenerationFailure::new(message).with_code("observer");
            return self
                .fail_step(sequence_index, step_index, sequence_id, failure, 0, Usage::default())
                .await;
        }

        let started = Instant::now();
        let outcome = self.dispatch(&step.generation_id).await;
        let elapsed = elapsed_ms(started);

        match outcome {
            Ok(report) => {
                self.complete_step(sequence_index, step_index, sequence_id, report, elapsed)
                    .await
            }
            Err(failure) => {
                self.fail_step(
                    sequence_index,
                    step_index,
                    sequence_id,
                    failure,
                    elapsed,
                    Usage::default(),
                )
                .await
            }
        }
    }

    async fn complete_step(
        &self,
        sequence_index: usize,
        step_index: usize,
        sequence_id: SequenceId,
        report: GenerationReport,
        elapsed: u64,
    ) -> StepOutcome {
        let duration = report.duration_ms.unwrap_or(elapsed);
        let Some(step) = self.step_snapshot(sequence_index, step_index) else {
            return StepOutcome {
                failed: true,
                duration,
            };
        };

        let mut batch = TaskPatch::move_steps(StepBucket::InProgress, StepBucket::Completed, 1).to_vec();
        batch.extend(self.step_status_patches(
            sequence_index,
            step_index,
            sequence_id,
            &step,
            GenerationStatus::Completed,
        ));
        batch.extend(self.duration_and_usage_patches(sequence_index, step_index, duration, report.usage));

        let mut projected = step.clone();
        for patch in &batch {
            if let TaskPatch::Sequence {
                index,
                patch: SequencePatch::Step { index: step, patch },
            } = patch
            {
                let path = PatchPath::root("sequences").index(*index).key("steps").index(*step);
                if let Err(error) = patch.apply_to(&mut projected, path) {
                    debug!(task_id = %self.task_id, error = %error, "Projection skipped patch");
                }
            }
        }
        if let Err(message) = self
            .notify(
                "on_step_complete",
                self.executor.observer.on_step_complete(
                    &self.task_id,
                    &sequence_id,
                    &projected,
                    &report,
                ),
            )
            .await
        {
            let failure = GenerationFailure::new(message).with_code("observer");
            return self
                .fail_step(
                    sequence_index,
                    step_index,
                    sequence_id,
                    failure,
                    duration,
                    report.usage,
                )
                .await;
        }

        self.commit(batch).await;
        log_step_operation(
            "complete",
            &self.task_id,
            &step.id,
            &step.name,
            "completed",
            None,
        );

        StepOutcome {
            failed: false,
            duration,
        }
    }

    async fn fail_step(
        &self,
        sequence_index: usize,
        step_index: usize,
        sequence_id: SequenceId,
        failure: GenerationFailure,
        duration: u64,
        usage: Usage,
    ) -> StepOutcome {
        let Some(step) = self.step_snapshot(sequence_index, step_index) else {
            return StepOutcome {
                failed: true,
                duration,
            };
        };

        let mut batch = TaskPatch::move_steps(StepBucket::InProgress, StepBucket::Failed, 1).to_vec();
        batch.extend(self.step_status_patches(
            sequence_index,
            step_index,
            sequence_id,
            &step,
            GenerationStatus::Failed,
        ));
        batch.extend(self.duration_and_usage_patches(sequence_index, step_index, duration, usage));
        batch.push(TaskPatch::AppendAnnotation(
            Annotation::error(failure.message.clone()).for_step(sequence_id, step.id),
        ));
        self.commit(batch).await;
        log_step_operation(
            "fail",
            &self.task_id,
            &step.id,
            &step.name,
            "failed",
            Some(&failure.to_string()),
        );

        let failed = self
            .step_snapshot(sequence_index, step_index)
            .unwrap_or(step);
        if let Err(message) = self
            .notify(
                "on_step_error",
                self.executor
                    .observer
                    .on_step_error(&self.task_id, &sequence_id, &failed, &failure),
            )
            .await
        {
            self.record_observer_failure(message, Some(sequence_id), Some(failed.id))
                .await;
        }

        StepOutcome {
            failed: true,
            duration,
        }
    }

    fn duration_and_usage_patches(
        &self,
        sequence_index: usize,
        step_index: usize,
        duration: u64,
        usage: Usage,
    ) -> Vec<TaskPatch> {
        let mut patches = vec![TaskPatch::step(
            sequence_index,
            step_index,
            StepPatch::SetDuration(duration),
        )];
        if !usage.is_zero() {
            patches.extend([
                TaskPatch::step(sequence_index, step_index, StepPatch::AddUsage(usage)),
                TaskPatch::sequence(sequence_index, SequencePatch::AddUsage(usage)),
                TaskPatch::AddUsage(usage),
            ]);
        }
        patches
    }

    /// Start one generation and wait for its outcome. Every way a driver can
    /// misbehave comes back as a [`GenerationFailure`].
    async fn dispatch(&self, generation_id: &GenerationId) -> Result<GenerationReport, GenerationFailure> {
        let generation = async {
            let (handle, receiver) = GenerationHandle::channel(generation_id.clone());
            let started = AssertUnwindSafe(
                self.executor
                    .driver
                    .start_generation(generation_id, handle),
            )
            .catch_unwind()
            .await;

            match started {
                Ok(Ok(())) => {}
                Ok(Err(error)) => return Err(GenerationFailure::from(error)),
                Err(panic) => {
                    return Err(GenerationFailure::new(format!(
                        "generation driver panicked: {}",
                        panic_message(panic.as_ref())
                    ))
                    .with_code("panic"))
                }
            }

            receiver.await.unwrap_or_else(|_| {
                Err(GenerationFailure::new("generation handle dropped without a result")
                    .with_code("dropped"))
            })
        };

        match self.executor.config.generation_timeout() {
            Some(limit) => tokio::time::timeout(limit, generation)
                .await
                .unwrap_or_else(|_| {
                    Err(GenerationFailure::new(format!(
                        "generation timed out after {}ms",
                        limit.as_millis()
                    ))
                    .with_code("timeout"))
                }),
            None => generation.await,
        }
    }

    /// Run an observer hook, turning an error or a panic into a message.
    async fn notify<F>(&self, hook: &'static str, call: F) -> Result<(), String>
    where
        F: Future<Output = anyhow::Result<()>>,
    {
        match AssertUnwindSafe(call).catch_unwind().await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(error)) => {
                warn!(task_id = %self.task_id, hook, error = %error, "Lifecycle observer failed");
                Err(format!("{hook} failed: {error:#}"))
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                warn!(task_id = %self.task_id, hook, panic = %message, "Lifecycle observer panicked");
                Err(format!("{hook} panicked: {message}"))
            }
        }
    }

    async fn record_observer_failure(
        &self,
        message: String,
        sequence_id: Option<SequenceId>,
        step_id: Option<StepId>,
    ) {
        self.task_failed.store(true, Ordering::SeqCst);
        let mut annotation = Annotation::error(message);
        annotation.sequence_id = sequence_id;
        annotation.step_id = step_id;
        self.commit(vec![TaskPatch::AppendAnnotation(annotation)]).await;
    }

    /// Apply a batch to the working copy and ship it to the sink as one call.
    async fn commit(&self, patches: Vec<TaskPatch>) {
        if patches.is_empty() {
            return;
        }

        let lowered = {
            let mut working = self.working.lock();
            let mut applied = Vec::with_capacity(patches.len());
            for patch in patches {
                match patch.apply_to(&mut working) {
                    Ok(()) => applied.push(patch),
                    Err(error) => {
                        error!(task_id = %self.task_id, error = %error, "Working copy rejected patch");
                        self.commit_failed.store(true, Ordering::SeqCst);
                    }
                }
            }
            lower_all(&applied)
        };

        let wire = match lowered {
            Ok(wire) if wire.is_empty() => return,
            Ok(wire) => wire,
            Err(error) => {
                error!(task_id = %self.task_id, error = %error, "Failed to lower patch batch");
                self.commit_failed.store(true, Ordering::SeqCst);
                return;
            }
        };

        debug!(task_id = %self.task_id, patches = wire.len(), "Committing patch batch");
        if let Err(error) = self.executor.sink.apply_patches(&self.task_id, wire).await {
            error!(task_id = %self.task_id, error = %error, "Patch sink rejected batch");
            self.commit_failed.store(true, Ordering::SeqCst);
        }
    }

    fn task_status_patches(&self, from: TaskStatus, to: TaskStatus) -> Vec<TaskPatch> {
        if from == to {
            return Vec::new();
        }
        if is_valid_task_transition(from, to) {
            return vec![TaskPatch::SetStatus(to)];
        }
        let message = format!("Skipped illegal task transition from {from} to {to}");
        warn!(task_id = %self.task_id, %from, %to, "Skipped illegal task transition");
        vec![TaskPatch::AppendAnnotation(Annotation::warning(message))]
    }

    fn sequence_status_patches(
        &self,
        index: usize,
        sequence: &Sequence,
        to: GenerationStatus,
    ) -> Vec<TaskPatch> {
        match sequence.status.path_to(to) {
            Some(hops) => hops
                .into_iter()
                .map(|status| TaskPatch::sequence(index, SequencePatch::SetStatus(status)))
                .collect(),
            None => {
                let from = sequence.status;
                warn!(task_id = %self.task_id, sequence_id = %sequence.id, %from, %to, "Skipped illegal sequence transition");
                vec![TaskPatch::AppendAnnotation(
                    Annotation::warning(format!(
                        "Skipped illegal sequence transition from {from} to {to}"
                    ))
                    .for_sequence(sequence.id),
                )]
            }
        }
    }

    fn step_status_patches(
        &self,
        sequence_index: usize,
        step_index: usize,
        sequence_id: SequenceId,
        step: &Step,
        to: GenerationStatus,
    ) -> Vec<TaskPatch> {
        match step.status.path_to(to) {
            Some(hops) => hops
                .into_iter()
                .map(|status| TaskPatch::step(sequence_index, step_index, StepPatch::SetStatus(status)))
                .collect(),
            None => {
                let from = step.status;
                warn!(task_id = %self.task_id, step_id = %step.id, %from, %to, "Skipped illegal step transition");
                vec![TaskPatch::AppendAnnotation(
                    Annotation::warning(format!(
                        "Skipped illegal step transition from {from} to {to}"
                    ))
                    .for_step(sequence_id, step.id),
                )]
            }
        }
    }

    /// Working copy with `patches` applied, without committing them.
    fn project(&self, patches: &[TaskPatch]) -> Task {
        let mut projected = self.task_snapshot();
        for patch in patches {
            if let Err(error) = patch.apply_to(&mut projected) {
                debug!(task_id = %self.task_id, error = %error, "Projection skipped patch");
            }
        }
        projected
    }

    fn task_snapshot(&self) -> Task {
        self.working.lock().clone()
    }

    fn sequence_snapshot(&self, index: usize) -> Option<Sequence> {
        self.working.lock().sequences.get(index).cloned()
    }

    fn step_snapshot(&self, sequence_index: usize, step_index: usize) -> Option<Step> {
        self.working
            .lock()
            .sequences
            .get(sequence_index)
            .and_then(|sequence| sequence.steps.get(step_index))
            .cloned()
    }
}

fn settle_status(failed: bool) -> GenerationStatus {
    if failed {
        GenerationStatus::Failed
    } else {
        GenerationStatus::Completed
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_extraction() {
        let from_str: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(from_str.as_ref()), "static message");

        let from_string: Box<dyn Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(panic_message(from_string.as_ref()), "owned message");

        let opaque: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(opaque.as_ref()), "unknown panic payload");
    }

    #[test]
    fn test_settle_status() {
        assert_eq!(settle_status(true), GenerationStatus::Failed);
        assert_eq!(settle_status(false), GenerationStatus::Completed);
    }
}
