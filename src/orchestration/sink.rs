//! # Patch Sinks
//!
//! Where committed patch batches go. The executor calls
//! [`PatchSink::apply_patches`] once per logical event with the lowered wire
//! patches for that event.
//!
//! - [`InMemoryTaskStore`]: reference persistence over JSON documents
//! - [`RecordingSink`]: ordered patch log for replay and audit
//! - [`SerializedPatchSink`]: per-task single-writer actor in front of any sink

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::config::SinkConfig;
use crate::models::{Task, TaskId};
use crate::patch::{self, Patch, PatchError, PatchResult};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SinkError {
    #[error("Unknown task: {0}")]
    UnknownTask(TaskId),
    #[error("Patch rejected: {0}")]
    Patch(#[from] PatchError),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Sink closed: {0}")]
    Closed(String),
    #[error("Sink backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait PatchSink: Send + Sync {
    async fn apply_patches(&self, task_id: &TaskId, patches: Vec<Patch>) -> Result<(), SinkError>;

    /// Called once after the last batch of a run has been committed.
    async fn finish(&self, _task_id: &TaskId) {}
}

/// Task documents held as JSON and updated through the generic patch engine.
/// A batch either applies completely or not at all.
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    documents: DashMap<TaskId, Value>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, task: &Task) -> Result<(), SinkError> {
        let document =
            serde_json::to_value(task).map_err(|e| SinkError::Serialization(e.to_string()))?;
        self.documents.insert(task.id, document);
        Ok(())
    }

    pub fn document(&self, task_id: &TaskId) -> Option<Value> {
        self.documents.get(task_id).map(|doc| doc.value().clone())
    }

    /// Typed read-back of a stored document.
    pub fn task(&self, task_id: &TaskId) -> Result<Task, SinkError> {
        let document = self
            .document(task_id)
            .ok_or(SinkError::UnknownTask(*task_id))?;
        serde_json::from_value(document).map_err(|e| SinkError::Serialization(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl PatchSink for InMemoryTaskStore {
    async fn apply_patches(&self, task_id: &TaskId, patches: Vec<Patch>) -> Result<(), SinkError> {
        let mut entry = self
            .documents
            .get_mut(task_id)
            .ok_or(SinkError::UnknownTask(*task_id))?;
        let updated = patch::apply(entry.value(), &patches)?;
        *entry.value_mut() = updated;
        Ok(())
    }
}

/// Keeps every batch it receives, in arrival order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    batches: Mutex<Vec<(TaskId, Vec<Patch>)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches(&self) -> Vec<(TaskId, Vec<Patch>)> {
        self.batches.lock().clone()
    }

    /// All patches for one task, flattened in arrival order.
    pub fn patches_for(&self, task_id: &TaskId) -> Vec<Patch> {
        self.batches
            .lock()
            .iter()
            .filter(|(id, _)| id == task_id)
            .flat_map(|(_, batch)| batch.iter().cloned())
            .collect()
    }

    /// Rebuild a task document by applying its recorded log to `initial`.
    pub fn replay(&self, task_id: &TaskId, initial: &Value) -> PatchResult<Value> {
        patch::apply(initial, &self.patches_for(task_id))
    }

    pub fn batch_count(&self) -> usize {
        self.batches.lock().len()
    }
}

#[async_trait]
impl PatchSink for RecordingSink {
    async fn apply_patches(&self, task_id: &TaskId, patches: Vec<Patch>) -> Result<(), SinkError> {
        self.batches.lock().push((*task_id, patches));
        Ok(())
    }
}

struct WriteRequest {
    patches: Vec<Patch>,
    ack: oneshot::Sender<Result<(), SinkError>>,
}

/// Funnels every batch for a task through one writer task, so the inner sink
/// sees that task's batches strictly one at a time and in submission order.
///
/// Writers are spawned lazily per task and stop when [`finish`](PatchSink::finish)
/// or [`close`](Self::close) drops their queue.
pub struct SerializedPatchSink {
    inner: Arc<dyn PatchSink>,
    queue_capacity: usize,
    writers: DashMap<TaskId, mpsc::Sender<WriteRequest>>,
}

impl SerializedPatchSink {
    pub fn new(inner: Arc<dyn PatchSink>, config: &SinkConfig) -> Self {
        Self {
            inner,
            queue_capacity: config.queue_capacity.max(1),
            writers: DashMap::new(),
        }
    }

    /// Stop the writer for `task_id` once its queue drains.
    pub fn close(&self, task_id: &TaskId) {
        if self.writers.remove(task_id).is_some() {
            debug!(task_id = %task_id, "Closing serialized writer");
        }
    }

    pub fn active_writers(&self) -> usize {
        self.writers.len()
    }

    fn writer_for(&self, task_id: &TaskId) -> mpsc::Sender<WriteRequest> {
        self.writers
            .entry(*task_id)
            .or_insert_with(|| self.spawn_writer(*task_id))
            .clone()
    }

    fn spawn_writer(&self, task_id: TaskId) -> mpsc::Sender<WriteRequest> {
        let (sender, mut receiver) = mpsc::channel::<WriteRequest>(self.queue_capacity);
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            debug!(task_id = %task_id, "Serialized writer started");
            while let Some(request) = receiver.recv().await {
                let result = inner.apply_patches(&task_id, request.patches).await;
                if request.ack.send(result).is_err() {
                    warn!(task_id = %task_id, "Patch batch acknowledged after submitter went away");
                }
            }
            debug!(task_id = %task_id, "Serialized writer stopped");
        });

        sender
    }
}

impl std::fmt::Debug for SerializedPatchSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerializedPatchSink")
            .field("queue_capacity", &self.queue_capacity)
            .field("active_writers", &self.writers.len())
            .finish()
    }
}

#[async_trait]
impl PatchSink for SerializedPatchSink {
    async fn apply_patches(&self, task_id: &TaskId, patches: Vec<Patch>) -> Result<(), SinkError> {
        let writer = self.writer_for(task_id);
        let (ack, done) = oneshot::channel();

        writer
            .send(WriteRequest { patches, ack })
            .await
            .map_err(|_| SinkError::Closed(format!("writer for task {task_id} stopped")))?;

        done.await
            .map_err(|_| SinkError::Closed(format!("writer for task {task_id} dropped the batch")))?
    }

    async fn finish(&self, task_id: &TaskId) {
        self.close(task_id);
        self.inner.finish(task_id).await;
    }
}
