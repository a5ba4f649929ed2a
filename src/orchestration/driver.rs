//! # Generation Driver Seam
//!
//! The executor never performs a generation itself. It hands each step's
//! [`GenerationId`] and a fresh [`GenerationHandle`] to a [`GenerationDriver`],
//! then waits for the handle to be resolved. The handle is consumed by
//! [`GenerationHandle::complete`] or [`GenerationHandle::fail`], so it resolves
//! at most once; dropping it unresolved counts as a failure.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::oneshot;

use super::types::{GenerationFailure, GenerationReport};
use crate::models::GenerationId;

pub(crate) type GenerationOutcome = Result<GenerationReport, GenerationFailure>;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GenerationError {
    #[error("Generation not found: {0}")]
    NotFound(GenerationId),
    #[error("Failed to start generation {generation_id}: {message}")]
    Dispatch {
        generation_id: GenerationId,
        message: String,
    },
}

impl From<GenerationError> for GenerationFailure {
    fn from(error: GenerationError) -> Self {
        let code = match &error {
            GenerationError::NotFound(_) => "not_found",
            GenerationError::Dispatch { .. } => "dispatch",
        };
        GenerationFailure::new(error.to_string()).with_code(code)
    }
}

/// Starts generations on behalf of the executor.
///
/// `start_generation` may resolve the handle before returning, or keep it and
/// resolve it later from another task. Returning an error, or panicking, fails
/// the step.
#[async_trait]
pub trait GenerationDriver: Send + Sync {
    async fn start_generation(
        &self,
        generation_id: &GenerationId,
        handle: GenerationHandle,
    ) -> Result<(), GenerationError>;
}

#[derive(Debug)]
pub struct GenerationHandle {
    generation_id: GenerationId,
    sender: oneshot::Sender<GenerationOutcome>,
}

impl GenerationHandle {
    pub(crate) fn channel(
        generation_id: GenerationId,
    ) -> (Self, oneshot::Receiver<GenerationOutcome>) {
        let (sender, receiver) = oneshot::channel();
        (
            Self {
                generation_id,
                sender,
            },
            receiver,
        )
    }

    pub fn generation_id(&self) -> &GenerationId {
        &self.generation_id
    }

    pub fn complete(self, report: GenerationReport) {
        self.resolve(Ok(report));
    }

    pub fn fail(self, failure: GenerationFailure) {
        self.resolve(Err(failure));
    }

    fn resolve(self, outcome: GenerationOutcome) {
        // The executor stops listening after a timeout.
        if self.sender.send(outcome).is_err() {
            tracing::debug!(
                generation_id = %self.generation_id,
                "Generation resolved after the executor stopped waiting"
            );
        }
    }
}
