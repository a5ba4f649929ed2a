//! Scripted generation driver for executor tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use taskflow_core::models::{GenerationId, Usage};
use taskflow_core::orchestration::{
    GenerationDriver, GenerationError, GenerationFailure, GenerationHandle, GenerationReport,
};

use super::builders::generation_for;

/// What the driver does for one generation.
#[derive(Debug, Clone)]
pub enum Script {
    /// Resolve with a report after `delay_ms`.
    Complete {
        usage: Usage,
        duration_ms: Option<u64>,
        delay_ms: u64,
    },
    /// Keep the handle and resolve it from a spawned task after `delay_ms`.
    CompleteLater { usage: Usage, delay_ms: u64 },
    /// Resolve the handle with a failure.
    Fail(String),
    /// Return an error from `start_generation`.
    Error(String),
    /// Panic inside `start_generation`.
    Panic(String),
    /// Drop the handle without resolving it.
    DropHandle,
    /// Keep the handle alive forever.
    Hang,
}

impl Script {
    pub fn complete(input: u64, output: u64) -> Self {
        Self::Complete {
            usage: Usage::new(input, output),
            duration_ms: None,
            delay_ms: 0,
        }
    }

    pub fn complete_in(duration_ms: u64, input: u64, output: u64) -> Self {
        Self::Complete {
            usage: Usage::new(input, output),
            duration_ms: Some(duration_ms),
            delay_ms: 0,
        }
    }

    pub fn delayed(delay_ms: u64) -> Self {
        Self::Complete {
            usage: Usage::default(),
            duration_ms: None,
            delay_ms,
        }
    }

    pub fn fail(message: &str) -> Self {
        Self::Fail(message.to_string())
    }

    pub fn error(message: &str) -> Self {
        Self::Error(message.to_string())
    }
}

pub struct ScriptedDriver {
    default: Script,
    scripts: HashMap<GenerationId, Script>,
    calls: Mutex<Vec<GenerationId>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    parked: Mutex<Vec<GenerationHandle>>,
}

impl ScriptedDriver {
    /// Every generation completes immediately with zero usage.
    pub fn new() -> Self {
        Self::with_default(Script::complete(0, 0))
    }

    pub fn with_default(default: Script) -> Self {
        Self {
            default,
            scripts: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            parked: Mutex::new(Vec::new()),
        }
    }

    /// Script the generation of the step named `step_name`.
    pub fn script(mut self, step_name: &str, script: Script) -> Self {
        self.scripts.insert(generation_for(step_name), script);
        self
    }

    pub fn calls(&self) -> Vec<GenerationId> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn was_called_for(&self, step_name: &str) -> bool {
        self.calls.lock().contains(&generation_for(step_name))
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Default for ScriptedDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationDriver for ScriptedDriver {
    async fn start_generation(
        &self,
        generation_id: &GenerationId,
        handle: GenerationHandle,
    ) -> Result<(), GenerationError> {
        self.calls.lock().push(generation_id.clone());
        let script = self
            .scripts
            .get(generation_id)
            .cloned()
            .unwrap_or_else(|| self.default.clone());

        match script {
            Script::Complete {
                usage,
                duration_ms,
                delay_ms,
            } => {
                self.enter();
                if delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                self.exit();
                let mut report = GenerationReport::new(usage);
                report.duration_ms = duration_ms;
                handle.complete(report);
                Ok(())
            }
            Script::CompleteLater { usage, delay_ms } => {
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    handle.complete(GenerationReport::new(usage));
                });
                Ok(())
            }
            Script::Fail(message) => {
                handle.fail(GenerationFailure::new(message));
                Ok(())
            }
            Script::Error(message) => Err(GenerationError::Dispatch {
                generation_id: generation_id.clone(),
                message,
            }),
            Script::Panic(message) => panic!("{message}"),
            Script::DropHandle => {
                drop(handle);
                Ok(())
            }
            Script::Hang => {
                self.parked.lock().push(handle);
                Ok(())
            }
        }
    }
}
