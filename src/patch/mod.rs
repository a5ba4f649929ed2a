//! # Patches
//!
//! The patch protocol is both the executor's mutation log and the wire format
//! to persistence and live streams. A [`Patch`] addresses a location in a JSON
//! document by path and carries one of four operations; on the wire it is
//! `{"path": "...", "set": v}`, `{"path": "...", "increment": n}`,
//! `{"path": "...", "decrement": n}` or `{"path": "...", "push": [..]}`.
//!
//! - [`engine`]: generic application of wire patches to a document
//! - [`typed`]: closed descriptors for the task tree, lowered to wire patches
//! - [`step_counts`]: paired bucket moves for the six-bucket step counter

pub mod engine;
pub mod errors;
pub mod path;
pub mod step_counts;
pub mod typed;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

pub use engine::{apply, apply_in_place};
pub use errors::{PatchError, PatchResult};
pub use path::{PatchPath, PathSegment};
pub use step_counts::move_patches;
pub use typed::{lower_all, SequencePatch, StepPatch, TaskPatch};

/// A single path-addressed mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    pub path: PatchPath,
    #[serde(flatten)]
    pub op: PatchOp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Set(Value),
    Increment(Number),
    Decrement(Number),
    Push(Vec<Value>),
}

impl PatchOp {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Set(_) => "set",
            Self::Increment(_) => "increment",
            Self::Decrement(_) => "decrement",
            Self::Push(_) => "push",
        }
    }
}

impl Patch {
    pub fn new(path: PatchPath, op: PatchOp) -> Self {
        Self { path, op }
    }

    pub fn set(path: &str, value: impl Into<Value>) -> PatchResult<Self> {
        Ok(Self::new(PatchPath::parse(path)?, PatchOp::Set(value.into())))
    }

    pub fn increment(path: &str, by: impl Into<Number>) -> PatchResult<Self> {
        Ok(Self::new(PatchPath::parse(path)?, PatchOp::Increment(by.into())))
    }

    pub fn decrement(path: &str, by: impl Into<Number>) -> PatchResult<Self> {
        Ok(Self::new(PatchPath::parse(path)?, PatchOp::Decrement(by.into())))
    }

    pub fn push(path: &str, values: Vec<Value>) -> PatchResult<Self> {
        Ok(Self::new(PatchPath::parse(path)?, PatchOp::Push(values)))
    }
}
