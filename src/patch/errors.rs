use serde_json::Value;
use thiserror::Error;

/// Failures raised by the patch engine. All of them indicate a malformed patch
/// built by the caller, never a runtime domain outcome.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatchError {
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Dangerous path '{path}': segment '{segment}' is not allowed")]
    DangerousPath { path: String, segment: String },

    #[error("Path not found: '{path}'")]
    PathNotFound { path: String },

    #[error("Type mismatch at '{path}': expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl PatchError {
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn type_mismatch(path: impl Into<String>, expected: &'static str, found: &Value) -> Self {
        Self::TypeMismatch {
            path: path.into(),
            expected,
            found: value_kind(found),
        }
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub type PatchResult<T> = Result<T, PatchError>;
