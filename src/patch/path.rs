//! Patch path model and parser.
//!
//! A path is an ordered list of object keys and array indices. Dot notation
//! (`sequences.0.status`) and bracket notation (`sequences[0].status`) are two
//! spellings of the same model and may be mixed freely.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::PatchError;

/// Segments that would reach into an object prototype in a JavaScript consumer
/// of the persisted document. Rejected at every depth, not only at the leaf.
pub const DANGEROUS_SEGMENTS: [&str; 3] = ["__proto__", "constructor", "prototype"];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    /// Key view of the segment, used when addressing into an object.
    pub fn as_key(&self) -> std::borrow::Cow<'_, str> {
        match self {
            Self::Key(key) => std::borrow::Cow::Borrowed(key.as_str()),
            Self::Index(index) => std::borrow::Cow::Owned(index.to_string()),
        }
    }

    /// Index view of the segment, used when addressing into an array.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Key(key) => key.parse().ok(),
            Self::Index(index) => Some(*index),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "{key}"),
            Self::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// Parsed, validated patch path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatchPath {
    segments: Vec<PathSegment>,
}

impl PatchPath {
    /// Parse a dot/bracket path string.
    pub fn parse(raw: &str) -> Result<Self, PatchError> {
        if raw.is_empty() {
            return Err(PatchError::invalid_path(raw, "path is empty"));
        }

        let mut segments = Vec::new();
        let mut key = String::new();
        let mut chars = raw.chars().peekable();
        // Set right after a closing bracket: the next char must be '.', '[' or end.
        let mut after_bracket = false;

        while let Some(c) = chars.next() {
            match c {
                '.' => {
                    if key.is_empty() && !after_bracket {
                        return Err(PatchError::invalid_path(raw, "empty segment"));
                    }
                    if !key.is_empty() {
                        segments.push(Self::key_segment(raw, std::mem::take(&mut key))?);
                    }
                    after_bracket = false;
                    if chars.peek().is_none() {
                        return Err(PatchError::invalid_path(raw, "trailing '.'"));
                    }
                }
                '[' => {
                    if !key.is_empty() {
                        segments.push(Self::key_segment(raw, std::mem::take(&mut key))?);
                    } else if segments.is_empty() {
                        return Err(PatchError::invalid_path(
                            raw,
                            "path cannot start with an index",
                        ));
                    }
                    let mut digits = String::new();
                    loop {
                        match chars.next() {
                            Some(']') => break,
                            Some(d) if d.is_ascii_digit() => digits.push(d),
                            Some(other) => {
                                return Err(PatchError::invalid_path(
                                    raw,
                                    format!("unexpected '{other}' inside brackets"),
                                ))
                            }
                            None => return Err(PatchError::invalid_path(raw, "unclosed '['")),
                        }
                    }
                    let index = digits
                        .parse::<usize>()
                        .map_err(|_| PatchError::invalid_path(raw, "empty or oversized index"))?;
                    segments.push(PathSegment::Index(index));
                    after_bracket = true;
                }
                ']' => return Err(PatchError::invalid_path(raw, "unmatched ']'")),
                other => {
                    if after_bracket {
                        return Err(PatchError::invalid_path(
                            raw,
                            "expected '.' or '[' after ']'",
                        ));
                    }
                    key.push(other);
                }
            }
        }

        if !key.is_empty() {
            segments.push(Self::key_segment(raw, key)?);
        }

        Ok(Self { segments })
    }

    /// Build a path from already separated segments, applying the same guards as
    /// [`PatchPath::parse`].
    pub fn from_segments(segments: Vec<PathSegment>) -> Result<Self, PatchError> {
        if segments.is_empty() {
            return Err(PatchError::invalid_path("", "path is empty"));
        }
        let path = Self { segments };
        for segment in &path.segments {
            if let PathSegment::Key(key) = segment {
                if key.is_empty() {
                    return Err(PatchError::invalid_path(path.to_string(), "empty segment"));
                }
                if DANGEROUS_SEGMENTS.contains(&key.as_str()) {
                    return Err(PatchError::DangerousPath {
                        path: path.to_string(),
                        segment: key.clone(),
                    });
                }
            }
        }
        Ok(path)
    }

    fn key_segment(raw: &str, key: String) -> Result<PathSegment, PatchError> {
        if DANGEROUS_SEGMENTS.contains(&key.as_str()) {
            return Err(PatchError::DangerousPath {
                path: raw.to_string(),
                segment: key,
            });
        }
        Ok(PathSegment::Key(key))
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Append a key segment. Callers building typed paths only pass static,
    /// known-safe keys.
    pub(crate) fn key(mut self, key: &str) -> Self {
        self.segments.push(PathSegment::Key(key.to_string()));
        self
    }

    pub(crate) fn index(mut self, index: usize) -> Self {
        self.segments.push(PathSegment::Index(index));
        self
    }

    pub(crate) fn root(key: &str) -> Self {
        Self {
            segments: vec![PathSegment::Key(key.to_string())],
        }
    }
}

impl fmt::Display for PatchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => write!(f, "{key}")?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl std::str::FromStr for PatchPath {
    type Err = PatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for PatchPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PatchPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
