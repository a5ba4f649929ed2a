//! Paired bucket moves for the six-bucket step counter.
//!
//! Every change to `steps.*` goes through here: a decrement is always paired
//! with an equal increment, so the bucket sum never changes.

use serde_json::Number;

use super::path::PatchPath;
use super::{Patch, PatchOp};
use crate::models::StepBucket;

pub fn bucket_path(bucket: StepBucket) -> PatchPath {
    PatchPath::root("steps").key(bucket.field_name())
}

/// `[Decrement(steps.<from>, count), Increment(steps.<to>, count)]`
pub fn move_patches(from: StepBucket, to: StepBucket, count: u64) -> [Patch; 2] {
    [
        Patch::new(bucket_path(from), PatchOp::Decrement(Number::from(count))),
        Patch::new(bucket_path(to), PatchOp::Increment(Number::from(count))),
    ]
}
