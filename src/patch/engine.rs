//! # Patch Engine
//!
//! Path-addressed, immutable document updates over `serde_json::Value`.
//!
//! [`apply`] never touches its input: it works on an owned copy and returns it,
//! so the caller's snapshot stays valid even when a later patch in the batch
//! fails. [`apply_in_place`] is the single-patch primitive used for working
//! copies; it resolves and type-checks the target before writing, so a failing
//! patch leaves the document exactly as it was.

use serde_json::{Number, Value};

use super::errors::{PatchError, PatchResult};
use super::path::{PatchPath, DANGEROUS_SEGMENTS};
use super::{Patch, PatchOp};

/// Apply `patches` left to right to a copy of `document`.
pub fn apply(document: &Value, patches: &[Patch]) -> PatchResult<Value> {
    let mut working = document.clone();
    for patch in patches {
        apply_in_place(&mut working, patch)?;
    }
    Ok(working)
}

/// Apply a single patch to `document` in place.
pub fn apply_in_place(document: &mut Value, patch: &Patch) -> PatchResult<()> {
    let target = resolve_mut(document, &patch.path)?;

    match &patch.op {
        PatchOp::Set(value) => {
            *target = value.clone();
        }
        PatchOp::Increment(delta) => {
            let updated = offset_number(target, delta, false, &patch.path)?;
            *target = Value::Number(updated);
        }
        PatchOp::Decrement(delta) => {
            let updated = offset_number(target, delta, true, &patch.path)?;
            *target = Value::Number(updated);
        }
        PatchOp::Push(values) => {
            let found = super::errors::value_kind(target);
            let items = target.as_array_mut().ok_or(PatchError::TypeMismatch {
                path: patch.path.to_string(),
                expected: "array",
                found,
            })?;
            items.extend(values.iter().cloned());
        }
    }

    Ok(())
}

/// Read-only lookup with the same addressing rules as [`apply_in_place`].
pub fn get<'a>(document: &'a Value, path: &PatchPath) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(document, |current, segment| match current {
            Value::Object(map) => map.get(segment.as_key().as_ref()),
            Value::Array(items) => segment.as_index().and_then(|i| items.get(i)),
            _ => None,
        })
}

fn resolve_mut<'a>(document: &'a mut Value, path: &PatchPath) -> PatchResult<&'a mut Value> {
    let mut current = document;

    for segment in path.segments() {
        let key = segment.as_key();
        if DANGEROUS_SEGMENTS.contains(&key.as_ref()) {
            return Err(PatchError::DangerousPath {
                path: path.to_string(),
                segment: key.into_owned(),
            });
        }

        current = match current {
            Value::Object(map) => map.get_mut(key.as_ref()),
            Value::Array(items) => segment.as_index().and_then(move |i| items.get_mut(i)),
            _ => None,
        }
        .ok_or_else(|| PatchError::PathNotFound {
            path: path.to_string(),
        })?;
    }

    Ok(current)
}

fn offset_number(
    target: &Value,
    delta: &Number,
    negate: bool,
    path: &PatchPath,
) -> PatchResult<Number> {
    let current = match target {
        Value::Number(n) => n,
        other => return Err(PatchError::type_mismatch(path.to_string(), "number", other)),
    };

    // Integers stay integers so counters round-trip into unsigned fields.
    if let (Some(a), Some(b)) = (current.as_i64(), delta.as_i64()) {
        let b = if negate { b.checked_neg() } else { Some(b) };
        if let Some(sum) = b.and_then(|b| a.checked_add(b)) {
            return Ok(Number::from(sum));
        }
    }
    if let (Some(a), Some(b)) = (current.as_u64(), delta.as_u64()) {
        let sum = if negate { a.checked_sub(b) } else { a.checked_add(b) };
        if let Some(sum) = sum {
            return Ok(Number::from(sum));
        }
    }

    let (a, b) = match (current.as_f64(), delta.as_f64()) {
        (Some(a), Some(b)) => (a, b),
        _ => return Err(PatchError::type_mismatch(path.to_string(), "number", target)),
    };
    let sum = if negate { a - b } else { a + b };
    Number::from_f64(sum).ok_or_else(|| PatchError::TypeMismatch {
        path: path.to_string(),
        expected: "finite number",
        found: "non-finite result",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Value {
        json!({
            "status": "created",
            "steps": { "queued": 3, "inProgress": 0 },
            "usage": { "input": 1.5 },
            "annotations": [],
            "sequences": [
                { "status": "queued", "steps": [ { "status": "queued" } ] }
            ]
        })
    }

    #[test]
    fn test_empty_patch_list_returns_equal_copy() {
        let original = doc();
        let copy = apply(&original, &[]).unwrap();
        assert_eq!(copy, original);
        assert!(!std::ptr::eq(&copy, &original));
    }

    #[test]
    fn test_patches_apply_in_order() {
        let original = doc();
        let patches = vec![
            Patch::set("status", json!("inProgress")).unwrap(),
            Patch::decrement("steps.queued", 1).unwrap(),
            Patch::increment("steps.inProgress", 1).unwrap(),
            Patch::increment("steps.inProgress", 1).unwrap(),
            Patch::set("sequences[0].steps[0].status", json!("running")).unwrap(),
            Patch::push("annotations", vec![json!({"level": "info"})]).unwrap(),
        ];

        let updated = apply(&original, &patches).unwrap();
        assert_eq!(updated["status"], "inProgress");
        assert_eq!(updated["steps"]["queued"], 2);
        assert_eq!(updated["steps"]["inProgress"], 2);
        assert_eq!(updated["sequences"][0]["steps"][0]["status"], "running");
        assert_eq!(updated["annotations"].as_array().unwrap().len(), 1);

        // Input untouched.
        assert_eq!(original, doc());
    }

    #[test]
    fn test_integer_counters_stay_integers() {
        let updated = apply(&doc(), &[Patch::increment("steps.queued", 2).unwrap()]).unwrap();
        assert!(updated["steps"]["queued"].is_u64());
        assert_eq!(updated["steps"]["queued"].as_u64(), Some(5));
    }

    #[test]
    fn test_counters_above_i64_range_stay_exact() {
        let mut document = doc();
        document["steps"]["queued"] = json!(u64::MAX - 10);

        let updated = apply(&document, &[Patch::increment("steps.queued", 5u64).unwrap()]).unwrap();
        assert!(updated["steps"]["queued"].is_u64());
        assert_eq!(updated["steps"]["queued"].as_u64(), Some(u64::MAX - 5));

        let updated = apply(&updated, &[Patch::decrement("steps.queued", u64::MAX - 7).unwrap()]).unwrap();
        assert_eq!(updated["steps"]["queued"].as_u64(), Some(2));

        let updated = apply(&doc(), &[Patch::increment("steps.queued", u64::MAX - 3).unwrap()]).unwrap();
        assert_eq!(updated["steps"]["queued"].as_u64(), Some(u64::MAX));
    }

    #[test]
    fn test_float_increment() {
        let updated = apply(&doc(), &[Patch::increment("usage.input", 1).unwrap()]).unwrap();
        assert_eq!(updated["usage"]["input"].as_f64(), Some(2.5));
    }

    #[test]
    fn test_type_mismatches() {
        let err = apply(&doc(), &[Patch::increment("status", 1).unwrap()]).unwrap_err();
        assert!(matches!(
            err,
            PatchError::TypeMismatch {
                expected: "number",
                found: "string",
                ..
            }
        ));

        let err = apply(&doc(), &[Patch::push("steps", vec![json!(1)]).unwrap()]).unwrap_err();
        assert!(matches!(err, PatchError::TypeMismatch { expected: "array", .. }));
    }

    #[test]
    fn test_path_not_found() {
        for raw in ["missing", "steps.missing", "sequences[4].status", "status.inner"] {
            let err = apply(&doc(), &[Patch::set(raw, json!(1)).unwrap()]).unwrap_err();
            assert!(matches!(err, PatchError::PathNotFound { .. }), "{raw}");
        }
    }

    #[test]
    fn test_failed_batch_leaves_input_untouched() {
        let original = doc();
        let patches = vec![
            Patch::set("status", json!("inProgress")).unwrap(),
            Patch::increment("status", 1).unwrap(),
        ];
        assert!(apply(&original, &patches).is_err());
        assert_eq!(original["status"], "created");
    }

    #[test]
    fn test_failed_in_place_patch_is_not_partial() {
        let mut working = doc();
        let before = working.clone();
        let err = apply_in_place(&mut working, &Patch::push("status", vec![json!(1)]).unwrap());
        assert!(err.is_err());
        assert_eq!(working, before);
    }

    #[test]
    fn test_get() {
        let document = doc();
        let path = PatchPath::parse("sequences[0].steps.0.status").unwrap();
        assert_eq!(get(&document, &path), Some(&json!("queued")));
        let missing = PatchPath::parse("sequences[3]").unwrap();
        assert_eq!(get(&document, &missing), None);
    }
}
