//! Structural diff between two JSON documents.

use serde_json::{Map, Value};

use crate::{Patch, PatchOp, PathSegment};

/// Computes the edits that turn `before` into `after`.
///
/// - Objects are compared key by key: vanished keys become `remove`,
///   new keys become `add`, shared keys are diffed recursively.
/// - Arrays are compared position by position over the shared prefix.
///   Extra trailing elements in `after` are appended with `add`; extra
///   trailing elements in `before` are removed from the back, highest
///   index first, so every index is still valid when its op is replayed.
/// - Anything else that differs (scalars, or a change of JSON type) is a
///   single `replace` of that node.
///
/// Equal documents produce an empty patch.
pub fn diff(before: &Value, after: &Value) -> Patch {
    let mut patch = Patch::new();
    let mut path = Vec::new();
    diff_node(before, after, &mut path, &mut patch);
    patch
}

fn diff_node(
    before: &Value,
    after: &Value,
    path: &mut Vec<PathSegment>,
    patch: &mut Patch,
) {
    if before == after {
        return;
    }
    match (before, after) {
        (Value::Object(old), Value::Object(new)) => {
            diff_object(old, new, path, patch);
        }
        (Value::Array(old), Value::Array(new)) => {
            diff_array(old, new, path, patch);
        }
        _ => patch.push(PatchOp::replace(path.clone(), after.clone())),
    }
}

fn diff_object(
    old: &Map<String, Value>,
    new: &Map<String, Value>,
    path: &mut Vec<PathSegment>,
    patch: &mut Patch,
) {
    for key in old.keys() {
        if !new.contains_key(key) {
            path.push(PathSegment::Key(key.clone()));
            patch.push(PatchOp::remove(path.clone()));
            path.pop();
        }
    }
    for (key, new_value) in new {
        path.push(PathSegment::Key(key.clone()));
        match old.get(key) {
            Some(old_value) => diff_node(old_value, new_value, path, patch),
            None => patch.push(PatchOp::add(path.clone(), new_value.clone())),
        }
        path.pop();
    }
}

fn diff_array(
    old: &[Value],
    new: &[Value],
    path: &mut Vec<PathSegment>,
    patch: &mut Patch,
) {
    let shared = old.len().min(new.len());
    for i in 0..shared {
        path.push(PathSegment::Index(i));
        diff_node(&old[i], &new[i], path, patch);
        path.pop();
    }
    for (i, value) in new.iter().enumerate().skip(shared) {
        path.push(PathSegment::Index(i));
        patch.push(PatchOp::add(path.clone(), value.clone()));
        path.pop();
    }
    for i in (shared..old.len()).rev() {
        path.push(PathSegment::Index(i));
        patch.push(PatchOp::remove(path.clone()));
        path.pop();
    }
}
