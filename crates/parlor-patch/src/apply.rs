//! Replaying patches against a document.

use serde_json::Value;

use crate::{Op, PatchError, PatchOp, PathSegment, Patch};

/// Applies every op of `patch` to `doc`, in order.
///
/// On error the document may be partially patched; replicas that hit an
/// error should resynchronize with a full snapshot.
pub fn apply(doc: &mut Value, patch: &Patch) -> Result<(), PatchError> {
    for op in patch.ops() {
        apply_op(doc, op)?;
    }
    Ok(())
}

fn apply_op(doc: &mut Value, op: &PatchOp) -> Result<(), PatchError> {
    let Some((last, parents)) = op.path.split_last() else {
        // Empty path addresses the root itself.
        return match op.op {
            Op::Add | Op::Replace => {
                *doc = value_of(op)?;
                Ok(())
            }
            Op::Remove => Err(invalid(op, "cannot remove the root")),
        };
    };

    let mut parent = &mut *doc;
    for segment in parents {
        parent = step(parent, segment).ok_or_else(|| invalid(op, "missing parent"))?;
    }

    match (parent, last) {
        (Value::Object(map), PathSegment::Key(key)) => match op.op {
            Op::Add => {
                map.insert(key.clone(), value_of(op)?);
            }
            Op::Replace => {
                let slot = map
                    .get_mut(key)
                    .ok_or_else(|| invalid(op, "no such key"))?;
                *slot = value_of(op)?;
            }
            Op::Remove => {
                map.remove(key).ok_or_else(|| invalid(op, "no such key"))?;
            }
        },
        (Value::Array(items), PathSegment::Index(index)) => {
            let index = *index;
            match op.op {
                Op::Add => {
                    if index > items.len() {
                        return Err(invalid(op, "index past end"));
                    }
                    items.insert(index, value_of(op)?);
                }
                Op::Replace => {
                    let slot = items
                        .get_mut(index)
                        .ok_or_else(|| invalid(op, "index out of bounds"))?;
                    *slot = value_of(op)?;
                }
                Op::Remove => {
                    if index >= items.len() {
                        return Err(invalid(op, "index out of bounds"));
                    }
                    items.remove(index);
                }
            }
        }
        _ => return Err(invalid(op, "segment does not match container")),
    }
    Ok(())
}

fn step<'a>(node: &'a mut Value, segment: &PathSegment) -> Option<&'a mut Value> {
    match (node, segment) {
        (Value::Object(map), PathSegment::Key(key)) => map.get_mut(key),
        (Value::Array(items), PathSegment::Index(i)) => items.get_mut(*i),
        _ => None,
    }
}

fn value_of(op: &PatchOp) -> Result<Value, PatchError> {
    op.value
        .clone()
        .ok_or_else(|| PatchError::MissingValue(op.pointer()))
}

fn invalid(op: &PatchOp, reason: &'static str) -> PatchError {
    PatchError::InvalidPath { path: op.pointer(), reason }
}
