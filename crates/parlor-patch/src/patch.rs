//! Patch data types and their wire shape.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One step of a path into a JSON document.
///
/// Serialized untagged: object keys are strings, array positions are
/// numbers, so a path looks like `["board", 12]` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Key(k) => write!(f, "{k}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_owned())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// The kind of edit a [`PatchOp`] performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Op {
    /// Insert a new object key, or insert into an array at the index.
    Add,
    /// Delete an object key or array element.
    Remove,
    /// Overwrite an existing value (the empty path replaces the root).
    Replace,
}

/// A single structural edit.
///
/// `value` is absent for [`Op::Remove`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOp {
    pub op: Op,
    pub path: Vec<PathSegment>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_value"
    )]
    pub value: Option<Value>,
}

/// A `null` value is still a value: only an absent field means "none".
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl PatchOp {
    pub fn add(path: Vec<PathSegment>, value: Value) -> Self {
        Self { op: Op::Add, path, value: Some(value) }
    }

    pub fn remove(path: Vec<PathSegment>) -> Self {
        Self { op: Op::Remove, path, value: None }
    }

    pub fn replace(path: Vec<PathSegment>, value: Value) -> Self {
        Self { op: Op::Replace, path, value: Some(value) }
    }

    /// Renders the path as `/a/0/b` for log lines.
    pub fn pointer(&self) -> String {
        self.path.iter().map(|seg| format!("/{seg}")).collect()
    }
}

/// An ordered list of edits taking one state revision to the next.
///
/// Order matters: ops must be replayed exactly as produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Patch(Vec<PatchOp>);

impl Patch {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, op: PatchOp) {
        self.0.push(op);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn ops(&self) -> &[PatchOp] {
        &self.0
    }
}

impl From<Vec<PatchOp>> for Patch {
    fn from(ops: Vec<PatchOp>) -> Self {
        Self(ops)
    }
}

impl IntoIterator for Patch {
    type Item = PatchOp;
    type IntoIter = std::vec::IntoIter<PatchOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
