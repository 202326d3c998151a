//! Error types for the patch layer.

/// Errors from diffing or replaying patches.
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    /// A state could not be converted to (or from) its JSON shape.
    #[error("state snapshot failed: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// A path segment did not resolve against the document.
    #[error("path {path} does not resolve: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// An `add` or `replace` op arrived without a value.
    #[error("op at {0} carries no value")]
    MissingValue(String),
}

/// Outcome of a failed [`mutate`](crate::mutate) call.
#[derive(Debug, thiserror::Error)]
pub enum MutateError<E> {
    /// The mutation closure refused the change. The caller's state is
    /// untouched.
    #[error("mutation rejected: {0}")]
    Rejected(E),

    /// The mutation succeeded but the state could not be snapshotted.
    #[error(transparent)]
    Patch(#[from] PatchError),
}
