//! State patches for Parlor.
//!
//! Every game keeps its authoritative state on the server and ships
//! *changes* to clients instead of full snapshots. This crate provides
//! the three pieces of that protocol:
//!
//! - [`diff`]: compares two JSON documents and returns the ordered list
//!   of structural edits ([`Patch`]) that turns the first into the second.
//! - [`apply`]: replays a patch against a document (what every client
//!   replica does on `apply_patches`).
//! - [`mutate`]: runs a mutation closure on a draft copy of a typed
//!   state and returns the new revision together with its patch. If the
//!   closure fails, nothing is produced and the caller keeps the old state.
//!
//! The law the rest of the server relies on:
//!
//! ```text
//! apply(diff(a, b), a) == b
//! ```

mod apply;
mod diff;
mod error;
mod mutate;
mod patch;

pub use apply::apply;
pub use diff::diff;
pub use error::{MutateError, PatchError};
pub use mutate::{Revision, mutate};
pub use patch::{Op, Patch, PatchOp, PathSegment};
