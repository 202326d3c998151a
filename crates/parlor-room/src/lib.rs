//! Room lifecycle management for Parlor.
//!
//! A room is a named container binding one shared game state to the
//! connections looking at it. Rooms are created by the first `join` and
//! destroyed the moment their last occupant leaves.
//!
//! Each installed game runs as one namespace actor (a Tokio task) that
//! owns that game's [`RoomRegistry`] and processes every frame for the
//! game one at a time, in arrival order. State changes go through
//! [`parlor_patch::mutate`], so each accepted command produces exactly
//! one revision and one patch, and a rejected command changes nothing.
//!
//! # Key types
//!
//! - [`Game`]: the trait each game engine implements
//! - [`RoomRegistry`]: join/leave/snapshot/command over named rooms
//! - [`NamespaceHandle`]: send connection events and frames to a running
//!   namespace actor
//! - [`CommandError`]: why a game refused a command

mod actor;
mod error;
mod game;
mod registry;

pub use actor::{FrameSender, NamespaceHandle, NamespaceInfo, spawn_namespace};
pub use error::{CommandError, RoomError};
pub use game::{Game, Notice};
pub use registry::{Departure, JoinOutcome, RoomRegistry};
