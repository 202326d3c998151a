//! The `Game` trait: the extension point each game engine implements.
//!
//! The room layer calls these at the right time; the engine only writes
//! rules. All state changes happen on a draft inside
//! [`parlor_patch::mutate`], so an engine can return an error at any
//! point of `handle_command` without cleaning up after itself.

use std::fmt;

use parlor_transport::ConnectionId;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::CommandError;

/// A broadcast (not a patch) sent to a room's other occupants.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub event: &'static str,
    pub data: Value,
}

/// The core trait game engines implement.
///
/// - `State`: the full shared state of one room. Its JSON shape is what
///   clients hold a replica of and what patches address.
/// - `Command`: the game-specific commands, decoded from client frames.
///   Declare it with
///   `#[serde(tag = "event", content = "args", rename_all = "snake_case")]`
///   so frame arguments map onto variant fields.
pub trait Game: Send + Sync + 'static {
    type State: Clone + Serialize + fmt::Debug + Send + Sync + 'static;

    type Command: DeserializeOwned + fmt::Debug + Send + 'static;

    /// Builds the initial state of a room, at the moment `creator` joins
    /// a room name that doesn't exist yet.
    fn init(creator: ConnectionId) -> Self::State;

    /// Applies one command from `sender` to the room's draft state.
    ///
    /// Return `Err` to reject the command; the draft is discarded.
    fn handle_command(
        state: &mut Self::State,
        sender: ConnectionId,
        command: Self::Command,
    ) -> Result<(), CommandError>;

    /// Called on the draft state when `leaver` leaves a room that still
    /// has occupants (`remaining`, in join order). Two-seat games vacate
    /// the leaver's seat here. Default: no-op.
    fn on_leave(_state: &mut Self::State, _leaver: ConnectionId, _remaining: &[ConnectionId]) {}

    /// Called after a connection joins an existing room. A returned
    /// notice is broadcast to every occupant except the joiner.
    /// `occupants` includes the joiner. Default: no notice.
    fn join_notice(_state: &Self::State, _occupants: &[ConnectionId]) -> Option<Notice> {
        None
    }
}
