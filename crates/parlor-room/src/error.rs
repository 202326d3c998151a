//! Error types for the room layer.

use parlor_patch::PatchError;
use parlor_transport::ConnectionId;

/// Why a game engine refused a command.
///
/// Every variant is handled the same way: the command is dropped, state
/// stays as it was, nothing is broadcast, and a diagnostic is logged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The connection doesn't hold the seat (or room membership) the
    /// command requires.
    #[error("{0} is not a participant")]
    NotParticipant(ConnectionId),

    /// The command came from the side that isn't to move.
    #[error("it is not the turn of {0}")]
    OutOfTurn(ConnectionId),

    /// The command is well-formed but breaks a rule of the game.
    #[error("illegal action: {0}")]
    IllegalAction(String),

    /// An argument has the wrong shape, type, or range.
    #[error("malformed input: {0}")]
    MalformedInput(String),
}

impl CommandError {
    pub fn illegal(reason: impl Into<String>) -> Self {
        Self::IllegalAction(reason.into())
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedInput(reason.into())
    }
}

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No room with this name exists.
    #[error("room {0} not found")]
    NotFound(String),

    /// The connection is not an occupant of this room.
    #[error("{conn} is not in room {room}")]
    NotInRoom { conn: ConnectionId, room: String },

    /// A connection sits in at most one room per namespace.
    #[error("{conn} is already in room {room}")]
    AlreadyInOtherRoom { conn: ConnectionId, room: String },

    /// The game refused the command.
    #[error(transparent)]
    Rejected(#[from] CommandError),

    /// The new revision could not be turned into a patch.
    #[error(transparent)]
    Patch(#[from] PatchError),

    /// The namespace actor's command channel is closed.
    #[error("namespace {0} is unavailable")]
    Unavailable(String),
}
