//! Room registry: creates, tracks, and tears down the rooms of one game.

use std::collections::HashMap;
use std::convert::Infallible;

use parlor_patch::{MutateError, Patch, mutate};
use parlor_transport::ConnectionId;

use crate::{CommandError, Game, Notice, RoomError};

/// One room: the shared state plus its occupants in join order.
#[derive(Debug)]
struct Room<S> {
    state: S,
    occupants: Vec<ConnectionId>,
}

/// What happened on a successful [`RoomRegistry::join`].
#[derive(Debug, Clone, PartialEq)]
pub enum JoinOutcome {
    /// The room didn't exist; it was created with the joiner alone in it.
    Created,
    /// The joiner was appended to an existing room. `notice`, if any, is
    /// for the other occupants.
    Joined { notice: Option<Notice> },
    /// The connection was already in this room. Nothing changed.
    AlreadyPresent,
}

/// What happened on a successful [`RoomRegistry::leave`].
#[derive(Debug, Clone)]
pub struct Departure {
    /// The leaver was the last occupant and the room is gone.
    pub destroyed: bool,
    /// Occupants left behind, in join order.
    pub remaining: Vec<ConnectionId>,
    /// State changes made by the game's leave hook. Empty when the room
    /// was destroyed or the game didn't care.
    pub patch: Patch,
}

/// Manages all rooms of one game and tracks which room each connection
/// is in.
///
/// Invariants:
/// - a room with zero occupants is not in the registry,
/// - a connection is in at most one room at a time,
/// - occupants are never reordered.
pub struct RoomRegistry<G: Game> {
    rooms: HashMap<String, Room<G::State>>,
    connection_rooms: HashMap<ConnectionId, String>,
}

impl<G: Game> RoomRegistry<G> {
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
            connection_rooms: HashMap::new(),
        }
    }

    /// Adds `conn` to `room`, creating the room with [`Game::init`] if it
    /// doesn't exist.
    ///
    /// # Errors
    /// [`RoomError::AlreadyInOtherRoom`] if `conn` sits in a different room.
    pub fn join(&mut self, conn: ConnectionId, room: &str) -> Result<JoinOutcome, RoomError> {
        if let Some(current) = self.connection_rooms.get(&conn) {
            if current == room {
                return Ok(JoinOutcome::AlreadyPresent);
            }
            return Err(RoomError::AlreadyInOtherRoom {
                conn,
                room: current.clone(),
            });
        }

        let outcome = match self.rooms.get_mut(room) {
            Some(existing) => {
                existing.occupants.push(conn);
                tracing::debug!(
                    room,
                    %conn,
                    occupants = existing.occupants.len(),
                    "joined room"
                );
                JoinOutcome::Joined {
                    notice: G::join_notice(&existing.state, &existing.occupants),
                }
            }
            None => {
                self.rooms.insert(
                    room.to_owned(),
                    Room {
                        state: G::init(conn),
                        occupants: vec![conn],
                    },
                );
                tracing::info!(room, %conn, "created room");
                JoinOutcome::Created
            }
        };
        self.connection_rooms.insert(conn, room.to_owned());
        Ok(outcome)
    }

    /// Removes `conn` from `room`, destroying the room if it empties.
    ///
    /// # Errors
    /// - [`RoomError::NotFound`]: no such room
    /// - [`RoomError::NotInRoom`]: `conn` isn't an occupant
    pub fn leave(&mut self, conn: ConnectionId, room: &str) -> Result<Departure, RoomError> {
        let entry = self
            .rooms
            .get_mut(room)
            .ok_or_else(|| RoomError::NotFound(room.to_owned()))?;
        if !entry.occupants.contains(&conn) {
            return Err(RoomError::NotInRoom {
                conn,
                room: room.to_owned(),
            });
        }

        entry.occupants.retain(|c| *c != conn);
        if self.connection_rooms.get(&conn).is_some_and(|r| r == room) {
            self.connection_rooms.remove(&conn);
        }

        if entry.occupants.is_empty() {
            self.rooms.remove(room);
            tracing::info!(room, %conn, "destroyed room");
            return Ok(Departure {
                destroyed: true,
                remaining: Vec::new(),
                patch: Patch::new(),
            });
        }

        let remaining = entry.occupants.clone();
        let revision = mutate(&entry.state, |draft| {
            G::on_leave(draft, conn, &remaining);
            Ok::<(), Infallible>(())
        })
        .map_err(|e| match e {
            MutateError::Patch(e) => RoomError::Patch(e),
            MutateError::Rejected(never) => match never {},
        })?;
        entry.state = revision.state;

        tracing::debug!(room, %conn, occupants = remaining.len(), "left room");
        Ok(Departure {
            destroyed: false,
            remaining,
            patch: revision.patch,
        })
    }

    /// Removes `conn` from every room it occupies.
    ///
    /// Scans the rooms themselves rather than trusting the connection
    /// index, so a stale index entry is harmless. Returns each affected
    /// room name with its departure.
    pub fn disconnect(&mut self, conn: ConnectionId) -> Vec<(String, Departure)> {
        let names: Vec<String> = self
            .rooms
            .iter()
            .filter(|(_, room)| room.occupants.contains(&conn))
            .map(|(name, _)| name.clone())
            .collect();
        self.connection_rooms.remove(&conn);

        let mut departures = Vec::with_capacity(names.len());
        for name in names {
            match self.leave(conn, &name) {
                Ok(departure) => departures.push((name, departure)),
                Err(e) => {
                    tracing::debug!(room = %name, %conn, error = %e, "leave on disconnect failed");
                }
            }
        }
        departures
    }

    /// Returns the room's current state, but only to one of its occupants.
    pub fn state(&self, conn: ConnectionId, room: &str) -> Option<&G::State> {
        self.rooms
            .get(room)
            .filter(|r| r.occupants.contains(&conn))
            .map(|r| &r.state)
    }

    /// Runs a game command from `conn` against `room`.
    ///
    /// All-or-nothing: on error the room's state is exactly what it was.
    /// On success returns the patch of the new revision (possibly empty).
    ///
    /// # Errors
    /// - [`RoomError::NotFound`]: no such room
    /// - [`RoomError::Rejected`]: `conn` isn't an occupant, or the game
    ///   refused the command
    pub fn command(
        &mut self,
        conn: ConnectionId,
        room: &str,
        command: G::Command,
    ) -> Result<Patch, RoomError> {
        let entry = self
            .rooms
            .get_mut(room)
            .ok_or_else(|| RoomError::NotFound(room.to_owned()))?;
        if !entry.occupants.contains(&conn) {
            return Err(CommandError::NotParticipant(conn).into());
        }

        let revision = mutate(&entry.state, |draft| G::handle_command(draft, conn, command))
            .map_err(|e| match e {
                MutateError::Rejected(e) => RoomError::Rejected(e),
                MutateError::Patch(e) => RoomError::Patch(e),
            })?;
        entry.state = revision.state;
        Ok(revision.patch)
    }

    /// Occupants of `room` in join order, if it exists.
    pub fn occupants(&self, room: &str) -> Option<&[ConnectionId]> {
        self.rooms.get(room).map(|r| r.occupants.as_slice())
    }

    /// The room `conn` is currently in, if any.
    pub fn room_of(&self, conn: ConnectionId) -> Option<&str> {
        self.connection_rooms.get(&conn).map(String::as_str)
    }

    pub fn contains(&self, room: &str) -> bool {
        self.rooms.contains_key(room)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn room_names(&self) -> Vec<String> {
        self.rooms.keys().cloned().collect()
    }
}

impl<G: Game> Default for RoomRegistry<G> {
    fn default() -> Self {
        Self::new()
    }
}
