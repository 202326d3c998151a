use parlor_room::CommandError;
use parlor_transport::ConnectionId;
use serde::{Deserialize, Serialize};

/// The two seats of a two-player game. Seat 0 is white, seat 1 is black.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seats([Option<ConnectionId>; 2]);

impl Seats {
    pub fn get(&self, seat: usize) -> Option<ConnectionId> {
        self.0.get(seat).copied().flatten()
    }

    /// The seat `conn` holds, if any.
    pub fn seat_of(&self, conn: ConnectionId) -> Option<usize> {
        self.0.iter().position(|s| *s == Some(conn))
    }

    pub fn is_full(&self) -> bool {
        self.0.iter().all(Option::is_some)
    }

    /// Binds `conn` to `seat`.
    ///
    /// # Errors
    /// - `MalformedInput` if `seat` isn't 0 or 1
    /// - `IllegalAction` if the seat is taken or `conn` already sits
    pub fn claim(&mut self, seat: usize, conn: ConnectionId) -> Result<(), CommandError> {
        if seat > 1 {
            return Err(CommandError::malformed(format!("no seat {seat}")));
        }
        if self.0[seat].is_some() {
            return Err(CommandError::illegal(format!("seat {seat} is taken")));
        }
        if self.seat_of(conn).is_some() {
            return Err(CommandError::illegal(format!("{conn} already has a seat")));
        }
        self.0[seat] = Some(conn);
        Ok(())
    }

    /// Vacates whatever seat `conn` holds. Returns that seat.
    pub fn vacate(&mut self, conn: ConnectionId) -> Option<usize> {
        let seat = self.seat_of(conn)?;
        self.0[seat] = None;
        Some(seat)
    }

    /// The seat of `conn`, which must be the seat to move.
    ///
    /// # Errors
    /// - `NotParticipant` if `conn` has no seat
    /// - `OutOfTurn` if it's the other seat's move
    pub fn require_turn(&self, conn: ConnectionId, to_move: usize) -> Result<usize, CommandError> {
        let seat = self.seat_of(conn).ok_or(CommandError::NotParticipant(conn))?;
        if seat != to_move {
            return Err(CommandError::OutOfTurn(conn));
        }
        Ok(seat)
    }
}
