//! Chess.
//!
//! Two seats, white (0) and black (1). `turn` counts accepted moves; its
//! parity picks the side to move, white first. Every move is validated in
//! a fixed order before anything is touched: turn ownership, the piece's
//! movement rule, then a simulated board that must not leave the mover's
//! king in check. Castling and en passant are not played.

mod board;

pub use board::{Board, EMPTY, Kind, SIZE, Side, kind_of, piece, side_of};

use parlor_room::{CommandError, Game};
use parlor_transport::ConnectionId;
use serde::{Deserialize, Serialize};

use crate::Seats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Choosing,
    Playing,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastMove {
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChessState {
    pub board: Board,
    pub players: Seats,
    pub turn: u32,
    /// Selected cell of the side to move, -1 for none.
    pub selected: i32,
    /// Pieces taken by white (0) and by black (1).
    pub captured: [Vec<u8>; 2],
    pub last_move: Option<LastMove>,
    /// Whether the side to move is in check.
    pub check: bool,
    pub phase: Phase,
    /// Seat of the winner once `phase` is `end`; none after a stalemate.
    pub winner: Option<usize>,
}

impl ChessState {
    pub fn new() -> Self {
        Self {
            board: Board::initial(),
            players: Seats::default(),
            turn: 0,
            selected: -1,
            captured: [Vec::new(), Vec::new()],
            last_move: None,
            check: false,
            phase: Phase::Choosing,
            winner: None,
        }
    }

    pub fn side_to_move(&self) -> Side {
        Side::from_index(self.turn as usize)
    }

    pub fn is_turn_of(&self, conn: ConnectionId) -> bool {
        self.players.get(self.side_to_move().index()) == Some(conn)
    }

    fn require_playing(&self) -> Result<(), CommandError> {
        match self.phase {
            Phase::Playing => Ok(()),
            phase => Err(CommandError::illegal(format!("no moves during {phase:?}"))),
        }
    }

    fn choose_side(&mut self, sender: ConnectionId, seat: usize) -> Result<(), CommandError> {
        if self.phase == Phase::End {
            return Err(CommandError::illegal("the game is over"));
        }
        self.players.claim(seat, sender)?;
        if self.phase == Phase::Choosing && self.players.is_full() {
            self.phase = Phase::Playing;
        }
        Ok(())
    }

    fn select(&mut self, sender: ConnectionId, cell: i32) -> Result<(), CommandError> {
        self.require_playing()?;
        let side = self.side_to_move();
        self.players.require_turn(sender, side.index())?;

        if cell == -1 {
            self.selected = -1;
            return Ok(());
        }
        let i = usize::try_from(cell)
            .ok()
            .filter(|&i| i < SIZE)
            .ok_or_else(|| CommandError::malformed(format!("no cell {cell}")))?;
        if side_of(self.board.get(i)) != Some(side) {
            return Err(CommandError::illegal(format!("no piece of the mover on {i}")));
        }
        self.selected = cell;
        Ok(())
    }

    fn play(&mut self, sender: ConnectionId, from: usize, to: usize) -> Result<(), CommandError> {
        self.require_playing()?;
        let side = self.side_to_move();
        let seat = self.players.require_turn(sender, side.index())?;

        if from >= SIZE || to >= SIZE {
            return Err(CommandError::malformed(format!("no move {from} -> {to}")));
        }
        if side_of(self.board.get(from)) != Some(side) {
            return Err(CommandError::illegal(format!("no piece of the mover on {from}")));
        }
        if !self.board.reaches(from, to) {
            return Err(CommandError::illegal(format!("piece on {from} can't reach {to}")));
        }
        if !self.board.is_legal(side, from, to) {
            return Err(CommandError::illegal(format!("{from} -> {to} leaves the king in check")));
        }

        let captured = self.board.apply_move(from, to);
        if captured != EMPTY {
            self.captured[seat].push(captured);
        }
        self.last_move = Some(LastMove { from, to });
        self.selected = -1;
        self.turn += 1;

        let opponent = side.opponent();
        self.check = self.board.in_check(opponent);
        if !self.board.has_legal_move(opponent) {
            self.phase = Phase::End;
            self.winner = self.check.then_some(seat);
            tracing::info!(winner = ?self.winner, "chess game over");
        }
        Ok(())
    }
}

impl Default for ChessState {
    fn default() -> Self {
        Self::new()
    }
}

/// Commands a chess client can send.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "args", rename_all = "snake_case")]
pub enum ChessCommand {
    ChooseSide(usize),
    /// A cell index, or -1 to clear the selection.
    Select(i32),
    Move(usize, usize),
}

pub struct Chess;

impl Game for Chess {
    type State = ChessState;
    type Command = ChessCommand;

    fn init(_creator: ConnectionId) -> ChessState {
        ChessState::new()
    }

    fn handle_command(
        state: &mut ChessState,
        sender: ConnectionId,
        command: ChessCommand,
    ) -> Result<(), CommandError> {
        match command {
            ChessCommand::ChooseSide(seat) => state.choose_side(sender, seat),
            ChessCommand::Select(cell) => state.select(sender, cell),
            ChessCommand::Move(from, to) => state.play(sender, from, to),
        }
    }

    fn on_leave(state: &mut ChessState, leaver: ConnectionId, _remaining: &[ConnectionId]) {
        state.players.vacate(leaver);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cid(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    fn seated() -> ChessState {
        let mut state = ChessState::new();
        state.choose_side(cid(1), 0).unwrap();
        state.choose_side(cid(2), 1).unwrap();
        state
    }

    #[test]
    fn test_both_seats_start_the_game() {
        let mut state = ChessState::new();
        state.choose_side(cid(1), 1).unwrap();
        assert_eq!(state.phase, Phase::Choosing);
        state.choose_side(cid(2), 0).unwrap();
        assert_eq!(state.phase, Phase::Playing);
    }

    #[test]
    fn test_turn_alternates_with_parity() {
        let mut state = seated();
        assert!(state.is_turn_of(cid(1)));
        state.play(cid(1), 52, 36).unwrap();
        assert!(state.is_turn_of(cid(2)));
        assert_eq!(
            state.play(cid(1), 51, 35),
            Err(CommandError::OutOfTurn(cid(1)))
        );
        state.play(cid(2), 12, 28).unwrap();
        assert!(state.is_turn_of(cid(1)));
        assert_eq!(state.turn, 2);
    }

    #[test]
    fn test_select_own_piece_only() {
        let mut state = seated();
        state.select(cid(1), 52).unwrap();
        assert_eq!(state.selected, 52);
        assert!(matches!(state.select(cid(1), 12), Err(CommandError::IllegalAction(_))));
        assert!(matches!(state.select(cid(1), 64), Err(CommandError::MalformedInput(_))));
        assert_eq!(state.select(cid(2), 12), Err(CommandError::OutOfTurn(cid(2))));
        state.select(cid(1), -1).unwrap();
        assert_eq!(state.selected, -1);
    }

    #[test]
    fn test_move_records_capture_and_resets_selection() {
        let mut state = seated();
        state.board = Board::with_pieces(&[(60, 6), (4, 12), (36, 1), (27, 7)]);
        state.select(cid(1), 36).unwrap();
        state.play(cid(1), 36, 27).unwrap();
        assert_eq!(state.captured[0], vec![7]);
        assert_eq!(state.selected, -1);
        assert_eq!(state.last_move, Some(LastMove { from: 36, to: 27 }));
    }

    #[test]
    fn test_check_flag_for_opponent() {
        let mut state = seated();
        state.board = Board::with_pieces(&[(60, 6), (3, 12), (56, 4)]);
        state.play(cid(1), 56, 59).unwrap();
        assert!(state.check);
        assert_eq!(state.phase, Phase::Playing);
    }

    #[test]
    fn test_move_ignoring_check_is_rejected() {
        let mut state = seated();
        state.play(cid(1), 52, 36).unwrap();
        state.play(cid(2), 13, 29).unwrap();
        // Qh5+ down the h5-e8 diagonal opened by f5.
        state.play(cid(1), 59, 31).unwrap();
        assert!(state.check);

        let before = state.clone();
        assert!(matches!(state.play(cid(2), 8, 16), Err(CommandError::IllegalAction(_))));
        assert_eq!(state, before);

        // Blocking with g6 is fine.
        state.play(cid(2), 14, 22).unwrap();
        assert!(!state.check);
    }

    #[test]
    fn test_checkmate_ends_the_game() {
        let mut state = seated();
        // Black king h8 behind its pawns; white rook swings to the back rank.
        state.board = Board::with_pieces(&[(60, 6), (7, 12), (14, 7), (15, 7), (48, 4)]);
        state.play(cid(1), 48, 0).unwrap();
        assert!(state.check);
        assert_eq!(state.phase, Phase::End);
        assert_eq!(state.winner, Some(0));
        assert!(matches!(state.play(cid(2), 7, 6), Err(CommandError::IllegalAction(_))));
    }

    #[test]
    fn test_stalemate_ends_without_winner() {
        let mut state = seated();
        // Black king a8; white queen to b6 leaves it no square and no check.
        state.board = Board::with_pieces(&[(0, 12), (18, 6), (33, 5)]);
        state.play(cid(1), 33, 17).unwrap();
        assert!(!state.check);
        assert_eq!(state.phase, Phase::End);
        assert_eq!(state.winner, None);
    }

    #[test]
    fn test_leave_vacates_seat_which_can_be_reclaimed() {
        let mut state = seated();
        Chess::on_leave(&mut state, cid(2), &[cid(1)]);
        assert_eq!(state.players.get(1), None);
        assert_eq!(state.phase, Phase::Playing);
        state.choose_side(cid(3), 1).unwrap();
        assert_eq!(state.players.get(1), Some(cid(3)));
    }

    #[test]
    fn test_state_json_shape() {
        let json = serde_json::to_value(ChessState::new()).unwrap();
        assert_eq!(json["board"].as_array().map(Vec::len), Some(64));
        assert_eq!(json["players"], serde_json::json!([null, null]));
        assert_eq!(json["selected"], -1);
        assert_eq!(json["lastMove"], serde_json::Value::Null);
        assert_eq!(json["phase"], "choosing");
    }
}
