//! Escampe.
//!
//! A 6×6 board whose cells carry a terrain class of 1, 2 or 3. The board
//! can be laid in one of four orientations, each giving a different
//! terrain table. A piece leaving a cell must travel a shortest path of
//! exactly that cell's terrain class, and the class of the cell it lands
//! on constrains which pieces the opponent may move next.
//!
//! Seat 0 plays white and places on cells 0–11; seat 1 plays black,
//! picks the orientation and places first, on cells 24–35. Each side has
//! five paladins and one unicorn. Capturing the enemy unicorn wins.

use std::collections::VecDeque;

use parlor_room::{CommandError, Game};
use parlor_transport::ConnectionId;
use serde::{Deserialize, Serialize};

use crate::Seats;

pub const WIDTH: usize = 6;
pub const CELLS: usize = WIDTH * WIDTH;

/// Terrain class of every cell, one table per board orientation.
pub static TERRAIN: [[u8; CELLS]; 4] = [
    [
        1, 2, 2, 3, 1, 2, 3, 1, 3, 1, 3, 2, 2, 3, 1, 2, 1, 3, 2, 1, 3, 2, 3, 1, 1, 3, 1, 3, 1, 2, 3,
        2, 2, 1, 3, 2,
    ],
    [
        3, 1, 2, 2, 3, 1, 2, 3, 1, 3, 1, 2, 2, 1, 3, 1, 3, 2, 1, 3, 2, 2, 1, 3, 3, 1, 3, 1, 3, 1, 2,
        2, 1, 3, 2, 2,
    ],
    [
        2, 3, 1, 2, 2, 3, 2, 1, 3, 1, 3, 1, 1, 3, 2, 3, 1, 2, 3, 1, 2, 1, 3, 2, 2, 3, 1, 3, 1, 3, 2,
        1, 3, 2, 2, 1,
    ],
    [
        2, 2, 3, 1, 2, 2, 1, 3, 1, 3, 1, 3, 3, 1, 2, 2, 3, 1, 2, 3, 1, 3, 1, 2, 2, 1, 3, 1, 3, 2, 1,
        3, 2, 2, 1, 3,
    ],
];

const PALADINS: u8 = 5;
const UNICORNS: u8 = 1;
const WHITE: usize = 0;
const BLACK: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Waiting,
    /// Black sets the orientation and places.
    PlacingBlack,
    PlacingWhite,
    Playing,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Paladin,
    Unicorn,
}

impl Rank {
    /// Decodes the `place_piece` rank argument. -1 means "pick up".
    fn from_arg(rank: i8) -> Result<Option<Self>, CommandError> {
        match rank {
            -1 => Ok(None),
            0 => Ok(Some(Self::Paladin)),
            1 => Ok(Some(Self::Unicorn)),
            other => Err(CommandError::malformed(format!("no rank {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub position: usize,
    pub rank: Rank,
    pub side: usize,
    pub id: u32,
}

/// Pieces a side still has in hand during placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToPlace {
    pub paladin: u8,
    pub unicorn: u8,
}

impl ToPlace {
    fn full() -> Self {
        Self { paladin: PALADINS, unicorn: UNICORNS }
    }

    fn slot(&mut self, rank: Rank) -> &mut u8 {
        match rank {
            Rank::Paladin => &mut self.paladin,
            Rank::Unicorn => &mut self.unicorn,
        }
    }

    fn take(&mut self, rank: Rank) -> Result<(), CommandError> {
        let slot = self.slot(rank);
        *slot = slot
            .checked_sub(1)
            .ok_or_else(|| CommandError::illegal(format!("no {rank:?} left to place")))?;
        Ok(())
    }

    fn give_back(&mut self, rank: Rank) {
        *self.slot(rank) += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscampeState {
    pub players: Seats,
    /// Board orientation, 0–3: index into [`TERRAIN`].
    pub rotation: usize,
    pub pieces: Vec<Piece>,
    pub to_place: [ToPlace; 2],
    /// Terrain class the next move must depart from, 0 when unconstrained.
    pub last_played: u8,
    /// Seat to move.
    pub turn: usize,
    /// Whether the side to move got its turn back because the opponent
    /// was blocked.
    pub skipped: bool,
    pub rematch: [bool; 2],
    pub phase: Phase,
    pub winner: Option<usize>,
    pub next_id: u32,
}

impl EscampeState {
    pub fn new() -> Self {
        Self {
            players: Seats::default(),
            rotation: 0,
            pieces: Vec::new(),
            to_place: [ToPlace::full(), ToPlace::full()],
            last_played: 0,
            turn: WHITE,
            skipped: false,
            rematch: [false, false],
            phase: Phase::Waiting,
            winner: None,
            next_id: 0,
        }
    }

    pub fn terrain(&self) -> &'static [u8; CELLS] {
        &TERRAIN[self.rotation % TERRAIN.len()]
    }

    pub fn piece_at(&self, cell: usize) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.position == cell)
    }

    fn seat(&self, conn: ConnectionId) -> Result<usize, CommandError> {
        self.players.seat_of(conn).ok_or(CommandError::NotParticipant(conn))
    }

    fn choose_side(&mut self, sender: ConnectionId, seat: usize) -> Result<(), CommandError> {
        if self.phase == Phase::End {
            return Err(CommandError::illegal("the game is over"));
        }
        self.players.claim(seat, sender)?;
        if self.phase == Phase::Waiting && self.players.is_full() {
            self.phase = Phase::PlacingBlack;
        }
        Ok(())
    }

    fn set_rotation(&mut self, sender: ConnectionId, rotation: usize) -> Result<(), CommandError> {
        if self.phase != Phase::PlacingBlack {
            return Err(CommandError::illegal("the board is only turned before black places"));
        }
        if self.seat(sender)? != BLACK {
            return Err(CommandError::OutOfTurn(sender));
        }
        if rotation >= TERRAIN.len() {
            return Err(CommandError::malformed(format!("no rotation {rotation}")));
        }
        self.rotation = rotation;
        Ok(())
    }

    /// The phase in which `seat` places its pieces.
    fn placing_phase(seat: usize) -> Phase {
        if seat == BLACK { Phase::PlacingBlack } else { Phase::PlacingWhite }
    }

    fn home(seat: usize, cell: usize) -> bool {
        if seat == BLACK { cell >= 24 } else { cell <= 11 }
    }

    fn place_piece(&mut self, sender: ConnectionId, rank: i8, cell: usize) -> Result<(), CommandError> {
        let rank = Rank::from_arg(rank)?;
        if cell >= CELLS {
            return Err(CommandError::malformed(format!("no cell {cell}")));
        }
        let seat = self.seat(sender)?;
        if self.phase != Self::placing_phase(seat) {
            return Err(CommandError::OutOfTurn(sender));
        }
        if !Self::home(seat, cell) {
            return Err(CommandError::illegal(format!("seat {seat} can't place on {cell}")));
        }

        let existing = self.pieces.iter().position(|p| p.position == cell);
        match (existing, rank) {
            (Some(i), _) if self.pieces[i].side != seat => {
                Err(CommandError::illegal("can't replace an opponent's piece"))
            }
            (Some(i), None) => {
                let picked = self.pieces.remove(i);
                self.to_place[seat].give_back(picked.rank);
                Ok(())
            }
            (Some(i), Some(rank)) if self.pieces[i].rank != rank => {
                self.to_place[seat].take(rank)?;
                self.to_place[seat].give_back(self.pieces[i].rank);
                self.pieces[i].rank = rank;
                Ok(())
            }
            (Some(_), Some(_)) | (None, None) => Ok(()),
            (None, Some(rank)) => {
                self.to_place[seat].take(rank)?;
                self.pieces.push(Piece { position: cell, rank, side: seat, id: self.next_id });
                self.next_id += 1;
                Ok(())
            }
        }
    }

    fn done_placing(&mut self, sender: ConnectionId) -> Result<(), CommandError> {
        let seat = self.seat(sender)?;
        if self.phase != Self::placing_phase(seat) {
            return Err(CommandError::OutOfTurn(sender));
        }
        let count = |rank: Rank| {
            self.pieces
                .iter()
                .filter(|p| p.side == seat && p.rank == rank)
                .count()
        };
        if count(Rank::Unicorn) != usize::from(UNICORNS) || count(Rank::Paladin) != usize::from(PALADINS) {
            return Err(CommandError::illegal(format!("seat {seat} hasn't placed every piece")));
        }

        self.phase = match self.phase {
            Phase::PlacingBlack => Phase::PlacingWhite,
            _ => {
                self.turn = WHITE;
                self.last_played = 0;
                Phase::Playing
            }
        };
        Ok(())
    }

    /// Length of the shortest orthogonal walk from `from` to `to`, where
    /// every piece except the one on `from` blocks, unless it is an enemy
    /// unicorn standing on `to`.
    pub fn path_length(&self, from: usize, to: usize) -> Option<usize> {
        let mover = self.piece_at(from)?;
        let blocked = |cell: usize| {
            if cell == from {
                return false;
            }
            match self.piece_at(cell) {
                None => false,
                Some(p) => !(cell == to && p.side != mover.side && p.rank == Rank::Unicorn),
            }
        };

        let mut dist = [usize::MAX; CELLS];
        let mut queue = VecDeque::from([from]);
        dist[from] = 0;
        while let Some(cell) = queue.pop_front() {
            if cell == to {
                return Some(dist[cell]);
            }
            for next in neighbours(cell) {
                if dist[next] == usize::MAX && !blocked(next) {
                    dist[next] = dist[cell] + 1;
                    queue.push_back(next);
                }
            }
        }
        None
    }

    /// Whether `side` may move `from` → `to` under the current constraint.
    pub fn is_legal(&self, side: usize, from: usize, to: usize) -> bool {
        let Some(mover) = self.piece_at(from) else {
            return false;
        };
        if mover.side != side || to >= CELLS {
            return false;
        }
        let class = self.terrain()[from];
        if self.last_played != 0 && class != self.last_played {
            return false;
        }
        let landing_ok = match self.piece_at(to) {
            None => true,
            Some(p) => p.side != side && p.rank == Rank::Unicorn,
        };
        landing_ok && self.path_length(from, to) == Some(usize::from(class))
    }

    /// Whether `side` has any legal move while `last_played` is the
    /// constraint.
    pub fn can_move(&self, side: usize) -> bool {
        self.pieces
            .iter()
            .filter(|p| p.side == side)
            .any(|p| (0..CELLS).any(|to| self.is_legal(side, p.position, to)))
    }

    fn play(&mut self, sender: ConnectionId, from: usize, to: usize) -> Result<(), CommandError> {
        if self.phase != Phase::Playing {
            return Err(CommandError::illegal("the game isn't running"));
        }
        let seat = self.players.require_turn(sender, self.turn)?;
        if from >= CELLS || to >= CELLS {
            return Err(CommandError::malformed(format!("no move {from} -> {to}")));
        }
        let Some(mover) = self.pieces.iter().position(|p| p.position == from && p.side == seat) else {
            return Err(CommandError::illegal(format!("no piece of seat {seat} on {from}")));
        };
        let class = self.terrain()[from];
        if self.last_played != 0 && class != self.last_played {
            return Err(CommandError::illegal(format!(
                "must leave from terrain {}, {from} is {class}",
                self.last_played
            )));
        }
        let target = self.piece_at(to).copied();
        if target.is_some_and(|p| p.side == seat || p.rank != Rank::Unicorn) {
            return Err(CommandError::illegal(format!("can't land on {to}")));
        }
        if self.path_length(from, to) != Some(usize::from(class)) {
            return Err(CommandError::illegal(format!("{from} -> {to} is not {class} steps")));
        }

        self.pieces[mover].position = to;
        if target.is_some() {
            self.pieces.retain(|p| !(p.position == to && p.side != seat));
            self.phase = Phase::End;
            self.winner = Some(seat);
            tracing::info!(winner = seat, "escampe game over");
            return Ok(());
        }

        let opponent = 1 - seat;
        self.last_played = self.terrain()[to];
        if self.can_move(opponent) {
            self.turn = opponent;
            self.skipped = false;
        } else {
            // The opponent is blocked: whoever moves next does so freely.
            // A side is never passed over twice in a row.
            self.last_played = 0;
            if self.skipped {
                self.turn = opponent;
                self.skipped = false;
            } else {
                self.skipped = true;
            }
            tracing::debug!(blocked = opponent, "escampe deadlock");
        }
        Ok(())
    }

    fn want_rematch(&mut self, sender: ConnectionId) -> Result<(), CommandError> {
        if self.phase != Phase::End {
            return Err(CommandError::illegal("no rematch before the game ends"));
        }
        let seat = self.seat(sender)?;
        self.rematch[seat] = true;
        if self.rematch.iter().all(|r| *r) {
            *self = Self::new();
        }
        Ok(())
    }
}

impl Default for EscampeState {
    fn default() -> Self {
        Self::new()
    }
}

fn neighbours(cell: usize) -> impl Iterator<Item = usize> {
    let (x, y) = (cell % WIDTH, cell / WIDTH);
    [
        (x > 0).then(|| cell - 1),
        (x + 1 < WIDTH).then(|| cell + 1),
        (y > 0).then(|| cell - WIDTH),
        (y + 1 < WIDTH).then(|| cell + WIDTH),
    ]
    .into_iter()
    .flatten()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "args", rename_all = "snake_case")]
pub enum EscampeCommand {
    ChooseSide(usize),
    SetRotation(usize),
    /// Rank (-1 pick up, 0 paladin, 1 unicorn) and cell.
    PlacePiece(i8, usize),
    DonePlacing,
    Move(usize, usize),
    WantRematch,
}

pub struct Escampe;

impl Game for Escampe {
    type State = EscampeState;
    type Command = EscampeCommand;

    fn init(_creator: ConnectionId) -> EscampeState {
        EscampeState::new()
    }

    fn handle_command(
        state: &mut EscampeState,
        sender: ConnectionId,
        command: EscampeCommand,
    ) -> Result<(), CommandError> {
        match command {
            EscampeCommand::ChooseSide(seat) => state.choose_side(sender, seat),
            EscampeCommand::SetRotation(rotation) => state.set_rotation(sender, rotation),
            EscampeCommand::PlacePiece(rank, cell) => state.place_piece(sender, rank, cell),
            EscampeCommand::DonePlacing => state.done_placing(sender),
            EscampeCommand::Move(from, to) => state.play(sender, from, to),
            EscampeCommand::WantRematch => state.want_rematch(sender),
        }
    }

    fn on_leave(state: &mut EscampeState, leaver: ConnectionId, _remaining: &[ConnectionId]) {
        if let Some(seat) = state.players.vacate(leaver) {
            state.rematch[seat] = false;
        }
    }
}
