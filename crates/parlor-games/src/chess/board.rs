//! Board model and move geometry.
//!
//! Cells are indexed `row * 8 + col`. Row 0 is black's back rank, so white
//! pawns move toward lower indices. A cell holds 0 when empty, 1–6 for a
//! white pawn, knight, bishop, rook, queen, king, and 7–12 for the same
//! black pieces.

use serde::{Deserialize, Serialize};

pub const EMPTY: u8 = 0;
pub const SIZE: usize = 64;

const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];
const STRAIGHT: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const DIAGONAL: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    White,
    Black,
}

impl Side {
    /// Seat index: white is 0, black is 1.
    pub fn index(self) -> usize {
        match self {
            Self::White => 0,
            Self::Black => 1,
        }
    }

    pub fn from_index(i: usize) -> Self {
        if i % 2 == 0 { Self::White } else { Self::Black }
    }

    pub fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Row delta of a forward pawn step.
    fn forward(self) -> i32 {
        match self {
            Self::White => -1,
            Self::Black => 1,
        }
    }

    fn pawn_start_row(self) -> i32 {
        match self {
            Self::White => 6,
            Self::Black => 1,
        }
    }

    fn last_row(self) -> i32 {
        match self {
            Self::White => 0,
            Self::Black => 7,
        }
    }

    fn code_offset(self) -> u8 {
        match self {
            Self::White => 0,
            Self::Black => 6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Kind {
    const ALL: [Kind; 6] = [
        Kind::Pawn,
        Kind::Knight,
        Kind::Bishop,
        Kind::Rook,
        Kind::Queen,
        Kind::King,
    ];
}

/// Encodes a piece as its cell value.
pub fn piece(side: Side, kind: Kind) -> u8 {
    let base = match kind {
        Kind::Pawn => 1,
        Kind::Knight => 2,
        Kind::Bishop => 3,
        Kind::Rook => 4,
        Kind::Queen => 5,
        Kind::King => 6,
    };
    base + side.code_offset()
}

pub fn side_of(cell: u8) -> Option<Side> {
    match cell {
        1..=6 => Some(Side::White),
        7..=12 => Some(Side::Black),
        _ => None,
    }
}

pub fn kind_of(cell: u8) -> Option<Kind> {
    match cell {
        1..=12 => Some(Kind::ALL[usize::from((cell - 1) % 6)]),
        _ => None,
    }
}

fn coords(i: usize) -> (i32, i32) {
    ((i / 8) as i32, (i % 8) as i32)
}

fn index(row: i32, col: i32) -> Option<usize> {
    ((0..8).contains(&row) && (0..8).contains(&col)).then(|| (row * 8 + col) as usize)
}

/// The 64 cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board(Vec<u8>);

impl Board {
    pub fn empty() -> Self {
        Self(vec![EMPTY; SIZE])
    }

    /// The standard opening layout.
    pub fn initial() -> Self {
        const BACK: [Kind; 8] = [
            Kind::Rook,
            Kind::Knight,
            Kind::Bishop,
            Kind::Queen,
            Kind::King,
            Kind::Bishop,
            Kind::Knight,
            Kind::Rook,
        ];
        let mut board = Self::empty();
        for (col, kind) in BACK.iter().enumerate() {
            board.0[col] = piece(Side::Black, *kind);
            board.0[8 + col] = piece(Side::Black, Kind::Pawn);
            board.0[48 + col] = piece(Side::White, Kind::Pawn);
            board.0[56 + col] = piece(Side::White, *kind);
        }
        board
    }

    /// Builds a board from `(cell, piece)` pairs, everything else empty.
    pub fn with_pieces(pieces: &[(usize, u8)]) -> Self {
        let mut board = Self::empty();
        for &(i, p) in pieces {
            board.set(i, p);
        }
        board
    }

    pub fn get(&self, i: usize) -> u8 {
        self.0.get(i).copied().unwrap_or(EMPTY)
    }

    pub fn set(&mut self, i: usize, cell: u8) {
        if let Some(slot) = self.0.get_mut(i) {
            *slot = cell;
        }
    }

    pub fn cells(&self) -> &[u8] {
        &self.0
    }

    pub fn king_square(&self, side: Side) -> Option<usize> {
        let king = piece(side, Kind::King);
        self.0.iter().position(|&c| c == king)
    }

    /// Whether the piece on `from` may move to `to` by its own movement
    /// rule, ignoring whether that leaves its king in check.
    pub fn reaches(&self, from: usize, to: usize) -> bool {
        let mover = self.get(from);
        let (Some(side), Some(kind)) = (side_of(mover), kind_of(mover)) else {
            return false;
        };
        if from == to || to >= SIZE {
            return false;
        }
        let target = self.get(to);
        if side_of(target) == Some(side) {
            return false;
        }

        let (fr, fc) = coords(from);
        let (tr, tc) = coords(to);
        let (dr, dc) = (tr - fr, tc - fc);

        match kind {
            Kind::Pawn => {
                let fwd = side.forward();
                if dc == 0 && target == EMPTY {
                    if dr == fwd {
                        return true;
                    }
                    if dr == 2 * fwd && fr == side.pawn_start_row() {
                        return index(fr + fwd, fc).is_some_and(|mid| self.get(mid) == EMPTY);
                    }
                    false
                } else {
                    dr == fwd && dc.abs() == 1 && target != EMPTY
                }
            }
            Kind::Knight => KNIGHT_OFFSETS.contains(&(dr, dc)),
            Kind::King => dr.abs() <= 1 && dc.abs() <= 1,
            Kind::Rook => (dr == 0 || dc == 0) && self.path_clear(from, to),
            Kind::Bishop => dr.abs() == dc.abs() && self.path_clear(from, to),
            Kind::Queen => {
                (dr == 0 || dc == 0 || dr.abs() == dc.abs()) && self.path_clear(from, to)
            }
        }
    }

    /// Every cell strictly between `from` and `to` is empty. Only called
    /// for straight or diagonal lines.
    fn path_clear(&self, from: usize, to: usize) -> bool {
        let (fr, fc) = coords(from);
        let (tr, tc) = coords(to);
        let (sr, sc) = ((tr - fr).signum(), (tc - fc).signum());
        let (mut r, mut c) = (fr + sr, fc + sc);
        while (r, c) != (tr, tc) {
            match index(r, c) {
                Some(i) if self.get(i) == EMPTY => {}
                _ => return false,
            }
            r += sr;
            c += sc;
        }
        true
    }

    /// Moves the piece from `from` to `to`, promoting a pawn that reaches
    /// its last rank to a queen. Returns whatever stood on `to`.
    pub fn apply_move(&mut self, from: usize, to: usize) -> u8 {
        let mover = self.get(from);
        let captured = self.get(to);
        let promoted = match (side_of(mover), kind_of(mover)) {
            (Some(side), Some(Kind::Pawn)) if coords(to).0 == side.last_row() => {
                piece(side, Kind::Queen)
            }
            _ => mover,
        };
        self.set(to, promoted);
        self.set(from, EMPTY);
        captured
    }

    /// Whether `side` may legally play `from` → `to`: its own piece, by
    /// that piece's movement rule, not leaving its own king in check.
    pub fn is_legal(&self, side: Side, from: usize, to: usize) -> bool {
        if side_of(self.get(from)) != Some(side) || !self.reaches(from, to) {
            return false;
        }
        let mut after = self.clone();
        after.apply_move(from, to);
        !after.in_check(side)
    }

    pub fn has_legal_move(&self, side: Side) -> bool {
        (0..SIZE)
            .filter(|&from| side_of(self.get(from)) == Some(side))
            .any(|from| (0..SIZE).any(|to| self.is_legal(side, from, to)))
    }

    /// Whether `side`'s king is attacked. A side without a king is never
    /// in check.
    pub fn in_check(&self, side: Side) -> bool {
        self.king_square(side)
            .is_some_and(|square| self.attacked_by(square, side.opponent()))
    }

    /// Threat scan outward from `square`: adjacent king, pawn diagonals,
    /// knight offsets, then the first occupant of each of the eight rays.
    pub fn attacked_by(&self, square: usize, attacker: Side) -> bool {
        let (r, c) = coords(square);
        let holds = |dr: i32, dc: i32, kind: Kind| {
            index(r + dr, c + dc).is_some_and(|i| self.get(i) == piece(attacker, kind))
        };

        if STRAIGHT
            .iter()
            .chain(DIAGONAL.iter())
            .any(|&(dr, dc)| holds(dr, dc, Kind::King))
        {
            return true;
        }

        // A pawn attacks diagonally forward, so it stands one row behind
        // the square from its own point of view.
        let back = -attacker.forward();
        if holds(back, -1, Kind::Pawn) || holds(back, 1, Kind::Pawn) {
            return true;
        }

        if KNIGHT_OFFSETS.iter().any(|&(dr, dc)| holds(dr, dc, Kind::Knight)) {
            return true;
        }

        let ray_hits = |dirs: &[(i32, i32)], slider: Kind| {
            dirs.iter().any(|&(dr, dc)| {
                let first = self.first_occupant(r, c, dr, dc);
                first == Some(piece(attacker, slider)) || first == Some(piece(attacker, Kind::Queen))
            })
        };
        ray_hits(&STRAIGHT, Kind::Rook) || ray_hits(&DIAGONAL, Kind::Bishop)
    }

    fn first_occupant(&self, r: i32, c: i32, dr: i32, dc: i32) -> Option<u8> {
        let (mut r, mut c) = (r + dr, c + dc);
        while let Some(i) = index(r, c) {
            let cell = self.get(i);
            if cell != EMPTY {
                return Some(cell);
            }
            r += dr;
            c += dc;
        }
        None
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WK: u8 = 6;
    const WQ: u8 = 5;
    const WR: u8 = 4;
    const WP: u8 = 1;
    const BK: u8 = 12;
    const BR: u8 = 10;
    const BB: u8 = 9;
    const BN: u8 = 8;
    const BP: u8 = 7;

    #[test]
    fn test_encoding_is_symmetric() {
        assert_eq!(piece(Side::White, Kind::King), WK);
        assert_eq!(piece(Side::Black, Kind::King), BK);
        assert_eq!(kind_of(BN), Some(Kind::Knight));
        assert_eq!(side_of(BN), Some(Side::Black));
        assert_eq!(side_of(EMPTY), None);
    }

    #[test]
    fn test_initial_layout() {
        let board = Board::initial();
        assert_eq!(board.king_square(Side::Black), Some(4));
        assert_eq!(board.king_square(Side::White), Some(60));
        assert_eq!(board.get(52), WP);
        assert_eq!(board.get(12), BP);
        assert_eq!(board.cells().iter().filter(|&&c| c == EMPTY).count(), 32);
    }

    #[test]
    fn test_pawn_steps() {
        let board = Board::initial();
        assert!(board.reaches(52, 44));
        assert!(board.reaches(52, 36));
        assert!(!board.reaches(52, 28));
        assert!(!board.reaches(52, 60));
        // No capture straight ahead, no diagonal move onto an empty cell.
        assert!(!board.reaches(52, 43));

        let blocked = Board::with_pieces(&[(52, WP), (44, BP)]);
        assert!(!blocked.reaches(52, 44));
        assert!(!blocked.reaches(52, 36));

        let capture = Board::with_pieces(&[(52, WP), (43, BP), (45, BN)]);
        assert!(capture.reaches(52, 43));
        assert!(capture.reaches(52, 45));
    }

    #[test]
    fn test_double_step_only_from_start_row() {
        let board = Board::with_pieces(&[(44, WP)]);
        assert!(!board.reaches(44, 28));
    }

    #[test]
    fn test_sliders_are_blocked() {
        let board = Board::initial();
        // Rook and bishop hemmed in by their own pawns.
        assert!(!board.reaches(56, 40));
        assert!(!board.reaches(58, 44));
        // Knights jump.
        assert!(board.reaches(57, 42));
        assert!(board.reaches(57, 40));
        assert!(!board.reaches(57, 41));

        let open = Board::with_pieces(&[(56, WR), (32, BP)]);
        assert!(open.reaches(56, 32));
        assert!(!open.reaches(56, 24));
    }

    #[test]
    fn test_knight_offsets_do_not_wrap() {
        let board = Board::with_pieces(&[(7, BN)]);
        assert!(!board.reaches(7, 8));
        assert!(board.reaches(7, 22));
    }

    #[test]
    fn test_promotion_to_queen() {
        let mut board = Board::with_pieces(&[(8, WP)]);
        board.apply_move(8, 0);
        assert_eq!(board.get(0), WQ);

        let mut board = Board::with_pieces(&[(55, BP)]);
        board.apply_move(55, 63);
        assert_eq!(board.get(63), piece(Side::Black, Kind::Queen));
    }

    #[test]
    fn test_check_by_each_threat_class() {
        // Rook on the same file.
        assert!(Board::with_pieces(&[(60, WK), (4, BR)]).in_check(Side::White));
        // Blocked rook.
        assert!(!Board::with_pieces(&[(60, WK), (52, WP), (4, BR)]).in_check(Side::White));
        // Bishop on a diagonal.
        assert!(Board::with_pieces(&[(60, WK), (33, BB)]).in_check(Side::White));
        // Knight.
        assert!(Board::with_pieces(&[(60, WK), (45, BN)]).in_check(Side::White));
        // Black pawn attacks downward the board.
        assert!(Board::with_pieces(&[(60, WK), (51, BP)]).in_check(Side::White));
        assert!(!Board::with_pieces(&[(60, WK), (59, BP)]).in_check(Side::White));
        // White pawn attacks upward.
        assert!(Board::with_pieces(&[(4, BK), (13, WP)]).in_check(Side::Black));
        // Adjacent king.
        assert!(Board::with_pieces(&[(60, WK), (52, BK)]).in_check(Side::White));
    }

    #[test]
    fn test_pinned_piece_cannot_move() {
        // White rook on e2 pinned by a black rook on e8.
        let board = Board::with_pieces(&[(60, WK), (52, WR), (4, BR)]);
        assert!(board.reaches(52, 51));
        assert!(!board.is_legal(Side::White, 52, 51));
        assert!(board.is_legal(Side::White, 52, 44));
    }

    #[test]
    fn test_checkmate_has_no_legal_move() {
        // Back-rank mate: king h1 boxed in by its pawns, rook delivers mate.
        let board = Board::with_pieces(&[(63, WK), (54, WP), (55, WP), (56, BR), (0, BK)]);
        assert!(board.in_check(Side::White));
        assert!(!board.has_legal_move(Side::White));
        assert!(board.has_legal_move(Side::Black));
    }
}
