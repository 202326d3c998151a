use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Clubs,
    Diamonds,
    Spades,
    Hearts,
}

/// Canonical suit order. Grids and ace slots that are laid out "by suit"
/// use this order.
pub const SUITS: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Spades, Suit::Hearts];

impl Suit {
    /// Position of this suit in [`SUITS`].
    pub fn index(self) -> usize {
        match self {
            Self::Clubs => 0,
            Self::Diamonds => 1,
            Self::Spades => 2,
            Self::Hearts => 3,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Clubs => "clubs",
            Self::Diamonds => "diamonds",
            Self::Spades => "spades",
            Self::Hearts => "hearts",
        };
        f.write_str(name)
    }
}

/// A playing card. Rank 1 is the ace, 11–13 are jack, queen, king.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub suit: Suit,
    pub rank: u8,
    pub hidden: bool,
}

impl Card {
    pub const ACE: u8 = 1;

    /// A face-up card.
    pub fn new(suit: Suit, rank: u8) -> Self {
        Self { suit, rank, hidden: false }
    }

    pub fn is_ace(&self) -> bool {
        self.rank == Self::ACE
    }

    /// Same rank and suit, ignoring which way up the cards lie.
    pub fn same_face(&self, other: &Card) -> bool {
        self.rank == other.rank && self.suit == other.suit
    }

    pub fn reveal(&mut self) {
        self.hidden = false;
    }

    pub fn conceal(&mut self) {
        self.hidden = true;
    }

    /// `"Ace"`, `"Jack"`, `"7"`...
    pub fn rank_name(rank: u8) -> String {
        match rank {
            1 => "Ace".to_owned(),
            11 => "Jack".to_owned(),
            12 => "Queen".to_owned(),
            13 => "King".to_owned(),
            n => n.to_string(),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {}", Self::rank_name(self.rank), self.suit)
    }
}
