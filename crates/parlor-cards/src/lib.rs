//! Playing cards for Parlor's card games.
//!
//! - [`Card`]: a suit, a rank in `1..=13`, and whether it lies face down.
//! - [`Deck`]: an ordered pile with shuffling, drawing from the top, and
//!   putting cards back.

mod card;
mod deck;

pub use card::{Card, Suit, SUITS};
pub use deck::{Deck, DeckSize, Placement};
