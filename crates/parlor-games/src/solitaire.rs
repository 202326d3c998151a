//! Solitaire.
//!
//! A 32-card deck is dealt into a 4×7 face-down grid, a 3-card reserve
//! and one card in hand. Every grid cell has an expected card: suit by
//! row, ranks 7 through king along the row. The player swaps the hand
//! card into its cell, picking up whatever lay there, and lays aces
//! aside as they turn up. When the fourth ace is laid the grid is turned
//! over: the game is won if every card sits in its own cell.
//!
//! The creator of the room is the player; everyone else watches.

use parlor_cards::{Card, Deck, DeckSize, SUITS, Suit};
use parlor_room::{CommandError, Game, Notice};
use parlor_transport::ConnectionId;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const GRID: usize = 28;
pub const ROW: usize = 7;
pub const RESERVE: usize = 3;

const ROW_RANKS: [u8; ROW] = [7, 8, 9, 10, 11, 12, 13];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Playing,
    Won,
    Lost,
}

/// The suit and rank that belong in grid cell `i`.
pub fn expected(i: usize) -> Option<(Suit, u8)> {
    (i < GRID).then(|| (SUITS[i / ROW], ROW_RANKS[i % ROW]))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolitaireState {
    pub grid: Vec<Card>,
    pub reserve: [Option<Card>; RESERVE],
    pub hand: Option<Card>,
    /// Laid aces, one slot per suit in [`SUITS`] order.
    pub aces: [Option<Card>; 4],
    pub player: ConnectionId,
    pub outcome: Outcome,
}

impl SolitaireState {
    /// Deals a fresh game for `player` from a deck shuffled with `rng`.
    pub fn deal<R: Rng + ?Sized>(player: ConnectionId, rng: &mut R) -> Self {
        let mut deck = Deck::shuffled(DeckSize::Piquet, rng);
        let grid = deck.draw(GRID, false);
        let mut reserve = [None; RESERVE];
        for slot in &mut reserve {
            *slot = deck.draw_one(false);
        }
        let hand = deck.draw_one(true);
        Self {
            grid,
            reserve,
            hand,
            aces: [None; 4],
            player,
            outcome: Outcome::Playing,
        }
    }

    fn require_player(&self, sender: ConnectionId) -> Result<(), CommandError> {
        if sender != self.player {
            return Err(CommandError::NotParticipant(sender));
        }
        if self.outcome != Outcome::Playing {
            return Err(CommandError::illegal("the game is over"));
        }
        Ok(())
    }

    fn swap_card(&mut self, sender: ConnectionId, i: usize) -> Result<(), CommandError> {
        self.require_player(sender)?;
        let (suit, rank) =
            expected(i).ok_or_else(|| CommandError::malformed(format!("no cell {i}")))?;
        let held = self
            .hand
            .filter(|c| !c.is_ace())
            .ok_or_else(|| CommandError::illegal("no card to swap in hand"))?;
        if !held.same_face(&Card::new(suit, rank)) {
            return Err(CommandError::illegal(format!("{held} doesn't belong in cell {i}")));
        }

        let mut picked = std::mem::replace(&mut self.grid[i], Card::new(suit, rank));
        picked.reveal();
        self.hand = Some(picked);
        Ok(())
    }

    fn place_ace(&mut self, sender: ConnectionId, slot: usize) -> Result<(), CommandError> {
        self.require_player(sender)?;
        if slot >= self.aces.len() {
            return Err(CommandError::malformed(format!("no ace slot {slot}")));
        }
        let ace = self
            .hand
            .filter(Card::is_ace)
            .ok_or_else(|| CommandError::illegal("no ace in hand"))?;
        if ace.suit.index() != slot {
            return Err(CommandError::illegal(format!("{ace} doesn't go in slot {slot}")));
        }
        if self.aces[slot].is_some() {
            return Err(CommandError::illegal(format!("slot {slot} is taken")));
        }

        self.aces[slot] = Some(ace);
        self.hand = None;

        if self.aces.iter().all(Option::is_some) {
            for card in &mut self.grid {
                card.reveal();
            }
            let all_home = self.grid.iter().enumerate().all(|(i, card)| {
                expected(i).is_some_and(|(suit, rank)| card.same_face(&Card::new(suit, rank)))
            });
            self.outcome = if all_home { Outcome::Won } else { Outcome::Lost };
            tracing::info!(outcome = ?self.outcome, "solitaire game over");
        }
        Ok(())
    }

    fn move_hand(&mut self, sender: ConnectionId, r: usize) -> Result<(), CommandError> {
        self.require_player(sender)?;
        if r >= RESERVE {
            return Err(CommandError::malformed(format!("no reserve slot {r}")));
        }
        if self.hand.is_some() {
            return Err(CommandError::illegal("the hand is not empty"));
        }
        let mut card = self.reserve[r]
            .take()
            .ok_or_else(|| CommandError::illegal(format!("reserve slot {r} is empty")))?;
        card.reveal();
        self.hand = Some(card);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "args", rename_all = "snake_case")]
pub enum SolitaireCommand {
    SwapCard(usize),
    PlaceAce(usize),
    MoveHand(usize),
}

pub struct Solitaire;

impl Game for Solitaire {
    type State = SolitaireState;
    type Command = SolitaireCommand;

    fn init(creator: ConnectionId) -> SolitaireState {
        SolitaireState::deal(creator, &mut rand::rng())
    }

    fn handle_command(
        state: &mut SolitaireState,
        sender: ConnectionId,
        command: SolitaireCommand,
    ) -> Result<(), CommandError> {
        match command {
            SolitaireCommand::SwapCard(i) => state.swap_card(sender, i),
            SolitaireCommand::PlaceAce(slot) => state.place_ace(sender, slot),
            SolitaireCommand::MoveHand(r) => state.move_hand(sender, r),
        }
    }

    /// The first spectator left takes over an abandoned game.
    fn on_leave(state: &mut SolitaireState, leaver: ConnectionId, remaining: &[ConnectionId]) {
        if state.player == leaver {
            if let Some(&next) = remaining.first() {
                state.player = next;
                tracing::debug!(player = %next, "solitaire player changed");
            }
        }
    }

    fn join_notice(state: &SolitaireState, occupants: &[ConnectionId]) -> Option<Notice> {
        let spectators = occupants.iter().filter(|c| **c != state.player).count();
        Some(Notice {
            event: "spectators",
            data: json!(spectators),
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn cid(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    fn hidden(suit: Suit, rank: u8) -> Card {
        Card { suit, rank, hidden: true }
    }

    /// A grid where every cell holds its own card, face down.
    fn solved_grid() -> Vec<Card> {
        (0..GRID)
            .filter_map(expected)
            .map(|(suit, rank)| hidden(suit, rank))
            .collect()
    }

    fn state_with(grid: Vec<Card>, hand: Option<Card>) -> SolitaireState {
        SolitaireState {
            grid,
            reserve: [None; RESERVE],
            hand,
            aces: [None; 4],
            player: cid(1),
            outcome: Outcome::Playing,
        }
    }

    #[test]
    fn test_expected_card_by_index() {
        assert_eq!(expected(0), Some((Suit::Clubs, 7)));
        assert_eq!(expected(6), Some((Suit::Clubs, 13)));
        assert_eq!(expected(7), Some((Suit::Diamonds, 7)));
        assert_eq!(expected(27), Some((Suit::Hearts, 13)));
        assert_eq!(expected(28), None);
    }

    #[test]
    fn test_deal_layout() {
        let state = SolitaireState::deal(cid(1), &mut StdRng::seed_from_u64(3));
        assert_eq!(state.grid.len(), GRID);
        assert!(state.grid.iter().all(|c| c.hidden));
        assert!(state.reserve.iter().all(|c| c.is_some_and(|c| c.hidden)));
        assert!(state.hand.is_some_and(|c| !c.hidden));
        assert_eq!(state.aces, [None; 4]);
        assert_eq!(state.outcome, Outcome::Playing);
    }

    #[test]
    fn test_swap_requires_matching_card() {
        let mut grid = solved_grid();
        grid[3] = hidden(Suit::Spades, 8);
        let mut state = state_with(grid, Some(Card::new(Suit::Clubs, 10)));

        assert!(state.swap_card(cid(1), 4).is_err());
        assert_eq!(state.swap_card(cid(2), 3), Err(CommandError::NotParticipant(cid(2))));
        assert!(matches!(state.swap_card(cid(1), 28), Err(CommandError::MalformedInput(_))));

        state.swap_card(cid(1), 3).unwrap();
        assert_eq!(state.grid[3], Card::new(Suit::Clubs, 10));
        assert_eq!(state.hand, Some(Card::new(Suit::Spades, 8)));
    }

    #[test]
    fn test_aces_cannot_be_swapped() {
        let mut state = state_with(solved_grid(), Some(Card::new(Suit::Clubs, 1)));
        assert!(state.swap_card(cid(1), 0).is_err());
    }

    #[test]
    fn test_place_ace_in_its_own_slot() {
        let mut state = state_with(solved_grid(), Some(Card::new(Suit::Spades, 1)));
        assert!(state.place_ace(cid(1), 0).is_err());
        state.place_ace(cid(1), 2).unwrap();
        assert_eq!(state.aces[2], Some(Card::new(Suit::Spades, 1)));
        assert_eq!(state.hand, None);
        assert_eq!(state.outcome, Outcome::Playing);
    }

    #[test]
    fn test_fourth_ace_reveals_grid_and_wins() {
        let mut state = state_with(solved_grid(), Some(Card::new(Suit::Hearts, 1)));
        state.aces = [
            Some(Card::new(Suit::Clubs, 1)),
            Some(Card::new(Suit::Diamonds, 1)),
            Some(Card::new(Suit::Spades, 1)),
            None,
        ];
        state.place_ace(cid(1), 3).unwrap();
        assert!(state.grid.iter().all(|c| !c.hidden));
        assert_eq!(state.outcome, Outcome::Won);
        assert!(state.move_hand(cid(1), 0).is_err());
    }

    #[test]
    fn test_fourth_ace_with_misplaced_card_loses() {
        let mut grid = solved_grid();
        grid.swap(0, 1);
        let mut state = state_with(grid, Some(Card::new(Suit::Hearts, 1)));
        state.aces = [
            Some(Card::new(Suit::Clubs, 1)),
            Some(Card::new(Suit::Diamonds, 1)),
            Some(Card::new(Suit::Spades, 1)),
            None,
        ];
        state.place_ace(cid(1), 3).unwrap();
        assert_eq!(state.outcome, Outcome::Lost);
    }

    #[test]
    fn test_move_hand_only_when_empty() {
        let mut state = state_with(solved_grid(), Some(Card::new(Suit::Clubs, 1)));
        state.reserve[1] = Some(hidden(Suit::Hearts, 9));
        assert!(state.move_hand(cid(1), 1).is_err());

        state.place_ace(cid(1), 0).unwrap();
        assert!(state.move_hand(cid(1), 0).is_err());
        state.move_hand(cid(1), 1).unwrap();
        assert_eq!(state.hand, Some(Card::new(Suit::Hearts, 9)));
        assert_eq!(state.reserve[1], None);
    }

    #[test]
    fn test_player_leaving_hands_game_to_first_spectator() {
        let mut state = state_with(solved_grid(), Some(Card::new(Suit::Clubs, 1)));
        Solitaire::on_leave(&mut state, cid(3), &[cid(1), cid(2)]);
        assert_eq!(state.player, cid(1));

        Solitaire::on_leave(&mut state, cid(1), &[cid(2), cid(3)]);
        assert_eq!(state.player, cid(2));
        assert_eq!(state.place_ace(cid(1), 0), Err(CommandError::NotParticipant(cid(1))));
        state.place_ace(cid(2), 0).unwrap();
        assert_eq!(state.hand, None);
    }

    #[test]
    fn test_spectator_notice_counts_others() {
        let state = state_with(solved_grid(), None);
        let notice = Solitaire::join_notice(&state, &[cid(1), cid(2), cid(3)]).unwrap();
        assert_eq!(notice.event, "spectators");
        assert_eq!(notice.data, json!(2));
    }
}
