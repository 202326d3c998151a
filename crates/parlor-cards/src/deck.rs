use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::{Card, SUITS};

const PIQUET_RANKS: [u8; 8] = [1, 7, 8, 9, 10, 11, 12, 13];

/// Which standard deck to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckSize {
    /// 32 cards: ace and 7 through king in every suit.
    Piquet,
    /// 52 cards: ace through king in every suit.
    Full,
}

impl DeckSize {
    pub fn ranks(self) -> Vec<u8> {
        match self {
            Self::Piquet => PIQUET_RANKS.to_vec(),
            Self::Full => (1..=13).collect(),
        }
    }
}

/// Where [`Deck::put_back`] inserts returned cards.
pub enum Placement<'a, R: Rng + ?Sized> {
    Top,
    Bottom,
    /// Each card goes to an independently chosen position.
    Random(&'a mut R),
}

/// An ordered pile of cards. The last element is the top.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Builds an unshuffled deck, suit by suit, every card face down.
    pub fn new(size: DeckSize) -> Self {
        let ranks = size.ranks();
        let cards = SUITS
            .iter()
            .flat_map(|&suit| {
                ranks.iter().map(move |&rank| Card { suit, rank, hidden: true })
            })
            .collect();
        Self { cards }
    }

    /// Builds a deck and shuffles it with `rng`.
    pub fn shuffled<R: Rng + ?Sized>(size: DeckSize, rng: &mut R) -> Self {
        let mut deck = Self::new(size);
        deck.shuffle(rng);
        deck
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Takes the top card, turning it face up when `reveal` is set.
    pub fn draw_one(&mut self, reveal: bool) -> Option<Card> {
        let mut card = self.cards.pop()?;
        if reveal {
            card.reveal();
        }
        Some(card)
    }

    /// Takes up to `n` cards from the top. The returned cards keep their
    /// pile order (the former top card is last).
    pub fn draw(&mut self, n: usize, reveal: bool) -> Vec<Card> {
        let at = self.cards.len().saturating_sub(n);
        let mut drawn = self.cards.split_off(at);
        if reveal {
            drawn.iter_mut().for_each(Card::reveal);
        }
        drawn
    }

    /// Returns cards to the pile face down.
    ///
    /// With [`Placement::Top`] the first returned card ends up on top.
    pub fn put_back<R: Rng + ?Sized>(&mut self, cards: Vec<Card>, place: Placement<'_, R>) {
        let hidden = cards.into_iter().map(|mut c| {
            c.conceal();
            c
        });
        match place {
            Placement::Top => {
                let mut hidden: Vec<Card> = hidden.collect();
                hidden.reverse();
                self.cards.extend(hidden);
            }
            Placement::Bottom => {
                let mut pile: Vec<Card> = hidden.collect();
                pile.append(&mut self.cards);
                self.cards = pile;
            }
            Placement::Random(rng) => {
                for card in hidden {
                    let at = rng.random_range(0..=self.cards.len());
                    self.cards.insert(at, card);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::Suit;

    type NoRng = StdRng;

    #[test]
    fn test_deck_sizes() {
        assert_eq!(Deck::new(DeckSize::Piquet).len(), 32);
        assert_eq!(Deck::new(DeckSize::Full).len(), 52);
    }

    #[test]
    fn test_new_deck_is_face_down_and_ordered_by_suit() {
        let deck = Deck::new(DeckSize::Piquet);
        assert!(deck.cards().iter().all(|c| c.hidden));
        assert_eq!(deck.cards()[0], Card { suit: Suit::Clubs, rank: 1, hidden: true });
        assert_eq!(deck.cards()[31].suit, Suit::Hearts);
    }

    #[test]
    fn test_shuffle_is_deterministic_per_seed_and_keeps_cards() {
        let a = Deck::shuffled(DeckSize::Full, &mut StdRng::seed_from_u64(7));
        let b = Deck::shuffled(DeckSize::Full, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);

        let mut sorted: Vec<(usize, u8)> =
            a.cards().iter().map(|c| (c.suit.index(), c.rank)).collect();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 52);
    }

    #[test]
    fn test_draw_one_takes_top_and_reveals() {
        let mut deck = Deck::new(DeckSize::Piquet);
        let top = *deck.cards().last().unwrap();
        let drawn = deck.draw_one(true).unwrap();
        assert!(drawn.same_face(&top));
        assert!(!drawn.hidden);
        assert_eq!(deck.len(), 31);
    }

    #[test]
    fn test_draw_more_than_available_empties_deck() {
        let mut deck = Deck::new(DeckSize::Piquet);
        let drawn = deck.draw(40, false);
        assert_eq!(drawn.len(), 32);
        assert!(deck.is_empty());
        assert!(deck.draw_one(true).is_none());
    }

    #[test]
    fn test_put_back_top_and_bottom() {
        let mut deck = Deck::new(DeckSize::Piquet);
        let drawn = deck.draw(2, true);
        let (under, over) = (drawn[0], drawn[1]);

        deck.put_back::<NoRng>(vec![over, under], Placement::Top);
        let top = deck.draw_one(false).unwrap();
        assert!(top.same_face(&over));
        assert!(top.hidden);

        deck.put_back::<NoRng>(vec![top], Placement::Bottom);
        assert!(deck.cards()[0].same_face(&over));
    }

    #[test]
    fn test_put_back_random_keeps_count() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut deck = Deck::new(DeckSize::Piquet);
        let drawn = deck.draw(5, true);
        deck.put_back(drawn, Placement::Random(&mut rng));
        assert_eq!(deck.len(), 32);
        assert!(deck.cards().iter().all(|c| c.hidden));
    }
}
