//! The 52-card deck and where rounds get their decks from.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use arcade_common::shuffle;

use crate::card::{Card, Rank, Suit};

/// Cards in a standard deck.
pub const DECK_SIZE: usize = 52;

/// A single 52-card deck, consumed from the top.
#[derive(Debug, Clone)]
pub struct Deck {
    // Top of the deck is the end of the vector.
    cards: Vec<Card>,
}

impl Deck {
    /// Unshuffled deck, suit by suit, ace to king. `draw` yields the ace of
    /// spades first.
    pub fn standard() -> Self {
        let mut cards = standard_order();
        cards.reverse();
        Self { cards }
    }

    /// Freshly shuffled deck.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut cards = standard_order();
        shuffle(&mut cards, rng);
        Self { cards }
    }

    /// Deck whose first draws are `top`, in order, followed by the remaining
    /// cards in standard order.
    ///
    /// Returns `None` if `top` repeats a card.
    pub fn stacked(top: &[Card]) -> Option<Self> {
        let mut order = Vec::with_capacity(DECK_SIZE);
        for card in top {
            if order.contains(card) {
                return None;
            }
            order.push(*card);
        }
        order.extend(standard_order().into_iter().filter(|c| !top.contains(c)));
        order.reverse();
        Some(Self { cards: order })
    }

    /// Remove and return the top card.
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Cards left to draw.
    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    /// Whether every card has been drawn.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

fn standard_order() -> Vec<Card> {
    Suit::ALL
        .into_iter()
        .flat_map(|suit| Rank::ALL.into_iter().map(move |rank| Card::new(rank, suit)))
        .collect()
}

/// Supplies a fresh deck for every round.
pub trait DeckSource: Send {
    /// Build the deck for the next round.
    fn next_deck(&mut self) -> Deck;
}

/// Uniformly shuffled decks from a random number generator.
pub struct ShuffledDecks<R = StdRng> {
    rng: R,
}

impl ShuffledDecks<StdRng> {
    /// Decks seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Reproducible decks for a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ShuffledDecks<R> {
    /// Decks drawn from `rng`.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng + Send> DeckSource for ShuffledDecks<R> {
    fn next_deck(&mut self) -> Deck {
        Deck::shuffled(&mut self.rng)
    }
}
