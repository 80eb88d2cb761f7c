//! Hands and hand scoring.

use serde::{Deserialize, Serialize};

use crate::card::Card;

/// Highest score that is not a bust.
pub const BLACKJACK: u32 = 21;

/// Score a set of cards.
///
/// Aces start at 11; while the total is over 21 and an ace is still counted
/// high, one ace drops to 1.
pub fn score(cards: &[Card]) -> u32 {
    let (total, _) = score_with_soft_aces(cards);
    total
}

/// Whether at least one ace is still counted as 11.
pub fn is_soft(cards: &[Card]) -> bool {
    let (_, soft_aces) = score_with_soft_aces(cards);
    soft_aces > 0
}

fn score_with_soft_aces(cards: &[Card]) -> (u32, u32) {
    let mut total: u32 = 0;
    let mut soft_aces: u32 = 0;

    for card in cards {
        total += card.value();
        if card.rank.is_ace() {
            soft_aces += 1;
        }
    }

    while total > BLACKJACK && soft_aces > 0 {
        total -= 10;
        soft_aces -= 1;
    }

    (total, soft_aces)
}

/// An append-only hand of cards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    /// Empty hand.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a card.
    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Cards in the order they were dealt.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Number of cards held.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether no card has been dealt.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Current score.
    pub fn score(&self) -> u32 {
        score(&self.cards)
    }

    /// Whether an ace is still counted as 11.
    pub fn is_soft(&self) -> bool {
        is_soft(&self.cards)
    }

    /// Whether the score is over 21.
    pub fn is_bust(&self) -> bool {
        self.score() > BLACKJACK
    }

    /// Two cards scoring 21.
    pub fn is_natural(&self) -> bool {
        self.cards.len() == 2 && self.score() == BLACKJACK
    }
}

impl FromIterator<Card> for Hand {
    fn from_iter<I: IntoIterator<Item = Card>>(iter: I) -> Self {
        Self {
            cards: iter.into_iter().collect(),
        }
    }
}
