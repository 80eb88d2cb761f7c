//! Single-round blackjack state machine.
//!
//! A [`Round`] owns its deck and both hands. It knows nothing about the
//! ledger: callers check funds before dealing and settle the returned
//! [`Outcome`] themselves.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use arcade_common::RoundId;

use crate::card::Card;
use crate::deck::Deck;
use crate::error::{RoundError, RoundResult};
use crate::hand::Hand;
use crate::outcome::Outcome;

/// Lifecycle of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundState {
    /// Bet accepted, no cards dealt yet.
    NotStarted,
    /// Player may hit, stand or double.
    InProgress,
    /// Outcome decided.
    Resolved,
}

impl RoundState {
    /// Get valid next states from current state.
    pub fn valid_transitions(&self) -> &[RoundState] {
        match self {
            RoundState::NotStarted => &[RoundState::InProgress, RoundState::Resolved],
            RoundState::InProgress => &[RoundState::Resolved],
            RoundState::Resolved => &[],
        }
    }

    /// Check if transition to given state is valid.
    pub fn can_transition_to(&self, next: RoundState) -> bool {
        self.valid_transitions().contains(&next)
    }
}

/// What an action did to the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The round was not in a state that accepts the action.
    Ignored,
    /// The player is still to act.
    Continue,
    /// The round ended.
    Resolved(Outcome),
}

/// One round of blackjack from deal to outcome.
#[derive(Debug, Clone)]
pub struct Round {
    id: RoundId,
    state: RoundState,
    bet: u64,
    doubled: bool,
    deck: Deck,
    player: Hand,
    dealer: Hand,
    outcome: Option<Outcome>,
    dealer_stands_on: u32,
}

impl Round {
    /// A round staking `bet`, dealt from `deck`.
    pub fn new(bet: u64, deck: Deck, dealer_stands_on: u32) -> Self {
        Self {
            id: RoundId::new(),
            state: RoundState::NotStarted,
            bet,
            doubled: false,
            deck,
            player: Hand::new(),
            dealer: Hand::new(),
            outcome: None,
            dealer_stands_on,
        }
    }

    pub fn id(&self) -> RoundId {
        self.id
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    /// Current stake.
    pub fn bet(&self) -> u64 {
        self.bet
    }

    /// Whether the stake was doubled.
    pub fn is_doubled(&self) -> bool {
        self.doubled
    }

    pub fn player(&self) -> &Hand {
        &self.player
    }

    /// Dealer hand. The first card is the hole card.
    pub fn dealer(&self) -> &Hand {
        &self.dealer
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Cards left in the round's deck.
    pub fn cards_remaining(&self) -> usize {
        self.deck.remaining()
    }

    /// Deal player, dealer, player, dealer.
    ///
    /// A natural on the player's first two cards resolves the round as
    /// [`Outcome::Blackjack`] straight away.
    pub fn deal(&mut self) -> RoundResult<Step> {
        if self.state != RoundState::NotStarted {
            return Ok(Step::Ignored);
        }
        if self.deck.remaining() < 4 {
            return Err(RoundError::DeckExhausted);
        }

        for _ in 0..2 {
            let card = self.draw()?;
            self.player.push(card);
            let card = self.draw()?;
            self.dealer.push(card);
        }

        debug!(
            round_id = %self.id,
            bet = self.bet,
            player_score = self.player.score(),
            "Round dealt"
        );

        if self.player.is_natural() {
            return Ok(self.resolve(Outcome::Blackjack));
        }

        self.state = RoundState::InProgress;
        Ok(Step::Continue)
    }

    /// Draw one card for the player. A bust loses immediately.
    pub fn hit(&mut self) -> RoundResult<Step> {
        if self.state != RoundState::InProgress {
            return Ok(Step::Ignored);
        }

        let card = self.draw()?;
        self.player.push(card);
        debug!(round_id = %self.id, card = %card, score = self.player.score(), "Player hits");

        if self.player.is_bust() {
            return Ok(self.resolve(Outcome::Lose));
        }
        Ok(Step::Continue)
    }

    /// End the player's turn and play out the dealer.
    pub fn stand(&mut self) -> Step {
        if self.state != RoundState::InProgress {
            return Step::Ignored;
        }
        self.play_dealer()
    }

    /// Double the stake, take exactly one card, then stand.
    ///
    /// Only legal on the opening two cards and when `available` covers the
    /// doubled stake. On rejection nothing changes.
    pub fn double(&mut self, available: u64) -> RoundResult<Step> {
        if self.state != RoundState::InProgress {
            return Ok(Step::Ignored);
        }
        if self.player.len() != 2 {
            return Err(RoundError::DoubleNotAllowed {
                cards: self.player.len(),
            });
        }

        let doubled_bet = self.bet.checked_mul(2).unwrap_or(u64::MAX);
        if doubled_bet > available {
            return Err(RoundError::InsufficientFundsToDouble {
                required: doubled_bet,
                available,
            });
        }

        let card = self.draw()?;
        self.bet = doubled_bet;
        self.doubled = true;
        self.player.push(card);
        debug!(round_id = %self.id, card = %card, bet = self.bet, "Player doubles");

        if self.player.is_bust() {
            return Ok(self.resolve(Outcome::Lose));
        }
        Ok(self.play_dealer())
    }

    fn play_dealer(&mut self) -> Step {
        while self.dealer.score() < self.dealer_stands_on {
            match self.deck.draw() {
                Some(card) => {
                    self.dealer.push(card);
                    debug!(round_id = %self.id, card = %card, score = self.dealer.score(), "Dealer draws");
                }
                None => {
                    warn!(round_id = %self.id, "Deck ran out during dealer play");
                    break;
                }
            }
        }

        let player = self.player.score();
        let dealer = self.dealer.score();
        let outcome = if self.dealer.is_bust() || player > dealer {
            Outcome::Win
        } else if player == dealer {
            Outcome::Push
        } else {
            Outcome::Lose
        };

        self.resolve(outcome)
    }

    fn resolve(&mut self, outcome: Outcome) -> Step {
        debug_assert!(self.state.can_transition_to(RoundState::Resolved));
        self.state = RoundState::Resolved;
        self.outcome = Some(outcome);

        info!(
            round_id = %self.id,
            outcome = %outcome,
            bet = self.bet,
            player_score = self.player.score(),
            dealer_score = self.dealer.score(),
            "Round resolved"
        );

        Step::Resolved(outcome)
    }

    fn draw(&mut self) -> RoundResult<Card> {
        self.deck.draw().ok_or(RoundError::DeckExhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Rank, Suit};

    fn c(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    /// Round over a deck whose first draws are `top`:
    /// player, dealer, player, dealer, then hits and dealer draws.
    fn round_with(bet: u64, top: &[Card]) -> Round {
        let deck = Deck::stacked(top).unwrap();
        Round::new(bet, deck, 17)
    }

    #[test]
    fn test_transitions() {
        assert!(RoundState::NotStarted.can_transition_to(RoundState::InProgress));
        assert!(RoundState::InProgress.can_transition_to(RoundState::Resolved));
        assert!(!RoundState::Resolved.can_transition_to(RoundState::InProgress));
        assert!(!RoundState::InProgress.can_transition_to(RoundState::NotStarted));
    }

    #[test]
    fn test_deal_order() {
        let top = [
            c(Rank::Ten, Suit::Spades),
            c(Rank::Five, Suit::Hearts),
            c(Rank::Nine, Suit::Spades),
            c(Rank::Six, Suit::Hearts),
        ];
        let mut round = round_with(10, &top);
        assert_eq!(round.deal(), Ok(Step::Continue));
        assert_eq!(round.state(), RoundState::InProgress);
        assert_eq!(round.player().cards(), &[top[0], top[2]]);
        assert_eq!(round.dealer().cards(), &[top[1], top[3]]);
        assert_eq!(round.cards_remaining(), 48);
    }

    #[test]
    fn test_natural_resolves_on_deal() {
        let top = [
            c(Rank::Ace, Suit::Spades),
            c(Rank::Five, Suit::Hearts),
            c(Rank::King, Suit::Spades),
            c(Rank::Six, Suit::Hearts),
        ];
        let mut round = round_with(10, &top);
        assert_eq!(round.deal(), Ok(Step::Resolved(Outcome::Blackjack)));
        assert_eq!(round.state(), RoundState::Resolved);
        // Dealer does not draw.
        assert_eq!(round.dealer().len(), 2);
    }

    #[test]
    fn test_hit_bust_loses_without_dealer_draw() {
        let top = [
            c(Rank::Ten, Suit::Spades),
            c(Rank::Five, Suit::Hearts),
            c(Rank::Six, Suit::Spades),
            c(Rank::Six, Suit::Hearts),
            c(Rank::King, Suit::Clubs),
        ];
        let mut round = round_with(10, &top);
        round.deal().unwrap();
        assert_eq!(round.hit(), Ok(Step::Resolved(Outcome::Lose)));
        assert_eq!(round.dealer().len(), 2);
        assert_eq!(round.player().score(), 26);
    }

    #[test]
    fn test_dealer_draws_to_seventeen() {
        let top = [
            c(Rank::Ten, Suit::Spades),
            c(Rank::Two, Suit::Hearts),
            c(Rank::Eight, Suit::Spades),
            c(Rank::Three, Suit::Hearts),
            c(Rank::Four, Suit::Clubs),
            c(Rank::Two, Suit::Clubs),
            c(Rank::Six, Suit::Clubs),
        ];
        let mut round = round_with(10, &top);
        round.deal().unwrap();
        // 5 -> 9 -> 11 -> 17, player holds 18.
        assert_eq!(round.stand(), Step::Resolved(Outcome::Win));
        assert_eq!(round.dealer().score(), 17);
        assert_eq!(round.dealer().len(), 5);
    }

    #[test]
    fn test_push_and_win() {
        let top = [
            c(Rank::Ten, Suit::Spades),
            c(Rank::Ten, Suit::Hearts),
            c(Rank::Nine, Suit::Spades),
            c(Rank::Nine, Suit::Hearts),
        ];
        let mut round = round_with(10, &top);
        round.deal().unwrap();
        assert_eq!(round.stand(), Step::Resolved(Outcome::Push));

        let top = [
            c(Rank::Ten, Suit::Spades),
            c(Rank::Ten, Suit::Hearts),
            c(Rank::Queen, Suit::Spades),
            c(Rank::Eight, Suit::Hearts),
        ];
        let mut round = round_with(10, &top);
        round.deal().unwrap();
        assert_eq!(round.stand(), Step::Resolved(Outcome::Win));
    }

    #[test]
    fn test_double_draws_one_card_and_stands() {
        let top = [
            c(Rank::Five, Suit::Spades),
            c(Rank::Ten, Suit::Hearts),
            c(Rank::Six, Suit::Spades),
            c(Rank::Seven, Suit::Hearts),
            c(Rank::Ten, Suit::Clubs),
        ];
        let mut round = round_with(10, &top);
        round.deal().unwrap();
        assert_eq!(round.double(20), Ok(Step::Resolved(Outcome::Win)));
        assert_eq!(round.bet(), 20);
        assert!(round.is_doubled());
        assert_eq!(round.player().len(), 3);
        assert_eq!(round.dealer().len(), 2);
    }

    #[test]
    fn test_double_rejections_leave_round_untouched() {
        let top = [
            c(Rank::Two, Suit::Spades),
            c(Rank::King, Suit::Hearts),
            c(Rank::Three, Suit::Spades),
            c(Rank::Seven, Suit::Hearts),
            c(Rank::Four, Suit::Spades),
        ];
        let mut round = round_with(50, &top);
        round.deal().unwrap();

        assert_eq!(
            round.double(99),
            Err(RoundError::InsufficientFundsToDouble {
                required: 100,
                available: 99
            })
        );
        assert_eq!(round.bet(), 50);
        assert_eq!(round.player().len(), 2);

        round.hit().unwrap();
        let remaining = round.cards_remaining();
        assert_eq!(round.double(1_000), Err(RoundError::DoubleNotAllowed { cards: 3 }));
        assert_eq!(round.bet(), 50);
        assert_eq!(round.state(), RoundState::InProgress);
        assert_eq!(round.cards_remaining(), remaining);
    }

    #[test]
    fn test_actions_ignored_outside_play() {
        let mut round = round_with(10, &[]);
        assert_eq!(round.hit(), Ok(Step::Ignored));
        assert_eq!(round.stand(), Step::Ignored);
        assert_eq!(round.double(100), Ok(Step::Ignored));
        assert_eq!(round.cards_remaining(), 52);

        let top = [
            c(Rank::Ace, Suit::Spades),
            c(Rank::Five, Suit::Hearts),
            c(Rank::King, Suit::Spades),
            c(Rank::Six, Suit::Hearts),
        ];
        let mut round = round_with(10, &top);
        round.deal().unwrap();
        let player = round.player().clone();
        assert_eq!(round.hit(), Ok(Step::Ignored));
        assert_eq!(round.stand(), Step::Ignored);
        assert_eq!(round.deal(), Ok(Step::Ignored));
        assert_eq!(round.player(), &player);
        assert_eq!(round.outcome(), Some(Outcome::Blackjack));
    }
}
