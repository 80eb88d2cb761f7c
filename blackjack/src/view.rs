//! Read-only table views for a UI layer.

use serde::{Deserialize, Serialize};

use arcade_common::RoundId;

use crate::card::Card;
use crate::outcome::Outcome;
use crate::round::{Round, RoundState};

/// Which controls the player may use right now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableActions {
    pub can_deal: bool,
    pub can_hit: bool,
    pub can_stand: bool,
    pub can_double: bool,
}

/// Table state as a player sees it.
///
/// While a round is in progress the dealer's hole card is `None` and the
/// dealer score is withheld.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub round_id: Option<RoundId>,
    pub state: RoundState,
    pub bet: u64,
    pub balance: u64,
    pub player_cards: Vec<Card>,
    pub player_score: u32,
    pub dealer_cards: Vec<Option<Card>>,
    pub dealer_score: Option<u32>,
    pub outcome: Option<Outcome>,
    pub actions: AvailableActions,
    pub message: Option<String>,
}

impl RoundSnapshot {
    /// Empty table before the first deal.
    pub fn idle(balance: u64, actions: AvailableActions) -> Self {
        Self {
            round_id: None,
            state: RoundState::NotStarted,
            bet: 0,
            balance,
            player_cards: Vec::new(),
            player_score: 0,
            dealer_cards: Vec::new(),
            dealer_score: None,
            outcome: None,
            actions,
            message: None,
        }
    }

    /// View of `round`.
    pub fn of_round(
        round: &Round,
        balance: u64,
        actions: AvailableActions,
        message: Option<String>,
    ) -> Self {
        let hide_hole = round.state() == RoundState::InProgress;
        let dealer_cards = round
            .dealer()
            .cards()
            .iter()
            .enumerate()
            .map(|(i, card)| if hide_hole && i == 0 { None } else { Some(*card) })
            .collect();

        Self {
            round_id: Some(round.id()),
            state: round.state(),
            bet: round.bet(),
            balance,
            player_cards: round.player().cards().to_vec(),
            player_score: round.player().score(),
            dealer_cards,
            dealer_score: (!hide_hole).then(|| round.dealer().score()),
            outcome: round.outcome(),
            actions,
            message,
        }
    }

    /// Whether the dealer's hole card is hidden.
    pub fn hole_card_hidden(&self) -> bool {
        matches!(self.dealer_cards.first(), Some(None))
    }
}
