//! Round outcomes, payouts and summaries.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use arcade_common::RoundId;

/// How a round ended for the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Opening two cards scored 21.
    Blackjack,
    /// Dealer busted or scored lower.
    Win,
    /// Equal scores.
    Push,
    /// Player busted or scored lower.
    Lose,
}

impl Outcome {
    /// Ledger movement for this outcome on a stake of `bet`.
    ///
    /// Stakes stay in the ledger until resolution, so a push moves nothing.
    pub fn payout(&self, bet: u64, blackjack_payout: Decimal) -> Payout {
        match self {
            Outcome::Blackjack => Payout::Credit(scaled(bet, blackjack_payout)),
            Outcome::Win => Payout::Credit(bet),
            Outcome::Push => Payout::None,
            Outcome::Lose => Payout::Debit(bet),
        }
    }
}

fn scaled(bet: u64, multiplier: Decimal) -> u64 {
    Decimal::from(bet)
        .checked_mul(multiplier)
        .map(|v| v.floor())
        .and_then(|v| v.to_u64())
        .unwrap_or(u64::MAX)
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Outcome::Blackjack => "blackjack",
            Outcome::Win => "win",
            Outcome::Push => "push",
            Outcome::Lose => "lose",
        };
        f.write_str(name)
    }
}

/// Movement applied to the ledger at resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payout {
    /// Amount paid to the player.
    Credit(u64),
    /// Amount collected from the player.
    Debit(u64),
    /// Nothing moves.
    None,
}

impl Payout {
    /// Signed effect on the balance.
    pub fn net(&self) -> i128 {
        match self {
            Payout::Credit(n) => *n as i128,
            Payout::Debit(n) => -(*n as i128),
            Payout::None => 0,
        }
    }
}

/// Everything the UI needs to report a finished round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub round_id: RoundId,
    pub outcome: Outcome,
    /// Final stake, after any double.
    pub bet: u64,
    pub doubled: bool,
    pub player_score: u32,
    pub dealer_score: u32,
    /// What actually moved in the ledger.
    pub payout: Payout,
    /// Balance after payout and any bankruptcy reset.
    pub balance_after: u64,
    /// The balance hit zero and was restored to the bankruptcy floor.
    pub bankruptcy_reset: bool,
}

impl RoundSummary {
    /// Outcome line, e.g. "Blackjack! +$15".
    pub fn outcome_message(&self) -> String {
        match (self.outcome, self.payout) {
            (Outcome::Blackjack, Payout::Credit(n)) => format!("Blackjack! +${}", n),
            (Outcome::Win, Payout::Credit(n)) => format!("You win +${}", n),
            (Outcome::Lose, Payout::Debit(n)) => format!("You lose -${}", n),
            (Outcome::Lose, _) => "You lose".to_string(),
            _ => "Push: bet returned".to_string(),
        }
    }

    /// Headline for the round; the bankruptcy notice replaces the outcome
    /// line when the floor applied.
    pub fn message(&self) -> String {
        if self.bankruptcy_reset {
            format!("Bankruptcy: balance reset to ${}", self.balance_after)
        } else {
            self.outcome_message()
        }
    }
}

impl fmt::Display for RoundSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}
