//! Simulation metrics.

use serde::Serialize;

use arcade_blackjack::{Outcome, RoundSummary};

/// Simulation metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimulationMetrics {
    /// Rounds settled.
    pub rounds: u64,
    pub blackjacks: u64,
    pub wins: u64,
    pub pushes: u64,
    pub losses: u64,
    /// Rounds where the stake was doubled.
    pub doubles: u64,
    /// Rounds that ended with the bankruptcy floor.
    pub bankruptcies: u64,
    /// Deals the table refused.
    pub rejected_deals: u64,
    /// Sum of final stakes.
    pub total_wagered: u64,
    /// Net ledger movement from settlements, excluding bankruptcy top-ups.
    pub net: i64,
}

impl SimulationMetrics {
    /// Create new metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a settled round.
    pub fn record(&mut self, summary: &RoundSummary) {
        self.rounds += 1;
        match summary.outcome {
            Outcome::Blackjack => self.blackjacks += 1,
            Outcome::Win => self.wins += 1,
            Outcome::Push => self.pushes += 1,
            Outcome::Lose => self.losses += 1,
        }
        if summary.doubled {
            self.doubles += 1;
        }
        if summary.bankruptcy_reset {
            self.bankruptcies += 1;
        }
        self.total_wagered = self.total_wagered.saturating_add(summary.bet);
        self.net = self.net.saturating_add(summary.payout.net() as i64);
    }

    /// Record a refused deal.
    pub fn record_rejection(&mut self) {
        self.rejected_deals += 1;
    }

    /// Share of rounds won outright (including blackjacks).
    pub fn win_rate(&self) -> f64 {
        if self.rounds == 0 {
            return 0.0;
        }

        (self.wins + self.blackjacks) as f64 / self.rounds as f64
    }

    /// Amount returned per unit staked. 1.0 is break-even.
    pub fn return_to_player(&self) -> f64 {
        if self.total_wagered == 0 {
            return 0.0;
        }

        (self.total_wagered as f64 + self.net as f64) / self.total_wagered as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_blackjack::Payout;
    use arcade_common::RoundId;

    fn summary(outcome: Outcome, bet: u64, payout: Payout) -> RoundSummary {
        RoundSummary {
            round_id: RoundId::new(),
            outcome,
            bet,
            doubled: false,
            player_score: 0,
            dealer_score: 0,
            payout,
            balance_after: 100,
            bankruptcy_reset: false,
        }
    }

    #[test]
    fn test_metrics() {
        let mut metrics = SimulationMetrics::new();

        metrics.record(&summary(Outcome::Blackjack, 10, Payout::Credit(15)));
        metrics.record(&summary(Outcome::Win, 10, Payout::Credit(10)));
        metrics.record(&summary(Outcome::Push, 10, Payout::None));
        metrics.record(&RoundSummary {
            doubled: true,
            bankruptcy_reset: true,
            ..summary(Outcome::Lose, 20, Payout::Debit(20))
        });
        metrics.record_rejection();

        assert_eq!(metrics.rounds, 4);
        assert_eq!(metrics.blackjacks, 1);
        assert_eq!(metrics.wins, 1);
        assert_eq!(metrics.pushes, 1);
        assert_eq!(metrics.losses, 1);
        assert_eq!(metrics.doubles, 1);
        assert_eq!(metrics.bankruptcies, 1);
        assert_eq!(metrics.rejected_deals, 1);
        assert_eq!(metrics.total_wagered, 50);
        assert_eq!(metrics.net, 5);
        assert_eq!(metrics.win_rate(), 0.5);
        assert_eq!(metrics.return_to_player(), 1.1);
    }

    #[test]
    fn test_empty_metrics() {
        let metrics = SimulationMetrics::new();
        assert_eq!(metrics.win_rate(), 0.0);
        assert_eq!(metrics.return_to_player(), 0.0);
    }
}
