//! Simulation controller.

use std::sync::Arc;

use tracing::{debug, info, warn};

use arcade_blackjack::{
    Action, BlackjackEngine, DeckSource, RoundError, RoundState, ShuffledDecks, TableConfig,
};
use arcade_ledger::Ledger;

use crate::metrics::SimulationMetrics;
use crate::strategy::{Decision, Strategy};

/// Plays a session of blackjack rounds with a fixed strategy.
pub struct SimulationController<S: DeckSource = ShuffledDecks> {
    /// Rounds to play.
    rounds: u64,
    /// Stake per round.
    bet: u64,
    strategy: Strategy,
    engine: BlackjackEngine<S>,
    metrics: SimulationMetrics,
}

impl SimulationController<ShuffledDecks> {
    /// Create a new simulation controller.
    pub fn new(
        ledger: Arc<Ledger>,
        table: TableConfig,
        strategy: Strategy,
        rounds: u64,
        bet: u64,
        seed: Option<u64>,
    ) -> Self {
        let decks = match seed {
            Some(s) => ShuffledDecks::seeded(s),
            None => ShuffledDecks::from_entropy(),
        };
        Self::with_decks(ledger, table, decks, strategy, rounds, bet)
    }
}

impl<S: DeckSource> SimulationController<S> {
    /// Controller dealing from `decks`.
    pub fn with_decks(
        ledger: Arc<Ledger>,
        table: TableConfig,
        decks: S,
        strategy: Strategy,
        rounds: u64,
        bet: u64,
    ) -> Self {
        Self {
            rounds,
            bet,
            strategy,
            engine: BlackjackEngine::open_with_decks(ledger, table, decks),
            metrics: SimulationMetrics::new(),
        }
    }

    /// Play every round.
    pub fn run(&mut self) -> anyhow::Result<()> {
        info!(
            rounds = self.rounds,
            bet = self.bet,
            strategy = self.strategy.name(),
            balance = self.engine.balance(),
            "Running simulation"
        );

        for _ in 0..self.rounds {
            self.play_round()?;
        }

        Ok(())
    }

    /// Play one round to resolution.
    fn play_round(&mut self) -> anyhow::Result<()> {
        let mut action = match self.engine.deal(self.bet) {
            Ok(action) => action,
            Err(RoundError::BetExceedsBalance { bet, balance }) => {
                // Go all in with what is left.
                debug!(bet, balance, "Stake above balance, betting the balance");
                self.metrics.record_rejection();
                self.engine.deal(self.engine.max_bet())?
            }
            Err(e) => return Err(e.into()),
        };

        while action == Action::Continue {
            let decision = match self.engine.round() {
                Some(round) => match round.dealer().cards().get(1) {
                    Some(up_card) => self.strategy.decide(round.player(), *up_card),
                    None => Decision::Stand,
                },
                None => break,
            };

            action = match decision {
                Decision::Stand => self.engine.stand(),
                Decision::Double if self.engine.available_actions().can_double => {
                    self.engine.double()?
                }
                Decision::Double | Decision::Hit => self.engine.hit()?,
            };
        }

        match action.summary() {
            Some(summary) => {
                debug!(
                    round_id = %summary.round_id,
                    outcome = %summary.outcome,
                    balance = summary.balance_after,
                    "Round played"
                );
                self.metrics.record(summary);
            }
            None => {
                warn!(state = ?self.engine.state(), "Round ended without a settlement");
            }
        }

        debug_assert_eq!(self.engine.state(), RoundState::Resolved);
        Ok(())
    }

    /// Get simulation metrics.
    pub fn metrics(&self) -> &SimulationMetrics {
        &self.metrics
    }

    /// Balance after the session.
    pub fn balance(&self) -> u64 {
        self.engine.balance()
    }
}
