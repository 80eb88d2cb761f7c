//! Blackjack table: runs rounds and settles them against the shared ledger.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use arcade_ledger::Ledger;

use crate::bet::parse_bet;
use crate::config::TableConfig;
use crate::deck::{DeckSource, ShuffledDecks};
use crate::error::{RoundError, RoundResult};
use crate::outcome::{Outcome, Payout, RoundSummary};
use crate::round::{Round, RoundState, Step};
use crate::view::{AvailableActions, RoundSnapshot};

/// Ledger reference prefix for balance changes made by this table.
pub const GAME: &str = "blackjack";

/// Result of a player action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// No round was in a state that accepts the action; nothing changed.
    Ignored,
    /// The round continues.
    Continue,
    /// The round ended and was settled.
    Resolved(RoundSummary),
}

impl Action {
    /// Summary of the settled round, if this action ended one.
    pub fn summary(&self) -> Option<&RoundSummary> {
        match self {
            Action::Resolved(summary) => Some(summary),
            _ => None,
        }
    }
}

/// A blackjack table bound to the shared ledger.
///
/// Stakes stay in the ledger while a round is played. At resolution a win
/// is credited, a loss is debited and a push moves nothing; then, if the
/// balance is empty, it is restored to the bankruptcy floor.
pub struct BlackjackEngine<S: DeckSource = ShuffledDecks> {
    ledger: Arc<Ledger>,
    config: TableConfig,
    decks: S,
    round: Option<Round>,
    last_summary: Option<RoundSummary>,
}

impl BlackjackEngine<ShuffledDecks> {
    /// Open a table dealing from freshly shuffled decks.
    pub fn open(ledger: Arc<Ledger>, config: TableConfig) -> Self {
        Self::open_with_decks(ledger, config, ShuffledDecks::from_entropy())
    }
}

impl<S: DeckSource> BlackjackEngine<S> {
    /// Open a table dealing from `decks`.
    ///
    /// An empty balance is topped up to the table reset balance.
    pub fn open_with_decks(ledger: Arc<Ledger>, config: TableConfig, decks: S) -> Self {
        let reference = format!("{}:open", GAME);
        if ledger.top_up_if_below(1, config.table_reset_balance, Some(&reference)) {
            info!(
                balance = config.table_reset_balance,
                "Empty balance topped up on table open"
            );
        }

        Self {
            ledger,
            config,
            decks,
            round: None,
            last_summary: None,
        }
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    /// Current balance from the ledger.
    pub fn balance(&self) -> u64 {
        self.ledger.balance()
    }

    /// Largest bet the balance allows, never below one.
    pub fn max_bet(&self) -> u64 {
        self.balance().max(1)
    }

    /// State of the current (or last) round.
    pub fn state(&self) -> RoundState {
        self.round
            .as_ref()
            .map(Round::state)
            .unwrap_or(RoundState::NotStarted)
    }

    /// The current or most recently finished round.
    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    /// Summary of the most recently settled round.
    pub fn last_summary(&self) -> Option<&RoundSummary> {
        self.last_summary.as_ref()
    }

    /// Start a round staking `bet`.
    ///
    /// Rejected without touching the ledger or the table when a round is
    /// still being played, or when the bet is below the minimum or above the
    /// balance.
    #[instrument(skip(self))]
    pub fn deal(&mut self, bet: u64) -> RoundResult<Action> {
        if self.state() == RoundState::InProgress {
            return Err(self.reject(RoundError::RoundInProgress));
        }
        if bet == 0 {
            return Err(self.reject(RoundError::InvalidBet {
                input: bet.to_string(),
            }));
        }
        if bet < self.config.min_bet {
            return Err(self.reject(RoundError::BetBelowMinimum {
                bet,
                min_bet: self.config.min_bet,
            }));
        }
        let balance = self.ledger.balance();
        if bet > balance {
            return Err(self.reject(RoundError::BetExceedsBalance { bet, balance }));
        }

        let mut round = Round::new(bet, self.decks.next_deck(), self.config.dealer_stands_on);
        let step = round.deal().map_err(|e| self.reject(e))?;

        info!(round_id = %round.id(), bet, balance, "Round started");
        self.round = Some(round);
        self.last_summary = None;
        Ok(self.finish(step))
    }

    /// Parse `input` as a bet and deal.
    pub fn deal_input(&mut self, input: &str) -> RoundResult<Action> {
        let bet = parse_bet(input).map_err(|e| self.reject(e))?;
        self.deal(bet)
    }

    /// Player takes a card.
    #[instrument(skip(self))]
    pub fn hit(&mut self) -> RoundResult<Action> {
        let step = match self.round.as_mut() {
            Some(round) => round.hit(),
            None => Ok(Step::Ignored),
        };
        let step = step.map_err(|e| self.reject(e))?;
        Ok(self.finish(step))
    }

    /// Player stands; the dealer plays out and the round settles.
    #[instrument(skip(self))]
    pub fn stand(&mut self) -> Action {
        let step = match self.round.as_mut() {
            Some(round) => round.stand(),
            None => Step::Ignored,
        };
        self.finish(step)
    }

    /// Player doubles the stake, takes one card and stands.
    #[instrument(skip(self))]
    pub fn double(&mut self) -> RoundResult<Action> {
        let available = self.ledger.balance();
        let step = match self.round.as_mut() {
            Some(round) => round.double(available),
            None => Ok(Step::Ignored),
        };
        let step = step.map_err(|e| self.reject(e))?;
        Ok(self.finish(step))
    }

    /// Restore the table reset balance on demand.
    pub fn reset_balance(&self) -> u64 {
        let reference = format!("{}:reset", GAME);
        self.ledger
            .set_balance_with_reference(self.config.table_reset_balance, Some(&reference));
        self.config.table_reset_balance
    }

    /// Controls the player may use right now.
    pub fn available_actions(&self) -> AvailableActions {
        let balance = self.ledger.balance();
        match self.round.as_ref() {
            Some(round) if round.state() == RoundState::InProgress => AvailableActions {
                can_deal: false,
                can_hit: true,
                can_stand: true,
                can_double: round.player().len() == 2
                    && round
                        .bet()
                        .checked_mul(2)
                        .map_or(false, |doubled| doubled <= balance),
            },
            _ => AvailableActions {
                can_deal: balance >= self.config.min_bet.max(1),
                ..AvailableActions::default()
            },
        }
    }

    /// Player-facing view of the table.
    pub fn snapshot(&self) -> RoundSnapshot {
        let balance = self.ledger.balance();
        let actions = self.available_actions();
        match self.round.as_ref() {
            Some(round) => RoundSnapshot::of_round(
                round,
                balance,
                actions,
                self.last_summary.as_ref().map(RoundSummary::message),
            ),
            None => RoundSnapshot::idle(balance, actions),
        }
    }

    fn finish(&mut self, step: Step) -> Action {
        match step {
            Step::Ignored => Action::Ignored,
            Step::Continue => Action::Continue,
            Step::Resolved(outcome) => {
                let summary = match self.round.as_ref() {
                    Some(round) => self.settle(round, outcome),
                    None => return Action::Ignored,
                };
                self.last_summary = Some(summary.clone());
                Action::Resolved(summary)
            }
        }
    }

    fn settle(&self, round: &Round, outcome: Outcome) -> RoundSummary {
        let reference = round.id().reference(GAME);
        let payout = match outcome.payout(round.bet(), self.config.blackjack_payout) {
            Payout::Credit(amount) => {
                self.ledger.credit_with_reference(amount, Some(&reference));
                Payout::Credit(amount)
            }
            Payout::Debit(amount) => {
                if self.ledger.debit_with_reference(amount, Some(&reference)) {
                    Payout::Debit(amount)
                } else {
                    // The stake was spent elsewhere mid-round; debits are never partial.
                    warn!(
                        round_id = %round.id(),
                        amount,
                        balance = self.ledger.balance(),
                        "Lost stake no longer covered, nothing collected"
                    );
                    Payout::None
                }
            }
            Payout::None => Payout::None,
        };

        let bankruptcy_reset =
            self.ledger
                .top_up_if_below(1, self.config.bankruptcy_balance, Some(&reference));
        if bankruptcy_reset {
            warn!(
                round_id = %round.id(),
                balance = self.config.bankruptcy_balance,
                "Bankruptcy: balance reset"
            );
        }

        let summary = RoundSummary {
            round_id: round.id(),
            outcome,
            bet: round.bet(),
            doubled: round.is_doubled(),
            player_score: round.player().score(),
            dealer_score: round.dealer().score(),
            payout,
            balance_after: self.ledger.balance(),
            bankruptcy_reset,
        };

        info!(
            round_id = %summary.round_id,
            outcome = %outcome,
            net = summary.payout.net() as i64,
            balance = summary.balance_after,
            "Round settled"
        );

        summary
    }

    fn reject(&self, error: RoundError) -> RoundError {
        info!(code = error.error_code(), error = %error, "Action rejected");
        error
    }
}

impl<S: DeckSource> std::fmt::Debug for BlackjackEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlackjackEngine")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("balance", &self.balance())
            .finish()
    }
}
