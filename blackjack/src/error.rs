//! Rejected blackjack actions.

use thiserror::Error;

/// Why an action was refused. The round and the ledger are untouched
/// whenever one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoundError {
    /// Bet input was empty, non-numeric or below one.
    #[error("Place a valid bet (got {input:?})")]
    InvalidBet { input: String },

    /// Bet below the table minimum.
    #[error("Place a valid bet: minimum is {min_bet}, got {bet}")]
    BetBelowMinimum { bet: u64, min_bet: u64 },

    /// Bet larger than the current balance.
    #[error("Bet cannot exceed balance: bet {bet}, balance {balance}")]
    BetExceedsBalance { bet: u64, balance: u64 },

    /// Double requested on a hand that is not the opening two cards.
    #[error("Double is only allowed on the first two cards (hand has {cards})")]
    DoubleNotAllowed { cards: usize },

    /// Balance cannot cover the doubled bet.
    #[error("Not enough balance to double: need {required}, have {available}")]
    InsufficientFundsToDouble { required: u64, available: u64 },

    /// A round is already being played.
    #[error("Finish the current round before dealing")]
    RoundInProgress,

    /// The deck ran out of cards.
    #[error("Deck exhausted")]
    DeckExhausted,
}

impl RoundError {
    /// Get error code for UI and log records.
    pub fn error_code(&self) -> &'static str {
        match self {
            RoundError::InvalidBet { .. } => "INVALID_BET",
            RoundError::BetBelowMinimum { .. } => "BET_BELOW_MINIMUM",
            RoundError::BetExceedsBalance { .. } => "BET_EXCEEDS_BALANCE",
            RoundError::DoubleNotAllowed { .. } => "DOUBLE_NOT_ALLOWED",
            RoundError::InsufficientFundsToDouble { .. } => "INSUFFICIENT_FUNDS_TO_DOUBLE",
            RoundError::RoundInProgress => "ROUND_IN_PROGRESS",
            RoundError::DeckExhausted => "DECK_EXHAUSTED",
        }
    }
}

/// Result type for blackjack actions.
pub type RoundResult<T> = Result<T, RoundError>;
