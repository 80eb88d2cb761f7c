//! Arcade Blackjack
//!
//! One round of blackjack at a time, from bet to payout, settled against
//! the shared [`arcade_ledger::Ledger`].

pub mod bet;
pub mod card;
pub mod config;
pub mod deck;
pub mod engine;
pub mod error;
pub mod hand;
pub mod outcome;
pub mod round;
pub mod view;

pub use bet::parse_bet;
pub use card::{Card, Rank, Suit};
pub use config::TableConfig;
pub use deck::{Deck, DeckSource, ShuffledDecks, DECK_SIZE};
pub use engine::{Action, BlackjackEngine};
pub use error::{RoundError, RoundResult};
pub use hand::{score, Hand, BLACKJACK};
pub use outcome::{Outcome, Payout, RoundSummary};
pub use round::{Round, RoundState, Step};
pub use view::{AvailableActions, RoundSnapshot};
