//! Arcade Ledger
//!
//! The single shared balance every arcade game spends from and pays into.
//! Balances are whole units, never negative, and persisted after every
//! mutation through an [`arcade_common::KeyValueStore`].

pub mod balance;
pub mod config;
pub mod engine;
pub mod journal;

pub use balance::StoredBalance;
pub use config::LedgerConfig;
pub use engine::Ledger;
pub use journal::{BalanceChange, BalanceHistory, ChangeKind};
