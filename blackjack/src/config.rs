//! Table configuration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Blackjack table rules and balance floors.
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Smallest accepted bet.
    pub min_bet: u64,
    /// Dealer draws while below this score.
    pub dealer_stands_on: u32,
    /// Multiplier credited on a natural blackjack (floored).
    pub blackjack_payout: Decimal,
    /// Balance restored when a round leaves the player with nothing.
    pub bankruptcy_balance: u64,
    /// Balance granted when the table opens on an empty balance, and by
    /// an explicit table reset.
    pub table_reset_balance: u64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            min_bet: 1,
            dealer_stands_on: 17,
            blackjack_payout: dec!(1.5),
            bankruptcy_balance: 50,
            table_reset_balance: 500,
        }
    }
}

impl TableConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("BLACKJACK_MIN_BET") {
            if let Ok(v) = v.parse() {
                config.min_bet = v;
            }
        }

        if let Ok(v) = std::env::var("BLACKJACK_DEALER_STANDS_ON") {
            if let Ok(v) = v.parse() {
                config.dealer_stands_on = v;
            }
        }

        if let Ok(v) = std::env::var("BLACKJACK_PAYOUT") {
            if let Ok(v) = v.parse() {
                config.blackjack_payout = v;
            }
        }

        if let Ok(v) = std::env::var("BLACKJACK_BANKRUPTCY_BALANCE") {
            if let Ok(v) = v.parse() {
                config.bankruptcy_balance = v;
            }
        }

        if let Ok(v) = std::env::var("BLACKJACK_RESET_BALANCE") {
            if let Ok(v) = v.parse() {
                config.table_reset_balance = v;
            }
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_bet == 0 {
            return Err("Minimum bet must be at least 1".to_string());
        }

        if !(12..=21).contains(&self.dealer_stands_on) {
            return Err(format!(
                "Dealer stand threshold {} outside 12..=21",
                self.dealer_stands_on
            ));
        }

        if self.blackjack_payout < Decimal::ONE {
            return Err("Blackjack payout cannot be below 1x".to_string());
        }

        if self.bankruptcy_balance == 0 {
            return Err("Bankruptcy balance must be positive".to_string());
        }

        if self.table_reset_balance < self.min_bet {
            return Err("Table reset balance must cover the minimum bet".to_string());
        }

        Ok(())
    }
}
