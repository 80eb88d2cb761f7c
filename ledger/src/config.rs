//! Ledger configuration.

/// Storage key the browser games used for the shared balance.
pub const DEFAULT_STORAGE_KEY: &str = "universalGoldBalance";

/// Balance a new player starts with.
pub const DEFAULT_STARTING_BALANCE: u64 = 100;

/// Ledger configuration.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Key the balance is persisted under.
    pub storage_key: String,
    /// Balance used when nothing (or garbage) is stored, and by `reset`.
    pub starting_balance: u64,
    /// Maximum balance changes kept in memory.
    pub history_limit: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            starting_balance: DEFAULT_STARTING_BALANCE,
            history_limit: 256,
        }
    }
}

impl LedgerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(key) = std::env::var("LEDGER_STORAGE_KEY") {
            config.storage_key = key;
        }

        if let Ok(balance) = std::env::var("LEDGER_STARTING_BALANCE") {
            if let Ok(balance) = balance.parse() {
                config.starting_balance = balance;
            }
        }

        if let Ok(limit) = std::env::var("LEDGER_HISTORY_LIMIT") {
            if let Ok(limit) = limit.parse() {
                config.history_limit = limit;
            }
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.storage_key.trim().is_empty() {
            return Err("Storage key cannot be empty".to_string());
        }

        Ok(())
    }
}
