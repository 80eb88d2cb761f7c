//! The shared balance ledger.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, error, info, instrument, warn};

use arcade_common::{KeyValueStore, MemoryStore};

use crate::balance::StoredBalance;
use crate::config::LedgerConfig;
use crate::journal::{BalanceChange, BalanceHistory, ChangeKind};

struct LedgerState {
    balance: u64,
    history: BalanceHistory,
}

/// Process-wide balance store shared by every game.
///
/// One instance is built at startup and handed to each game as an
/// `Arc<Ledger>`. All mutations go through an internal lock, so the balance
/// never underflows even when several sessions share the ledger, and every
/// mutation is written to the store before the lock is released.
pub struct Ledger {
    store: Arc<dyn KeyValueStore>,
    config: LedgerConfig,
    state: Mutex<LedgerState>,
}

impl Ledger {
    /// Open the ledger, loading the persisted balance from `store`.
    ///
    /// A missing or unreadable value falls back to the starting balance.
    pub fn open(store: Arc<dyn KeyValueStore>, config: LedgerConfig) -> Self {
        let balance = Self::load(store.as_ref(), &config);

        info!(
            store = store.name(),
            key = %config.storage_key,
            balance,
            "Ledger opened"
        );

        Self {
            state: Mutex::new(LedgerState {
                balance,
                history: BalanceHistory::new(config.history_limit),
            }),
            store,
            config,
        }
    }

    /// Ledger over a fresh in-memory store with default configuration.
    pub fn in_memory() -> Self {
        Self::open(Arc::new(MemoryStore::new()), LedgerConfig::default())
    }

    fn load(store: &dyn KeyValueStore, config: &LedgerConfig) -> u64 {
        match store.get(&config.storage_key) {
            Ok(Some(raw)) => match StoredBalance::decode(&raw) {
                Some(stored) => stored.balance,
                None => {
                    warn!(
                        key = %config.storage_key,
                        fallback = config.starting_balance,
                        "Stored balance is corrupt, using starting balance"
                    );
                    config.starting_balance
                }
            },
            Ok(None) => {
                debug!(key = %config.storage_key, "No stored balance, using starting balance");
                config.starting_balance
            }
            Err(e) => {
                warn!(
                    key = %config.storage_key,
                    code = e.error_code(),
                    error = %e,
                    "Could not read stored balance, using starting balance"
                );
                config.starting_balance
            }
        }
    }

    /// Ledger configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Current balance.
    pub fn balance(&self) -> u64 {
        self.state.lock().balance
    }

    /// Add `amount` to the balance and return the new balance.
    pub fn credit(&self, amount: u64) -> u64 {
        self.credit_with_reference(amount, None)
    }

    /// Credit on behalf of `reference`.
    #[instrument(skip(self))]
    pub fn credit_with_reference(&self, amount: u64, reference: Option<&str>) -> u64 {
        let mut state = self.state.lock();
        let after = state.balance.saturating_add(amount);
        self.apply(&mut state, ChangeKind::Credit, amount, after, reference);
        after
    }

    /// Subtract `amount` if the balance covers it.
    ///
    /// Returns `false` and leaves the balance untouched otherwise. Callers
    /// must check the result before acting on the spend.
    pub fn debit(&self, amount: u64) -> bool {
        self.debit_with_reference(amount, None)
    }

    /// Debit on behalf of `reference`.
    #[instrument(skip(self))]
    pub fn debit_with_reference(&self, amount: u64, reference: Option<&str>) -> bool {
        let mut state = self.state.lock();
        if state.balance < amount {
            info!(
                amount,
                balance = state.balance,
                reference = ?reference,
                "Debit rejected: insufficient balance"
            );
            return false;
        }

        let after = state.balance - amount;
        self.apply(&mut state, ChangeKind::Debit, amount, after, reference);
        true
    }

    /// Set the balance to `amount` if it is below `threshold`.
    ///
    /// Returns whether the balance was replaced.
    #[instrument(skip(self))]
    pub fn top_up_if_below(&self, threshold: u64, amount: u64, reference: Option<&str>) -> bool {
        let mut state = self.state.lock();
        if state.balance >= threshold {
            return false;
        }
        self.apply(&mut state, ChangeKind::Set, amount, amount, reference);
        true
    }

    /// Overwrite the balance.
    pub fn set_balance(&self, amount: u64) {
        self.set_balance_with_reference(amount, None)
    }

    /// Overwrite the balance on behalf of `reference`.
    #[instrument(skip(self))]
    pub fn set_balance_with_reference(&self, amount: u64, reference: Option<&str>) {
        let mut state = self.state.lock();
        self.apply(&mut state, ChangeKind::Set, amount, amount, reference);
    }

    /// Restore the configured starting balance.
    pub fn reset(&self) {
        self.set_balance_with_reference(self.config.starting_balance, Some("reset"));
    }

    /// Recent balance changes, oldest first.
    pub fn history(&self) -> Vec<BalanceChange> {
        self.state.lock().history.entries()
    }

    /// Recent balance changes made on behalf of `reference`, oldest first.
    pub fn history_for(&self, reference: &str) -> Vec<BalanceChange> {
        self.state.lock().history.for_reference(reference)
    }

    /// Most recent balance change.
    pub fn last_change(&self) -> Option<BalanceChange> {
        self.state.lock().history.last().cloned()
    }

    fn apply(
        &self,
        state: &mut LedgerState,
        kind: ChangeKind,
        amount: u64,
        after: u64,
        reference: Option<&str>,
    ) {
        let before = state.balance;
        state.balance = after;
        state.history.record(BalanceChange {
            kind,
            amount,
            balance_before: before,
            balance_after: after,
            reference: reference.map(str::to_string),
            timestamp: Utc::now(),
        });

        info!(
            kind = ?kind,
            amount,
            balance_before = before,
            balance_after = after,
            reference = ?reference,
            "Balance updated"
        );

        self.persist(after);
    }

    fn persist(&self, balance: u64) {
        let result = StoredBalance::new(balance)
            .encode()
            .map_err(arcade_common::StoreError::from)
            .and_then(|raw| self.store.set(&self.config.storage_key, &raw));

        // The in-memory balance stays authoritative for the session.
        if let Err(e) = result {
            error!(
                key = %self.config.storage_key,
                store = self.store.name(),
                code = e.error_code(),
                error = %e,
                balance,
                "Failed to persist balance"
            );
        }
    }
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("store", &self.store.name())
            .field("key", &self.config.storage_key)
            .field("balance", &self.balance())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_common::{StoreError, StoreResult};
    use proptest::prelude::*;
    use std::thread;

    const KEY: &str = "universalGoldBalance";

    fn ledger_with(entries: &[(&str, &str)]) -> (Arc<MemoryStore>, Ledger) {
        let store = Arc::new(MemoryStore::with_entries(entries.iter().copied()));
        let ledger = Ledger::open(store.clone(), LedgerConfig::default());
        (store, ledger)
    }

    fn stored(store: &MemoryStore) -> Option<u64> {
        store
            .get(KEY)
            .unwrap()
            .and_then(|raw| StoredBalance::decode(&raw))
            .map(|s| s.balance)
    }

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn name(&self) -> &str {
            "read-only"
        }

        fn get(&self, _key: &str) -> StoreResult<Option<String>> {
            Ok(Some("{\"balance\":70}".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> StoreResult<()> {
            Err(StoreError::Unavailable("read-only".to_string()))
        }
    }

    #[test]
    fn test_missing_value_uses_starting_balance() {
        let (store, ledger) = ledger_with(&[]);
        assert_eq!(ledger.balance(), 100);
        // Loading alone does not write.
        assert_eq!(stored(&store), None);
    }

    #[test]
    fn test_corrupt_value_uses_starting_balance() {
        let (_, ledger) = ledger_with(&[(KEY, "not a number")]);
        assert_eq!(ledger.balance(), 100);
    }

    #[test]
    fn test_loads_both_stored_formats() {
        let (_, current) = ledger_with(&[(KEY, "{\"balance\":640}")]);
        assert_eq!(current.balance(), 640);

        let (_, legacy) = ledger_with(&[(KEY, "310")]);
        assert_eq!(legacy.balance(), 310);
    }

    #[test]
    fn test_credit_persists_and_returns_balance() {
        let (store, ledger) = ledger_with(&[]);
        assert_eq!(ledger.credit(25), 125);
        assert_eq!(ledger.credit(0), 125);
        assert_eq!(stored(&store), Some(125));
    }

    #[test]
    fn test_debit_admission() {
        let (store, ledger) = ledger_with(&[]);

        assert!(ledger.debit(100));
        assert_eq!(ledger.balance(), 0);
        assert_eq!(stored(&store), Some(0));

        assert!(!ledger.debit(1));
        assert_eq!(ledger.balance(), 0);
        assert_eq!(ledger.history().len(), 1);
    }

    #[test]
    fn test_set_and_reset() {
        let (store, ledger) = ledger_with(&[]);

        ledger.set_balance(9000);
        assert_eq!(ledger.balance(), 9000);
        assert_eq!(stored(&store), Some(9000));

        ledger.reset();
        assert_eq!(ledger.balance(), 100);
        assert_eq!(ledger.last_change().unwrap().reference.as_deref(), Some("reset"));
    }

    #[test]
    fn test_short_debit_is_refused_whole() {
        let (store, ledger) = ledger_with(&[(KEY, "{\"balance\":30}")]);

        assert!(ledger.debit_with_reference(20, Some("blackjack:r1")));
        assert!(!ledger.debit_with_reference(20, Some("blackjack:r2")));
        assert_eq!(ledger.balance(), 10);
        assert_eq!(stored(&store), Some(10));
        assert!(ledger.history_for("blackjack:r2").is_empty());
        assert_eq!(ledger.history().len(), 1);
    }

    #[test]
    fn test_top_up_if_below() {
        let (_, ledger) = ledger_with(&[(KEY, "0")]);

        assert!(ledger.top_up_if_below(1, 50, Some("bankruptcy")));
        assert_eq!(ledger.balance(), 50);

        assert!(!ledger.top_up_if_below(1, 500, Some("table-open")));
        assert_eq!(ledger.balance(), 50);
    }

    #[test]
    fn test_history_carries_references() {
        let (_, ledger) = ledger_with(&[]);
        ledger.credit_with_reference(15, Some("blackjack:r1"));
        ledger.debit_with_reference(40, Some("slots:spin"));

        let history = ledger.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].kind, ChangeKind::Credit);
        assert_eq!(history[0].balance_after, 115);
        assert_eq!(history[1].kind, ChangeKind::Debit);
        assert_eq!(history[1].reference.as_deref(), Some("slots:spin"));
        assert_eq!(history[1].delta(), -40);

        let round = ledger.history_for("blackjack:r1");
        assert_eq!(round.len(), 1);
        assert_eq!(round[0].amount, 15);
        assert!(ledger.history_for("dungeon:loot").is_empty());
    }

    #[test]
    fn test_write_failure_keeps_session_balance() {
        let ledger = Ledger::open(Arc::new(ReadOnlyStore), LedgerConfig::default());
        assert_eq!(ledger.balance(), 70);

        assert_eq!(ledger.credit(30), 100);
        assert!(ledger.debit(60));
        assert_eq!(ledger.balance(), 40);
    }

    #[test]
    fn test_reopen_sees_last_balance() {
        let store = Arc::new(MemoryStore::new());
        {
            let ledger = Ledger::open(store.clone(), LedgerConfig::default());
            ledger.debit(30);
            ledger.credit(5);
        }
        let reopened = Ledger::open(store, LedgerConfig::default());
        assert_eq!(reopened.balance(), 75);
    }

    #[test]
    fn test_concurrent_debits_never_overdraw() {
        let ledger = Arc::new(Ledger::in_memory());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = ledger.clone();
                thread::spawn(move || (0..50).filter(|_| ledger.debit(1)).count())
            })
            .collect();

        let succeeded: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(succeeded, 100);
        assert_eq!(ledger.balance(), 0);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Credit(u64),
        Debit(u64),
        Set(u64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u64..500).prop_map(Op::Credit),
            (1u64..500).prop_map(Op::Debit),
            (0u64..500).prop_map(Op::Set),
        ]
    }

    proptest! {
        #[test]
        fn balance_tracks_model_and_store(ops in proptest::collection::vec(op(), 0..60)) {
            let (store, ledger) = ledger_with(&[]);
            let mut model: u64 = 100;

            for op in ops {
                match op {
                    Op::Credit(n) => {
                        model += n;
                        prop_assert_eq!(ledger.credit(n), model);
                    }
                    Op::Debit(n) => {
                        let before = ledger.balance();
                        let ok = ledger.debit(n);
                        prop_assert_eq!(ok, before >= n);
                        if ok {
                            model -= n;
                        } else {
                            prop_assert_eq!(ledger.balance(), before);
                        }
                    }
                    Op::Set(n) => {
                        ledger.set_balance(n);
                        model = n;
                    }
                }
                prop_assert_eq!(ledger.balance(), model);
                if let Some(persisted) = stored(&store) {
                    prop_assert_eq!(persisted, model);
                }
            }
        }
    }
}
