//! In-memory history of balance changes.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Type of balance change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    /// Credit (increase).
    Credit,
    /// Debit (decrease).
    Debit,
    /// Overwrite (reset, bankruptcy floor, table top-up).
    Set,
}

/// A single applied balance change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceChange {
    /// Change type.
    pub kind: ChangeKind,
    /// Amount credited, debited, or the value set.
    pub amount: u64,
    /// Balance before change.
    pub balance_before: u64,
    /// Balance after change.
    pub balance_after: u64,
    /// Who asked for it (round reference, game name, ...).
    pub reference: Option<String>,
    /// When the change was applied.
    pub timestamp: DateTime<Utc>,
}

impl BalanceChange {
    /// Signed effect on the balance.
    pub fn delta(&self) -> i128 {
        self.balance_after as i128 - self.balance_before as i128
    }
}

/// Bounded ring of recent balance changes, oldest first.
#[derive(Debug, Clone)]
pub struct BalanceHistory {
    entries: VecDeque<BalanceChange>,
    limit: usize,
}

impl BalanceHistory {
    /// Create a history keeping at most `limit` entries.
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit.min(1024)),
            limit,
        }
    }

    /// Record a change, evicting the oldest entry when full.
    pub fn record(&mut self, change: BalanceChange) {
        if self.limit == 0 {
            return;
        }
        if self.entries.len() >= self.limit {
            self.entries.pop_front();
        }
        self.entries.push_back(change);
    }

    /// Snapshot of the retained entries.
    pub fn entries(&self) -> Vec<BalanceChange> {
        self.entries.iter().cloned().collect()
    }

    /// Most recent change.
    pub fn last(&self) -> Option<&BalanceChange> {
        self.entries.back()
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries carrying the given reference.
    pub fn for_reference(&self, reference: &str) -> Vec<BalanceChange> {
        self.entries
            .iter()
            .filter(|e| e.reference.as_deref() == Some(reference))
            .cloned()
            .collect()
    }
}
