//! Persisted balance record.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The document stored under the ledger key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBalance {
    /// Whole-unit balance.
    pub balance: u64,
}

impl StoredBalance {
    /// Create a record for `balance`.
    pub fn new(balance: u64) -> Self {
        Self { balance }
    }

    /// Encode for storage.
    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decode a stored value.
    ///
    /// Accepts `{"balance": n}` as well as the bare number older saves hold.
    /// Fractions are floored and negatives clamp to zero. Anything else is
    /// corrupt and yields `None`.
    pub fn decode(raw: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(raw.trim()).ok()?;

        let number = match &value {
            Value::Object(fields) => fields.get("balance")?,
            Value::Number(_) => &value,
            _ => return None,
        };

        whole_units(number).map(Self::new)
    }
}

fn whole_units(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    if let Some(n) = value.as_i64() {
        return Some(n.max(0) as u64);
    }

    let n = value.as_f64()?;
    if !n.is_finite() {
        return None;
    }
    if n <= 0.0 {
        return Some(0);
    }
    // Saturating float-to-int cast.
    Some(n.floor() as u64)
}
