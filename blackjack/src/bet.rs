//! Bet input parsing.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::{RoundError, RoundResult};

/// Parse a bet typed by the player.
///
/// Fractions are floored ("12.7" bets 12). Empty, non-numeric and sub-one
/// input is rejected.
pub fn parse_bet(input: &str) -> RoundResult<u64> {
    let trimmed = input.trim();
    let invalid = || RoundError::InvalidBet {
        input: trimmed.to_string(),
    };

    let value = Decimal::from_str(trimmed).map_err(|_| invalid())?;
    let whole = value.floor();
    if whole < Decimal::ONE {
        return Err(invalid());
    }

    whole.to_u64().ok_or_else(invalid)
}
