//! Fixed-point conversion between human amounts and on-chain integer units.
//!
//! Submissions round half away from zero on `value × 10^scale`; display
//! rendering truncates. Integers decoded from ledger responses may arrive as
//! JSON strings or JSON numbers. Strings are exact; numbers above 2^53 may
//! already have lost precision inside the JSON producer, which this module
//! cannot recover.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

use super::error::DomainError;

/// Fractional digits of the base asset and the mock token.
pub const TOKEN_DECIMALS: u32 = 8;

/// Fractional digits of the vault share price.
pub const SHARE_PRICE_DECIMALS: u32 = 6;

/// Fractional digits of order-book price ticks.
pub const PRICE_TICK_DECIMALS: u32 = 2;

/// Largest scale a `Decimal` can carry.
const MAX_SCALE: u32 = 28;

/// An integer amount as returned by the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnChainAmount {
    /// Integer carried as a decimal string (the ledger's u64 encoding).
    Text(String),
    /// Integer carried as a JSON number.
    Number(u64),
}

impl OnChainAmount {
    /// Decode a JSON value into an on-chain amount.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Undecodable`] for anything that is not a
    /// non-negative integer string or number.
    pub fn from_value(value: &Value) -> Result<Self, DomainError> {
        match value {
            Value::String(s) => Ok(Self::Text(s.clone())),
            Value::Number(n) => {
                if let Some(v) = n.as_u64() {
                    return Ok(Self::Number(v));
                }
                // Floats past 2^53 are accepted as-is; precision is already gone.
                match n.as_f64() {
                    Some(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 => {
                        Ok(Self::Number(f as u64))
                    }
                    _ => Err(DomainError::Undecodable {
                        value: n.to_string(),
                    }),
                }
            }
            other => Err(DomainError::Undecodable {
                value: other.to_string(),
            }),
        }
    }

    /// Integer value of this amount.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Undecodable`] if a text amount is not a u64.
    pub fn units(&self) -> Result<u64, DomainError> {
        match self {
            Self::Number(v) => Ok(*v),
            Self::Text(s) => s.trim().parse::<u64>().map_err(|_| DomainError::Undecodable {
                value: s.clone(),
            }),
        }
    }
}

impl From<u64> for OnChainAmount {
    fn from(v: u64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for OnChainAmount {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for OnChainAmount {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl fmt::Display for OnChainAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(v) => write!(f, "{v}"),
        }
    }
}

/// Parse a human decimal string into a finite `Decimal`.
///
/// Accepts plain (`"12.5"`) and scientific (`"1.25e1"`) notation.
///
/// # Errors
///
/// Returns [`DomainError::InvalidAmount`] for empty or non-numeric input.
pub fn parse_decimal(input: &str) -> Result<Decimal, DomainError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DomainError::invalid_amount(input, "empty"));
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| DomainError::invalid_amount(input, "not a finite number"))
}

/// Parse a human amount and require it to be strictly positive.
///
/// # Errors
///
/// Returns [`DomainError::InvalidAmount`] if the input is not a finite
/// positive number.
pub fn parse_positive(input: &str) -> Result<Decimal, DomainError> {
    let value = parse_decimal(input)?;
    if value <= Decimal::ZERO {
        return Err(DomainError::invalid_amount(input, "must be positive"));
    }
    Ok(value)
}

fn pow10(scale: u32) -> Option<Decimal> {
    let mut factor = Decimal::ONE;
    for _ in 0..scale {
        factor = factor.checked_mul(Decimal::TEN)?;
    }
    Some(factor)
}

/// Encode an already-parsed positive decimal at the given scale.
///
/// # Errors
///
/// Returns [`DomainError::InvalidAmount`] if the value is not positive,
/// rounds to zero, or does not fit in a u64.
pub fn encode_decimal(value: Decimal, scale: u32) -> Result<u64, DomainError> {
    let input = value.to_string();
    if value <= Decimal::ZERO {
        return Err(DomainError::invalid_amount(&input, "must be positive"));
    }
    let factor = pow10(scale).ok_or_else(|| DomainError::invalid_amount(&input, "scale too large"))?;
    let scaled = value
        .checked_mul(factor)
        .ok_or_else(|| DomainError::invalid_amount(&input, "out of range"))?;
    let rounded = scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let units = rounded
        .to_u64()
        .ok_or_else(|| DomainError::invalid_amount(&input, "out of range"))?;
    if units == 0 {
        return Err(DomainError::invalid_amount(&input, "rounds to zero"));
    }
    Ok(units)
}

/// Convert a human decimal string into on-chain integer units.
///
/// Rounds `value × 10^scale` half away from zero.
///
/// # Errors
///
/// Returns [`DomainError::InvalidAmount`] for `""`, `"0"`, negative or
/// non-numeric input, and for values that round to zero units.
pub fn to_on_chain(input: &str, scale: u32) -> Result<u64, DomainError> {
    let value = parse_positive(input)?;
    encode_decimal(value, scale).map_err(|err| match err {
        DomainError::InvalidAmount { reason, .. } => DomainError::invalid_amount(input, reason),
        other => other,
    })
}

/// Convert a human decimal string into whole units, truncating toward zero.
///
/// The input must be finite and positive, but the result may be zero when it
/// is below one unit. Callers that need a positive result check for that.
///
/// # Errors
///
/// Returns [`DomainError::InvalidAmount`] if the input is not a finite
/// positive number or exceeds u64.
pub fn truncate_units(input: &str) -> Result<u64, DomainError> {
    let value = parse_positive(input)?;
    value
        .trunc()
        .to_u64()
        .ok_or_else(|| DomainError::invalid_amount(input, "out of range"))
}

fn scaled_decimal(units: u64, scale: u32) -> Result<Decimal, DomainError> {
    if scale > MAX_SCALE {
        return Err(DomainError::Undecodable {
            value: format!("{units} at scale {scale}"),
        });
    }
    let mut value = Decimal::from(units);
    value
        .set_scale(scale)
        .map_err(|_| DomainError::Undecodable {
            value: format!("{units} at scale {scale}"),
        })?;
    Ok(value)
}

/// Convert on-chain integer units into a normalized decimal string.
///
/// `"5000000000"` at scale 8 becomes `"50"`; `"110000000"` becomes `"1.1"`.
///
/// # Errors
///
/// Returns [`DomainError::Undecodable`] if a text amount is not an integer.
pub fn from_on_chain(amount: impl Into<OnChainAmount>, scale: u32) -> Result<String, DomainError> {
    let units = amount.into().units()?;
    Ok(scaled_decimal(units, scale)?.normalize().to_string())
}

/// Convert on-chain integer units into a `Decimal`.
///
/// # Errors
///
/// Returns [`DomainError::Undecodable`] if the scale is out of range.
pub fn units_to_decimal(units: u64, scale: u32) -> Result<Decimal, DomainError> {
    scaled_decimal(units, scale).map(|d| d.normalize())
}

/// Render on-chain units with exactly `dp` fractional digits, truncating.
#[must_use]
pub fn format_display(units: u64, scale: u32, dp: u32) -> String {
    match scaled_decimal(units, scale) {
        Ok(value) => {
            let truncated = value.round_dp_with_strategy(dp, RoundingStrategy::ToZero);
            format!("{:.*}", dp as usize, truncated)
        }
        Err(_) => units.to_string(),
    }
}
