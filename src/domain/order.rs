//! Limit-order types for the on-chain order book.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::amount::{self, PRICE_TICK_DECIMALS};
use super::error::DomainError;

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy order.
    Bid,
    /// Sell order.
    Ask,
}

impl Side {
    /// Boolean encoding expected by the order-book entry functions.
    ///
    /// `true` selects the ask side.
    #[must_use]
    pub const fn as_flag(self) -> bool {
        matches!(self, Self::Ask)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bid => f.write_str("bid"),
            Self::Ask => f.write_str("ask"),
        }
    }
}

impl FromStr for Side {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bid" | "buy" => Ok(Self::Bid),
            "ask" | "sell" => Ok(Self::Ask),
            other => Err(DomainError::InvalidOrder {
                reason: format!("unknown side '{other}'"),
            }),
        }
    }
}

/// Time-in-force restriction on a limit order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Restriction {
    #[default]
    None,
    FillOrKill,
    ImmediateOrCancel,
    PostOnly,
}

impl Restriction {
    /// Wire code used by `place_limit_order_entry`.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::None => 0,
            Self::FillOrKill => 1,
            Self::ImmediateOrCancel => 2,
            Self::PostOnly => 3,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::FillOrKill => "fok",
            Self::ImmediateOrCancel => "ioc",
            Self::PostOnly => "post_only",
        }
    }
}

impl fmt::Display for Restriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Restriction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "fok" | "fill_or_kill" => Ok(Self::FillOrKill),
            "ioc" | "immediate_or_cancel" => Ok(Self::ImmediateOrCancel),
            "post_only" | "post-only" | "postonly" => Ok(Self::PostOnly),
            other => Err(DomainError::InvalidOrder {
                reason: format!("unknown restriction '{other}'"),
            }),
        }
    }
}

/// A validated limit order in on-chain units.
///
/// `price_ticks` and `size_units` are always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderIntent {
    side: Side,
    price_ticks: u64,
    size_units: u64,
    restriction: Restriction,
}

impl OrderIntent {
    /// Build an order from human price and size strings.
    ///
    /// Price is rounded to ticks of `10^-price_decimals`; size is truncated
    /// to whole units, so a size below one unit is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidAmount`] if either input is not a
    /// finite positive number, or [`DomainError::InvalidOrder`] if the
    /// scaled size is zero.
    pub fn try_new(
        side: Side,
        price: &str,
        size: &str,
        restriction: Restriction,
        price_decimals: u32,
    ) -> Result<Self, DomainError> {
        let price_ticks = amount::to_on_chain(price, price_decimals)?;
        let size_units = amount::truncate_units(size)?;
        Self::from_units(side, price_ticks, size_units, restriction)
    }

    /// Build an order with the default two-decimal price ticks.
    ///
    /// # Errors
    ///
    /// See [`OrderIntent::try_new`].
    pub fn with_default_ticks(
        side: Side,
        price: &str,
        size: &str,
        restriction: Restriction,
    ) -> Result<Self, DomainError> {
        Self::try_new(side, price, size, restriction, PRICE_TICK_DECIMALS)
    }

    /// Build an order from already-scaled units.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOrder`] if either value is zero.
    pub fn from_units(
        side: Side,
        price_ticks: u64,
        size_units: u64,
        restriction: Restriction,
    ) -> Result<Self, DomainError> {
        if price_ticks == 0 {
            return Err(DomainError::InvalidOrder {
                reason: "price must be at least one tick".to_string(),
            });
        }
        if size_units == 0 {
            return Err(DomainError::InvalidOrder {
                reason: "size must be at least one unit".to_string(),
            });
        }
        Ok(Self {
            side,
            price_ticks,
            size_units,
            restriction,
        })
    }

    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    #[must_use]
    pub const fn price_ticks(&self) -> u64 {
        self.price_ticks
    }

    #[must_use]
    pub const fn size_units(&self) -> u64 {
        self.size_units
    }

    #[must_use]
    pub const fn restriction(&self) -> Restriction {
        self.restriction
    }
}

/// One aggregated price level of the order book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepthLevel {
    /// Price in human units.
    pub price: Decimal,
    /// Resting size in whole units.
    pub size: u64,
}

/// Both sides of the order book, best price first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderBookDepth {
    pub bids: Vec<DepthLevel>,
    pub asks: Vec<DepthLevel>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn bid_at_twelve_thirty_four_encodes_ticks() {
        let order = OrderIntent::with_default_ticks(Side::Bid, "12.34", "7", Restriction::None).unwrap();
        assert_eq!(order.price_ticks(), 1234);
        assert_eq!(order.size_units(), 7);
        assert!(!order.side().as_flag());
        assert_eq!(order.restriction().code(), 0);
    }

    #[test]
    fn fractional_size_below_one_unit_is_rejected() {
        let err = OrderIntent::with_default_ticks(Side::Ask, "1", "0.5", Restriction::None).unwrap_err();
        assert!(matches!(err, DomainError::InvalidOrder { .. }));
    }

    #[test]
    fn fractional_size_is_truncated() {
        let order = OrderIntent::with_default_ticks(Side::Ask, "1", "3.99", Restriction::None).unwrap();
        assert_eq!(order.size_units(), 3);
    }

    #[test]
    fn non_finite_or_non_positive_inputs_fail() {
        for (price, size) in [("NaN", "1"), ("1", "inf"), ("0", "1"), ("1", "-1"), ("", "1")] {
            assert!(
                OrderIntent::with_default_ticks(Side::Bid, price, size, Restriction::None).is_err(),
                "price={price:?} size={size:?}"
            );
        }
    }

    #[test]
    fn restriction_codes_match_wire_values() {
        assert_eq!(Restriction::None.code(), 0);
        assert_eq!(Restriction::FillOrKill.code(), 1);
        assert_eq!(Restriction::ImmediateOrCancel.code(), 2);
        assert_eq!(Restriction::PostOnly.code(), 3);
    }

    #[test]
    fn restriction_parses_common_spellings() {
        assert_eq!("post_only".parse::<Restriction>().unwrap(), Restriction::PostOnly);
        assert_eq!("IOC".parse::<Restriction>().unwrap(), Restriction::ImmediateOrCancel);
        assert_eq!("fok".parse::<Restriction>().unwrap(), Restriction::FillOrKill);
        assert!("gtc".parse::<Restriction>().is_err());
    }

    #[test]
    fn side_flag_is_true_for_ask() {
        assert!(Side::Ask.as_flag());
        assert!(!Side::Bid.as_flag());
        assert_eq!("sell".parse::<Side>().unwrap(), Side::Ask);
    }

    #[test]
    fn depth_level_holds_human_price() {
        let level = DepthLevel {
            price: dec!(12.34),
            size: 5,
        };
        assert_eq!(level.price, dec!(12.34));
    }
}
