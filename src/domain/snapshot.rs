//! Aggregated vault state read from the ledger.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A value that was either read from the ledger or substituted.
///
/// Substitutions carry the reason so a defaulted zero can be told apart from
/// a zero the ledger actually returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum Sourced<T> {
    Observed { value: T },
    Defaulted { value: T, reason: String },
}

impl<T: Copy> Sourced<T> {
    #[must_use]
    pub const fn observed(value: T) -> Self {
        Self::Observed { value }
    }

    pub fn defaulted(value: T, reason: impl Into<String>) -> Self {
        Self::Defaulted {
            value,
            reason: reason.into(),
        }
    }

    /// The value regardless of where it came from.
    #[must_use]
    pub fn value(&self) -> T {
        match self {
            Self::Observed { value } | Self::Defaulted { value, .. } => *value,
        }
    }

    #[must_use]
    pub const fn is_defaulted(&self) -> bool {
        matches!(self, Self::Defaulted { .. })
    }

    /// The value only if it was actually read.
    #[must_use]
    pub fn observed_value(&self) -> Option<T> {
        match self {
            Self::Observed { value } => Some(*value),
            Self::Defaulted { .. } => None,
        }
    }
}

/// Vault state for one account, rebuilt wholesale on every refresh.
///
/// Amounts are on-chain integer units. Token-denominated fields use the
/// token scale; `share_price` uses the share-price scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VaultSnapshot {
    pub user_shares: Sourced<u64>,
    pub total_assets: Sourced<u64>,
    pub total_supply: Sourced<u64>,
    pub share_price: Sourced<u64>,
    pub available_assets: Sourced<u64>,
    pub min_deposit: Sourced<u64>,
    pub is_paused: Sourced<bool>,
    pub token_balance: Sourced<u64>,
    pub base_asset_balance: Sourced<u64>,
    pub user_profits: Sourced<u64>,
    pub user_total_deposited: Sourced<u64>,
    pub fetched_at: DateTime<Utc>,
}

impl VaultSnapshot {
    /// Names of fields that fell back to defaults.
    #[must_use]
    pub fn defaulted_fields(&self) -> Vec<&'static str> {
        let flags = [
            ("user_shares", self.user_shares.is_defaulted()),
            ("total_assets", self.total_assets.is_defaulted()),
            ("total_supply", self.total_supply.is_defaulted()),
            ("share_price", self.share_price.is_defaulted()),
            ("available_assets", self.available_assets.is_defaulted()),
            ("min_deposit", self.min_deposit.is_defaulted()),
            ("is_paused", self.is_paused.is_defaulted()),
            ("token_balance", self.token_balance.is_defaulted()),
            ("base_asset_balance", self.base_asset_balance.is_defaulted()),
            ("user_profits", self.user_profits.is_defaulted()),
            ("user_total_deposited", self.user_total_deposited.is_defaulted()),
        ];
        flags
            .into_iter()
            .filter_map(|(name, defaulted)| defaulted.then_some(name))
            .collect()
    }

    /// True when every field was read from the ledger.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.defaulted_fields().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaulted_zero_is_distinguishable_from_observed_zero() {
        let observed = Sourced::observed(0u64);
        let defaulted = Sourced::defaulted(0u64, "view failed");
        assert_eq!(observed.value(), defaulted.value());
        assert_ne!(observed, defaulted);
        assert_eq!(observed.observed_value(), Some(0));
        assert_eq!(defaulted.observed_value(), None);
    }

    #[test]
    fn sourced_serializes_with_source_tag() {
        let json = serde_json::to_value(Sourced::defaulted(false, "x")).unwrap();
        assert_eq!(json["source"], "defaulted");
        assert_eq!(json["value"], false);
    }
}
