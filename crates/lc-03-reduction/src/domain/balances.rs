//! Per address, per token balances.

use shared_types::{Address, NonNegativeAmount, ResourceIdentifier, SignedAmount};
use std::collections::BTreeMap;

/// Balances keyed by holder and token.
///
/// Values are signed so that a consumption folded before the particle it
/// consumes does not fail; a settled ledger never has negative entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenBalances {
    balances: BTreeMap<(Address, ResourceIdentifier), SignedAmount>,
}

impl TokenBalances {
    /// Signed balance, zero when unseen.
    #[must_use]
    pub fn balance(&self, address: &Address, rri: &ResourceIdentifier) -> SignedAmount {
        self.balances
            .get(&(address.clone(), rri.clone()))
            .copied()
            .unwrap_or(SignedAmount::ZERO)
    }

    /// Spendable balance; negative intermediates read as zero.
    #[must_use]
    pub fn balance_or_zero(&self, address: &Address, rri: &ResourceIdentifier) -> NonNegativeAmount {
        self.balance(address, rri)
            .to_non_negative()
            .unwrap_or(NonNegativeAmount::ZERO)
    }

    /// Every token held by `address`.
    #[must_use]
    pub fn balances_of(&self, address: &Address) -> BTreeMap<ResourceIdentifier, SignedAmount> {
        self.balances
            .iter()
            .filter(|((holder, _), _)| holder == address)
            .map(|((_, rri), amount)| (rri.clone(), *amount))
            .collect()
    }

    /// Number of (holder, token) entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    /// Whether nothing has been folded in.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    pub(crate) fn entry(&mut self, address: Address, rri: ResourceIdentifier) -> &mut SignedAmount {
        self.balances.entry((address, rri)).or_default()
    }
}
