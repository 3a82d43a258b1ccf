//! # Domain Errors
//!
//! Error types for reduction and action mapping.

use lc_02_atom_model::ParticleError;
use shared_types::{AmountError, Granularity, NonNegativeAmount, PositiveAmount, ResourceIdentifier};
use thiserror::Error;

/// Errors from folding particles into balances.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReductionError {
    /// A balance left the representable range.
    #[error("Balance arithmetic failed for {rri}: {source}")]
    Amount {
        /// Token whose balance failed
        rri: ResourceIdentifier,
        /// Underlying amount error
        source: AmountError,
    },
}

/// Errors from merging token definition fragments. Local to one resource.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenDefinitionError {
    /// Fragments describe different resources.
    #[error("Cannot merge state of {found} into state of {expected}")]
    ResourceMismatch {
        /// Resource of the receiving fragment
        expected: ResourceIdentifier,
        /// Resource of the merged fragment
        found: ResourceIdentifier,
    },

    /// Two definitions of the same resource disagree.
    #[error("Conflicting definitions of {0}")]
    ConflictingDefinitions(ResourceIdentifier),

    /// Supply arithmetic failed.
    #[error("Supply arithmetic failed: {0}")]
    Amount(#[from] AmountError),
}

/// Errors from turning a transfer into particle groups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// The sender does not hold enough of the token.
    #[error("Insufficient funds: balance {current_balance}, requested {requested}")]
    InsufficientFunds {
        /// Spendable balance of the sender
        current_balance: NonNegativeAmount,
        /// Requested amount
        requested: PositiveAmount,
    },

    /// The amount cannot be expressed in the token's unit.
    #[error("Amount {amount} is not a multiple of granularity {granularity}")]
    AmountNotMultipleOfGranularity {
        /// Requested amount
        amount: PositiveAmount,
        /// Token granularity
        granularity: Granularity,
    },

    /// No definition of the token is known.
    #[error("Unknown token {0}")]
    UnknownToken(ResourceIdentifier),

    /// Output particle could not be built.
    #[error("Particle error: {0}")]
    Particle(#[from] ParticleError),

    /// Amount arithmetic failed.
    #[error("Amount error: {0}")]
    Amount(#[from] AmountError),
}
