//! # Domain Errors
//!
//! Error types for the atom model.

use shared_crypto::CryptoError;
use thiserror::Error;

/// Errors from building or parsing an atom identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AtomIdentifierError {
    /// Truncated hash segment must be 24 bytes.
    #[error("Incorrect truncated hash byte count: expected {expected}, got {actual}")]
    IncorrectByteCountOfTruncatedHash {
        /// Expected byte count
        expected: usize,
        /// Actual byte count
        actual: usize,
    },

    /// Whole identifier must be 32 bytes.
    #[error("Incorrect atom identifier byte count: expected {expected}, got {actual}")]
    IncorrectByteCount {
        /// Expected byte count
        expected: usize,
        /// Actual byte count
        actual: usize,
    },

    /// Shard selection needs at least one candidate.
    #[error("Cannot select a shard from an empty shard set")]
    EmptyShardSet,

    /// String form is not hex.
    #[error("Invalid atom identifier hex: {0}")]
    InvalidHex(String),
}

/// Errors from constructing particles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParticleError {
    /// Token definition symbol differs from the name in its identifier.
    #[error("Symbol {symbol} does not match resource identifier {rri}")]
    SymbolMismatch {
        /// Symbol field
        symbol: String,
        /// Resource identifier
        rri: String,
    },

    /// Amount is not a multiple of the token granularity.
    #[error("Amount {amount} is not a multiple of granularity {granularity}")]
    AmountNotMultipleOfGranularity {
        /// Amount
        amount: String,
        /// Granularity
        granularity: String,
    },

    /// Resource identifier could not be formed.
    #[error("Invalid resource identifier: {0}")]
    InvalidResourceIdentifier(String),
}

/// Errors from signing or verifying atoms.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    /// Signing capability failed.
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// No signature from the given key.
    #[error("Atom carries no signature from {0}")]
    MissingSignature(String),

    /// A signature is present but does not verify.
    #[error("Signature from {0} does not verify")]
    InvalidSignature(String),
}
