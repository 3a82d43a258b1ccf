//! # Error Types
//!
//! Validation errors raised by the primitive value types. Each is surfaced
//! to whoever constructs the value and is never retried.

use thiserror::Error;

/// Errors from parsing or constructing an [`crate::Address`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Input is not valid base58.
    #[error("Invalid base58 string: {0}")]
    InvalidBase58(String),

    /// Decoded byte count differs from magic + public key + checksum.
    #[error("Incorrect address byte count: expected {expected}, got {actual}")]
    IncorrectByteCount {
        /// Expected byte count.
        expected: usize,
        /// Actual byte count.
        actual: usize,
    },

    /// Checksum does not match the hash of magic and public key.
    #[error("Address checksum mismatch")]
    ChecksumMismatch,

    /// Embedded public key is malformed.
    #[error(transparent)]
    PublicKey(#[from] PublicKeyError),
}

/// Errors from constructing a [`crate::PublicKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublicKeyError {
    /// Compressed keys are exactly 33 bytes.
    #[error("Incorrect public key length: expected 33, got {0}")]
    IncorrectLength(usize),

    /// First byte must be 0x02 or 0x03.
    #[error("Public key is not in compressed form (prefix {0:#04x})")]
    NotCompressed(u8),
}

/// Errors from amount construction and arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// Positive amounts must be non-zero.
    #[error("Amount cannot be zero")]
    AmountCannotBeZero,

    /// Unsigned amounts cannot go below zero.
    #[error("Amount cannot be negative")]
    AmountCannotBeNegative,

    /// Result does not fit in 256 bits.
    #[error("Amount overflow: result exceeds 2^256 - 1")]
    Overflow,

    /// Division by zero.
    #[error("Division by zero")]
    DivisionByZero,

    /// Input is not a decimal integer.
    #[error("Invalid decimal amount: {0}")]
    InvalidDecimalString(String),
}

/// Errors from constructing a [`crate::Signature`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// r must be strictly positive.
    #[error("Signature r cannot be zero")]
    RCannotBeZero,

    /// s must be strictly positive.
    #[error("Signature s cannot be zero")]
    SCannotBeZero,

    /// r must not exceed the curve order minus one.
    #[error("Signature r is too big")]
    RTooBig,

    /// s must not exceed the curve order minus one.
    #[error("Signature s is too big")]
    STooBig,

    /// Raw form is r‖s, 64 bytes.
    #[error("Incorrect signature byte count: expected 64, got {0}")]
    IncorrectByteCount(usize),
}

/// Errors from parsing a [`crate::ResourceIdentifier`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceIdentifierError {
    /// Expected `/address/name`.
    #[error("Resource identifier must have the form /address/name, got {0:?}")]
    MalformedIdentifier(String),

    /// Address segment did not parse.
    #[error("Invalid address in resource identifier: {0}")]
    InvalidAddress(#[from] AddressError),
}

/// Errors from length- or charset-constrained strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StringValueError {
    /// Fewer characters than allowed.
    #[error("{kind} too short: minimum {min}, got {actual}")]
    TooShort {
        /// Which value was being validated.
        kind: &'static str,
        /// Minimum length in characters.
        min: usize,
        /// Actual length in characters.
        actual: usize,
    },

    /// More characters than allowed.
    #[error("{kind} too long: maximum {max}, got {actual}")]
    TooLong {
        /// Which value was being validated.
        kind: &'static str,
        /// Maximum length in characters.
        max: usize,
        /// Actual length in characters.
        actual: usize,
    },

    /// A character outside the permitted set.
    #[error("{kind} contains disallowed character {character:?}")]
    DisallowedCharacter {
        /// Which value was being validated.
        kind: &'static str,
        /// The offending character.
        character: char,
    },
}

/// Errors from parsing hex encoded hashes and identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexError {
    /// Input is not valid hex.
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Decoded byte count differs from the type's width.
    #[error("Incorrect byte count: expected {expected}, got {actual}")]
    IncorrectByteCount {
        /// Expected byte count.
        expected: usize,
        /// Actual byte count.
        actual: usize,
    },
}

/// Errors from constructing a [`crate::Node`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    /// Host contains path components or is otherwise not a bare host.
    #[error("Not a bare host: {0}")]
    NonHostStringPassed(String),

    /// TLS cannot be used against a loopback host.
    #[error("SSL is unsupported for localhost")]
    SslIsUnsupportedForLocalhost,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_error_display() {
        assert_eq!(
            AmountError::AmountCannotBeZero.to_string(),
            "Amount cannot be zero"
        );
    }

    #[test]
    fn test_string_value_error_display() {
        let err = StringValueError::TooLong {
            kind: "Description",
            max: 200,
            actual: 201,
        };
        assert_eq!(
            err.to_string(),
            "Description too long: maximum 200, got 201"
        );
    }

    #[test]
    fn test_address_error_from_public_key() {
        let err: AddressError = PublicKeyError::IncorrectLength(32).into();
        assert!(matches!(err, AddressError::PublicKey(_)));
    }
}
