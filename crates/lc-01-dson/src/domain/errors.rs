//! # Domain Errors
//!
//! Encoding and decoding failures. Each is fatal to the single operation that
//! raised it.

use thiserror::Error;

/// DSON error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DsonError {
    /// Value carries a different type tag than the decoder expects.
    #[error("Type tag mismatch: expected {expected}, found {found}")]
    TagMismatch {
        /// Tag the decoder asked for
        expected: &'static str,
        /// Tag actually present
        found: &'static str,
    },

    /// Input ended inside an item.
    #[error("Unexpected end of input")]
    UnexpectedEnd,

    /// Bytes left over after the top-level item.
    #[error("{0} trailing bytes after top-level item")]
    TrailingBytes(usize),

    /// CBOR item outside the supported subset.
    #[error("Unsupported CBOR item (major type {major}, info {info})")]
    UnsupportedMajorType {
        /// Major type (high three bits)
        major: u8,
        /// Additional information (low five bits)
        info: u8,
    },

    /// Aggregate lacks a required field.
    #[error("Missing field: {0}")]
    MissingField(String),

    /// Aggregate is of a different type than expected.
    #[error("Serializer mismatch: expected {expected}, found {found}")]
    SerializerMismatch {
        /// Serializer the decoder asked for
        expected: String,
        /// Serializer present in the input
        found: String,
    },

    /// Serializer name not known to a polymorphic decoder.
    #[error("Unknown serializer: {0}")]
    UnknownSerializer(String),

    /// Value has the right tag but fails validation.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Input nests deeper than the decoder allows.
    #[error("Nesting exceeds {0} levels")]
    NestingTooDeep(usize),
}

impl DsonError {
    /// Wrap a validation error raised while rebuilding a typed value.
    pub fn invalid(err: impl std::fmt::Display) -> Self {
        Self::InvalidValue(err.to_string())
    }
}
