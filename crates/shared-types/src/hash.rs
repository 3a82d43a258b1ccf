//! # Hashes and Unique Identifiers
//!
//! `RadixHash` is SHA-256 applied twice. An `Euid` is the first 16 bytes of
//! such a hash and its first 8 bytes, read big-endian, form a shard.

use crate::errors::HexError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Routing key derived from an address or atom hash.
pub type Shard = i64;

/// Double SHA-256 of arbitrary bytes.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    Sha256::digest(first).into()
}

/// A 32-byte double SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RadixHash([u8; 32]);

impl RadixHash {
    /// Byte width.
    pub const BYTE_COUNT: usize = 32;

    /// Hash `data`.
    #[must_use]
    pub fn of(data: &[u8]) -> Self {
        Self(sha256d(data))
    }

    /// Wrap an already computed digest.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Build from a slice that must be exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, HexError> {
        let array: [u8; 32] = bytes.try_into().map_err(|_| HexError::IncorrectByteCount {
            expected: Self::BYTE_COUNT,
            actual: bytes.len(),
        })?;
        Ok(Self(array))
    }

    /// Raw digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// First byte, used for shard selection.
    #[must_use]
    pub const fn first_byte(&self) -> u8 {
        self.0[0]
    }

    /// Unique id made of the first 16 bytes.
    #[must_use]
    pub fn to_euid(&self) -> Euid {
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&self.0[..16]);
        Euid(bytes)
    }

    /// Lowercase hex.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for RadixHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for RadixHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RadixHash({})", self.to_hex())
    }
}

impl FromStr for RadixHash {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| HexError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

/// 128-bit unique identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Euid([u8; 16]);

impl Euid {
    /// Byte width.
    pub const BYTE_COUNT: usize = 16;

    /// Wrap raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Build from a slice that must be exactly 16 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, HexError> {
        let array: [u8; 16] = bytes.try_into().map_err(|_| HexError::IncorrectByteCount {
            expected: Self::BYTE_COUNT,
            actual: bytes.len(),
        })?;
        Ok(Self(array))
    }

    /// Raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Shard encoded in the first 8 bytes, big-endian.
    #[must_use]
    pub fn shard(&self) -> Shard {
        let mut head = [0u8; 8];
        head.copy_from_slice(&self.0[..8]);
        i64::from_be_bytes(head)
    }

    /// Lowercase hex.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Euid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Euid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Euid({})", self.to_hex())
    }
}

impl FromStr for Euid {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| HexError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl Serialize for Euid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Euid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
