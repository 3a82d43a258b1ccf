//! # Atom Identifiers
//!
//! `AID = hash[0..24] ‖ bigEndian(shard)`, where the shard is chosen from the
//! atom's shard set by the first byte of the hash. The set is sorted by the
//! unsigned value of each shard before indexing.

use crate::domain::errors::AtomIdentifierError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use shared_types::{RadixHash, Shard};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Pick the routing shard for `hash` from `shards`.
pub fn select_shard(hash: &RadixHash, shards: &BTreeSet<Shard>) -> Result<Shard, AtomIdentifierError> {
    if shards.is_empty() {
        return Err(AtomIdentifierError::EmptyShardSet);
    }
    let mut sorted: Vec<Shard> = shards.iter().copied().collect();
    sorted.sort_unstable_by_key(|shard| *shard as u64);
    let index = usize::from(hash.first_byte()) % sorted.len();
    Ok(sorted[index])
}

/// Content address of an atom.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomIdentifier([u8; 32]);

impl AtomIdentifier {
    /// Bytes of the truncated hash segment.
    pub const HASH_BYTE_COUNT: usize = 24;

    /// Bytes of the shard segment.
    pub const SHARD_BYTE_COUNT: usize = 8;

    /// Total width.
    pub const BYTE_COUNT: usize = Self::HASH_BYTE_COUNT + Self::SHARD_BYTE_COUNT;

    /// Identifier of an atom with `hash` whose shard set is `shards`.
    pub fn new(hash: &RadixHash, shards: &BTreeSet<Shard>) -> Result<Self, AtomIdentifierError> {
        let shard = select_shard(hash, shards)?;
        Self::from_parts(&hash.as_bytes()[..Self::HASH_BYTE_COUNT], shard)
    }

    /// Join an already truncated hash with a shard.
    pub fn from_parts(truncated_hash: &[u8], shard: Shard) -> Result<Self, AtomIdentifierError> {
        if truncated_hash.len() != Self::HASH_BYTE_COUNT {
            return Err(AtomIdentifierError::IncorrectByteCountOfTruncatedHash {
                expected: Self::HASH_BYTE_COUNT,
                actual: truncated_hash.len(),
            });
        }
        let mut bytes = [0u8; Self::BYTE_COUNT];
        bytes[..Self::HASH_BYTE_COUNT].copy_from_slice(truncated_hash);
        bytes[Self::HASH_BYTE_COUNT..].copy_from_slice(&shard.to_be_bytes());
        Ok(Self(bytes))
    }

    /// Parse the 32-byte form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AtomIdentifierError> {
        let array: [u8; Self::BYTE_COUNT] =
            bytes
                .try_into()
                .map_err(|_| AtomIdentifierError::IncorrectByteCount {
                    expected: Self::BYTE_COUNT,
                    actual: bytes.len(),
                })?;
        Ok(Self(array))
    }

    /// Raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// First 24 bytes of the atom hash.
    #[must_use]
    pub fn truncated_hash(&self) -> &[u8] {
        &self.0[..Self::HASH_BYTE_COUNT]
    }

    /// Selected shard.
    #[must_use]
    pub fn shard(&self) -> Shard {
        let mut tail = [0u8; Self::SHARD_BYTE_COUNT];
        tail.copy_from_slice(&self.0[Self::HASH_BYTE_COUNT..]);
        i64::from_be_bytes(tail)
    }

    /// Lowercase hex, 64 characters.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Abbreviated form for logs, e.g. `a1b2...c3d4`.
    #[must_use]
    pub fn short(&self) -> String {
        let hex = self.to_hex();
        format!("{}...{}", &hex[..4], &hex[hex.len() - 4..])
    }
}

impl fmt::Display for AtomIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for AtomIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Aid({})", self.short())
    }
}

impl FromStr for AtomIdentifier {
    type Err = AtomIdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| AtomIdentifierError::InvalidHex(e.to_string()))?;
        Self::from_bytes(&bytes)
    }
}

impl Serialize for AtomIdentifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for AtomIdentifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
