//! # Addresses
//!
//! An address is `base58(magicByte ‖ compressedPublicKey ‖ checksum)` where
//! the checksum is the first four bytes of the double SHA-256 of
//! `magicByte ‖ compressedPublicKey`.

use crate::errors::AddressError;
use crate::hash::{sha256d, Euid, RadixHash, Shard};
use crate::public_key::PublicKey;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Universe magic number. Only its low byte is embedded in addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Magic(pub i32);

impl Magic {
    /// Byte prefixed to every address of the universe.
    #[must_use]
    pub const fn byte(self) -> u8 {
        (self.0 & 0xff) as u8
    }
}

impl Default for Magic {
    fn default() -> Self {
        Self(63_799_298)
    }
}

/// Account identifier on the ledger network.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    bytes: Vec<u8>,
    public_key: PublicKey,
}

impl Address {
    /// Checksum width in bytes.
    pub const CHECKSUM_BYTE_COUNT: usize = 4;

    /// Total decoded width: magic byte, public key, checksum.
    pub const BYTE_COUNT: usize = 1 + PublicKey::BYTE_COUNT + Self::CHECKSUM_BYTE_COUNT;

    /// Usual width of the base58 form.
    pub const STRING_LENGTH: usize = 51;

    /// Build the address of `public_key` in the universe identified by `magic`.
    #[must_use]
    pub fn new(magic: Magic, public_key: &PublicKey) -> Self {
        let mut bytes = Vec::with_capacity(Self::BYTE_COUNT);
        bytes.push(magic.byte());
        bytes.extend_from_slice(public_key.as_bytes());
        let checksum = sha256d(&bytes);
        bytes.extend_from_slice(&checksum[..Self::CHECKSUM_BYTE_COUNT]);
        Self {
            bytes,
            public_key: *public_key,
        }
    }

    /// Parse and checksum-verify raw address bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AddressError> {
        if bytes.len() != Self::BYTE_COUNT {
            return Err(AddressError::IncorrectByteCount {
                expected: Self::BYTE_COUNT,
                actual: bytes.len(),
            });
        }
        let (body, checksum) = bytes.split_at(bytes.len() - Self::CHECKSUM_BYTE_COUNT);
        if sha256d(body)[..Self::CHECKSUM_BYTE_COUNT] != *checksum {
            return Err(AddressError::ChecksumMismatch);
        }
        let public_key = PublicKey::from_slice(&body[1..])?;
        Ok(Self {
            bytes: bytes.to_vec(),
            public_key,
        })
    }

    /// Raw bytes including magic byte and checksum.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Embedded magic byte.
    #[must_use]
    pub fn magic_byte(&self) -> u8 {
        self.bytes[0]
    }

    /// Embedded compressed public key.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    /// Unique id derived from the public key.
    #[must_use]
    pub fn euid(&self) -> Euid {
        self.public_key().euid()
    }

    /// Hash of the public key.
    #[must_use]
    pub fn hash(&self) -> RadixHash {
        self.public_key().hash()
    }

    /// Shard this address' state lives in.
    #[must_use]
    pub fn shard(&self) -> Shard {
        self.euid().shard()
    }

    /// Base58 form.
    #[must_use]
    pub fn to_base58(&self) -> String {
        bs58::encode(&self.bytes).into_string()
    }

    /// Whether both addresses hold the same public key.
    #[must_use]
    pub fn is_same_owner(&self, other: &Address) -> bool {
        self.public_key() == other.public_key()
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| AddressError::InvalidBase58(e.to_string()))?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_base58())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
