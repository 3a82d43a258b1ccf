//! Compressed secp256k1 public keys.

use crate::errors::PublicKeyError;
use crate::hash::{Euid, RadixHash};
use std::fmt;

/// Compressed SEC1 public key (33 bytes, prefix 0x02 or 0x03).
///
/// Only the encoding is checked here; curve membership is checked by the
/// crypto capability when the key is used for verification.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey([u8; 33]);

impl PublicKey {
    /// Byte width of the compressed form.
    pub const BYTE_COUNT: usize = 33;

    /// Validate and wrap compressed key bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, PublicKeyError> {
        let array: [u8; 33] = bytes
            .try_into()
            .map_err(|_| PublicKeyError::IncorrectLength(bytes.len()))?;
        if array[0] != 0x02 && array[0] != 0x03 {
            return Err(PublicKeyError::NotCompressed(array[0]));
        }
        Ok(Self(array))
    }

    /// Raw compressed bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }

    /// Hash of the compressed key.
    #[must_use]
    pub fn hash(&self) -> RadixHash {
        RadixHash::of(&self.0)
    }

    /// Unique id of the key holder, used to key atom signatures.
    #[must_use]
    pub fn euid(&self) -> Euid {
        self.hash().to_euid()
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_uncompressed_prefix() {
        let mut bytes = [0u8; 33];
        bytes[0] = 0x04;
        assert_eq!(
            PublicKey::from_slice(&bytes),
            Err(PublicKeyError::NotCompressed(0x04))
        );
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert_eq!(
            PublicKey::from_slice(&[0x02; 65]),
            Err(PublicKeyError::IncorrectLength(65))
        );
    }
}
