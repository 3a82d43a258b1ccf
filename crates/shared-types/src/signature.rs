//! # ECDSA Signatures
//!
//! A secp256k1 signature as two big-endian integers `r` and `s`, each in
//! `(0, n - 1]` where `n` is the curve order. The raw form is `r ‖ s`, each
//! left-padded to 32 bytes.

use crate::errors::SignatureError;
use primitive_types::U256;
use std::fmt;

/// secp256k1 group order.
pub const CURVE_ORDER: U256 = U256([
    0xBFD2_5E8C_D036_4141,
    0xBAAE_DCE6_AF48_A03B,
    0xFFFF_FFFF_FFFF_FFFE,
    0xFFFF_FFFF_FFFF_FFFF,
]);

/// Validated ECDSA signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    r: U256,
    s: U256,
}

impl Signature {
    /// Byte width of the `r ‖ s` form.
    pub const BYTE_COUNT: usize = 64;

    /// Validate both components against the curve order.
    pub fn new(r: U256, s: U256) -> Result<Self, SignatureError> {
        if r.is_zero() {
            return Err(SignatureError::RCannotBeZero);
        }
        if s.is_zero() {
            return Err(SignatureError::SCannotBeZero);
        }
        if r >= CURVE_ORDER {
            return Err(SignatureError::RTooBig);
        }
        if s >= CURVE_ORDER {
            return Err(SignatureError::STooBig);
        }
        Ok(Self { r, s })
    }

    /// Parse the 64-byte `r ‖ s` form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignatureError> {
        if bytes.len() != Self::BYTE_COUNT {
            return Err(SignatureError::IncorrectByteCount(bytes.len()));
        }
        Self::new(
            U256::from_big_endian(&bytes[..32]),
            U256::from_big_endian(&bytes[32..]),
        )
    }

    /// Parse `r` and `s` given as big-endian byte strings of at most 32 bytes.
    pub fn from_components(r: &[u8], s: &[u8]) -> Result<Self, SignatureError> {
        if r.len() > 32 {
            return Err(SignatureError::RTooBig);
        }
        if s.len() > 32 {
            return Err(SignatureError::STooBig);
        }
        Self::new(U256::from_big_endian(r), U256::from_big_endian(s))
    }

    /// `r` component.
    #[must_use]
    pub const fn r(&self) -> U256 {
        self.r
    }

    /// `s` component.
    #[must_use]
    pub const fn s(&self) -> U256 {
        self.s
    }

    /// `r` left-padded to 32 bytes.
    #[must_use]
    pub fn r_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        self.r.to_big_endian(&mut bytes);
        bytes
    }

    /// `s` left-padded to 32 bytes.
    #[must_use]
    pub fn s_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        self.s.to_big_endian(&mut bytes);
        bytes
    }

    /// `r ‖ s`.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&self.r_bytes());
        bytes[32..].copy_from_slice(&self.s_bytes());
        bytes
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", hex::encode(self.to_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_order_constant() {
        let expected =
            U256::from_str_radix("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141", 16)
                .unwrap();
        assert_eq!(CURVE_ORDER, expected);
    }

    #[test]
    fn test_zero_components_rejected() {
        assert_eq!(
            Signature::new(U256::zero(), U256::one()),
            Err(SignatureError::RCannotBeZero)
        );
        assert_eq!(
            Signature::new(U256::one(), U256::zero()),
            Err(SignatureError::SCannotBeZero)
        );
    }

    #[test]
    fn test_order_bound() {
        let max = CURVE_ORDER - U256::one();
        assert!(Signature::new(max, max).is_ok());
        assert_eq!(
            Signature::new(CURVE_ORDER, U256::one()),
            Err(SignatureError::RTooBig)
        );
        assert_eq!(
            Signature::new(U256::one(), CURVE_ORDER),
            Err(SignatureError::STooBig)
        );
    }

    #[test]
    fn test_bytes_are_zero_padded() {
        let signature = Signature::new(U256::from(1), U256::from(2)).unwrap();
        let bytes = signature.to_bytes();
        assert_eq!(bytes[31], 1);
        assert_eq!(bytes[63], 2);
        assert!(bytes[..31].iter().all(|b| *b == 0));
        assert_eq!(Signature::from_bytes(&bytes).unwrap(), signature);
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert_eq!(
            Signature::from_bytes(&[1u8; 63]),
            Err(SignatureError::IncorrectByteCount(63))
        );
    }
}
