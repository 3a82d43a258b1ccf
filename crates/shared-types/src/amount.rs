//! # Token Amounts
//!
//! Arbitrary precision (256-bit) token quantities. Unsigned amounts never
//! wrap: every operation that would leave `[0, 2^256 - 1]` fails with an
//! [`AmountError`].

use crate::errors::AmountError;
use primitive_types::U256;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Amount that is zero or greater.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NonNegativeAmount(U256);

impl NonNegativeAmount {
    /// Zero.
    pub const ZERO: Self = Self(U256([0; 4]));

    /// Largest representable amount, 2^256 - 1.
    pub const MAX: Self = Self(U256::MAX);

    /// Wrap a raw magnitude.
    #[must_use]
    pub const fn from_u256(value: U256) -> Self {
        Self(value)
    }

    /// Underlying magnitude.
    #[must_use]
    pub const fn as_u256(&self) -> U256 {
        self.0
    }

    /// Whether this is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checked addition.
    pub fn add(self, other: impl Into<NonNegativeAmount>) -> Result<Self, AmountError> {
        self.0
            .checked_add(other.into().0)
            .map(Self)
            .ok_or(AmountError::Overflow)
    }

    /// Checked subtraction; going below zero is an error.
    pub fn subtract(self, other: impl Into<NonNegativeAmount>) -> Result<Self, AmountError> {
        self.0
            .checked_sub(other.into().0)
            .map(Self)
            .ok_or(AmountError::AmountCannotBeNegative)
    }

    /// Checked multiplication.
    pub fn multiply(self, other: impl Into<NonNegativeAmount>) -> Result<Self, AmountError> {
        self.0
            .checked_mul(other.into().0)
            .map(Self)
            .ok_or(AmountError::Overflow)
    }

    /// Whether this amount is an exact multiple of `granularity`.
    #[must_use]
    pub fn is_multiple_of(&self, granularity: &PositiveAmount) -> bool {
        (self.0 % granularity.0).is_zero()
    }

    /// Big-endian 32-byte form.
    #[must_use]
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        self.0.to_big_endian(&mut bytes);
        bytes
    }

    /// Read a big-endian form of at most 32 bytes.
    pub fn from_be_slice(bytes: &[u8]) -> Result<Self, AmountError> {
        if bytes.len() > 32 {
            return Err(AmountError::Overflow);
        }
        Ok(Self(U256::from_big_endian(bytes)))
    }
}

impl From<u64> for NonNegativeAmount {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl From<PositiveAmount> for NonNegativeAmount {
    fn from(value: PositiveAmount) -> Self {
        Self(value.0)
    }
}

impl FromStr for NonNegativeAmount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with('-') {
            return Err(AmountError::AmountCannotBeNegative);
        }
        U256::from_dec_str(s)
            .map(Self)
            .map_err(|_| AmountError::InvalidDecimalString(s.to_string()))
    }
}

impl fmt::Display for NonNegativeAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for NonNegativeAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NonNegativeAmount({})", self.0)
    }
}

/// Amount strictly greater than zero.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PositiveAmount(U256);

/// Smallest transferable unit of a token.
pub type Granularity = PositiveAmount;

impl PositiveAmount {
    /// One, also the default granularity.
    pub const ONE: Self = Self(U256([1, 0, 0, 0]));

    /// Validate a raw magnitude.
    pub fn new(value: U256) -> Result<Self, AmountError> {
        if value.is_zero() {
            return Err(AmountError::AmountCannotBeZero);
        }
        Ok(Self(value))
    }

    /// Non-zero `u64` convenience constructor.
    pub fn from_u64(value: u64) -> Result<Self, AmountError> {
        Self::new(U256::from(value))
    }

    /// Underlying magnitude.
    #[must_use]
    pub const fn as_u256(&self) -> U256 {
        self.0
    }

    /// Checked addition.
    pub fn add(self, other: impl Into<NonNegativeAmount>) -> Result<Self, AmountError> {
        self.0
            .checked_add(other.into().as_u256())
            .map(Self)
            .ok_or(AmountError::Overflow)
    }

    /// Checked subtraction; a zero or negative result is an error.
    pub fn subtract(self, other: impl Into<NonNegativeAmount>) -> Result<Self, AmountError> {
        let difference = self
            .0
            .checked_sub(other.into().as_u256())
            .ok_or(AmountError::AmountCannotBeNegative)?;
        Self::new(difference)
    }

    /// Checked multiplication.
    pub fn multiply(self, other: PositiveAmount) -> Result<Self, AmountError> {
        self.0
            .checked_mul(other.0)
            .map(Self)
            .ok_or(AmountError::Overflow)
    }

    /// Whether this amount is an exact multiple of `granularity`.
    #[must_use]
    pub fn is_multiple_of(&self, granularity: &Granularity) -> bool {
        NonNegativeAmount::from(*self).is_multiple_of(granularity)
    }
}

impl Default for PositiveAmount {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<NonNegativeAmount> for PositiveAmount {
    type Error = AmountError;

    fn try_from(value: NonNegativeAmount) -> Result<Self, Self::Error> {
        Self::new(value.as_u256())
    }
}

impl FromStr for PositiveAmount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<NonNegativeAmount>()?.try_into()
    }
}

impl fmt::Display for PositiveAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for PositiveAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PositiveAmount({})", self.0)
    }
}

/// Signed amount used for intermediate balance arithmetic.
///
/// Zero is always non-negative, so `-0` and `0` compare equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SignedAmount {
    magnitude: U256,
    negative: bool,
}

impl SignedAmount {
    /// Zero.
    pub const ZERO: Self = Self {
        magnitude: U256([0; 4]),
        negative: false,
    };

    fn normalized(magnitude: U256, negative: bool) -> Self {
        Self {
            magnitude,
            negative: negative && !magnitude.is_zero(),
        }
    }

    /// Positive value of `amount`.
    #[must_use]
    pub fn positive(amount: impl Into<NonNegativeAmount>) -> Self {
        Self::normalized(amount.into().as_u256(), false)
    }

    /// Negated value of `amount`.
    #[must_use]
    pub fn negative(amount: impl Into<NonNegativeAmount>) -> Self {
        Self::normalized(amount.into().as_u256(), true)
    }

    /// Whether this is strictly below zero.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.negative
    }

    /// Whether this is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.magnitude.is_zero()
    }

    /// Absolute value.
    #[must_use]
    pub const fn abs(&self) -> NonNegativeAmount {
        NonNegativeAmount::from_u256(self.magnitude)
    }

    /// Sign flipped.
    #[must_use]
    pub fn negated(self) -> Self {
        Self::normalized(self.magnitude, !self.negative)
    }

    /// Checked addition; only the magnitude can overflow.
    pub fn add(self, other: SignedAmount) -> Result<Self, AmountError> {
        if self.negative == other.negative {
            let magnitude = self
                .magnitude
                .checked_add(other.magnitude)
                .ok_or(AmountError::Overflow)?;
            return Ok(Self::normalized(magnitude, self.negative));
        }
        Ok(match self.magnitude.cmp(&other.magnitude) {
            Ordering::Less => Self::normalized(other.magnitude - self.magnitude, other.negative),
            _ => Self::normalized(self.magnitude - other.magnitude, self.negative),
        })
    }

    /// Checked subtraction.
    pub fn subtract(self, other: SignedAmount) -> Result<Self, AmountError> {
        self.add(other.negated())
    }

    /// Convert to an unsigned amount, failing when negative.
    pub fn to_non_negative(&self) -> Result<NonNegativeAmount, AmountError> {
        if self.negative {
            return Err(AmountError::AmountCannotBeNegative);
        }
        Ok(NonNegativeAmount::from_u256(self.magnitude))
    }
}

impl Ord for SignedAmount {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => self.magnitude.cmp(&other.magnitude),
            (true, true) => other.magnitude.cmp(&self.magnitude),
        }
    }
}

impl PartialOrd for SignedAmount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<NonNegativeAmount> for SignedAmount {
    fn from(value: NonNegativeAmount) -> Self {
        Self::positive(value)
    }
}

impl fmt::Display for SignedAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-{}", self.magnitude)
        } else {
            write!(f, "{}", self.magnitude)
        }
    }
}

impl fmt::Debug for SignedAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignedAmount({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_DECIMAL: &str =
        "115792089237316195423570985008687907853269984665640564039457584007913129639935";

    #[test]
    fn test_max_value() {
        let max: NonNegativeAmount = MAX_DECIMAL.parse().unwrap();
        assert_eq!(max, NonNegativeAmount::MAX);
        assert_eq!(hex::encode(max.to_be_bytes()), "f".repeat(64));
    }

    #[test]
    fn test_addition_overflow_is_error() {
        let result = NonNegativeAmount::MAX.add(1u64);
        assert_eq!(result, Err(AmountError::Overflow));
    }

    #[test]
    fn test_multiplication_overflow_is_error() {
        let result = NonNegativeAmount::MAX.multiply(2u64);
        assert_eq!(result, Err(AmountError::Overflow));
    }

    #[test]
    fn test_subtraction_below_zero_is_error() {
        let three = NonNegativeAmount::from(3);
        assert_eq!(
            three.subtract(5u64),
            Err(AmountError::AmountCannotBeNegative)
        );
        assert_eq!(three.subtract(3u64), Ok(NonNegativeAmount::ZERO));
    }

    #[test]
    fn test_positive_rejects_zero() {
        assert_eq!(
            PositiveAmount::from_u64(0),
            Err(AmountError::AmountCannotBeZero)
        );
        assert_eq!(
            "0".parse::<PositiveAmount>(),
            Err(AmountError::AmountCannotBeZero)
        );
    }

    #[test]
    fn test_positive_subtract_to_zero_fails() {
        let five = PositiveAmount::from_u64(5).unwrap();
        assert_eq!(five.subtract(5u64), Err(AmountError::AmountCannotBeZero));
        assert_eq!(
            five.subtract(2u64).unwrap(),
            PositiveAmount::from_u64(3).unwrap()
        );
    }

    #[test]
    fn test_negative_string_rejected() {
        assert_eq!(
            "-1".parse::<NonNegativeAmount>(),
            Err(AmountError::AmountCannotBeNegative)
        );
    }

    #[test]
    fn test_granularity_multiple() {
        let granularity = PositiveAmount::from_u64(5).unwrap();
        assert!(NonNegativeAmount::from(20).is_multiple_of(&granularity));
        assert!(!NonNegativeAmount::from(7).is_multiple_of(&granularity));
        assert!(NonNegativeAmount::ZERO.is_multiple_of(&granularity));
    }

    #[test]
    fn test_signed_arithmetic() {
        let a = SignedAmount::positive(3u64);
        let b = SignedAmount::negative(10u64);
        let sum = a.add(b).unwrap();
        assert!(sum.is_negative());
        assert_eq!(sum.abs(), NonNegativeAmount::from(7));
        assert_eq!(sum.to_string(), "-7");

        let back = sum.add(SignedAmount::positive(7u64)).unwrap();
        assert_eq!(back, SignedAmount::ZERO);
        assert!(!back.is_negative());
    }

    #[test]
    fn test_signed_ordering() {
        let minus_two = SignedAmount::negative(2u64);
        let minus_one = SignedAmount::negative(1u64);
        let one = SignedAmount::positive(1u64);
        assert!(minus_two < minus_one);
        assert!(minus_one < SignedAmount::ZERO);
        assert!(SignedAmount::ZERO < one);
    }

    #[test]
    fn test_negative_zero_equals_zero() {
        assert_eq!(SignedAmount::negative(0u64), SignedAmount::ZERO);
    }
}
