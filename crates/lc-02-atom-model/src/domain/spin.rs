//! Consumption state of a particle.

use lc_01_dson::{DsonDecode, DsonEncode, DsonError, DsonOutput, DsonValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// `Up` creates state; `Down` consumes a previously up particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Spin {
    /// Unconsumed.
    Up,
    /// Consumed.
    Down,
}

impl Spin {
    /// Wire value, `1` or `-1`.
    #[must_use]
    pub const fn value(self) -> i64 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }

    /// The opposite spin.
    #[must_use]
    pub const fn inverted(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}

impl fmt::Display for Spin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Up => "up",
            Self::Down => "down",
        })
    }
}

impl DsonEncode for Spin {
    fn to_dson(&self, _: DsonOutput) -> DsonValue {
        DsonValue::Int(self.value())
    }
}

impl DsonDecode for Spin {
    fn from_dson(value: &DsonValue) -> Result<Self, DsonError> {
        match value.as_int()? {
            1 => Ok(Self::Up),
            -1 => Ok(Self::Down),
            other => Err(DsonError::InvalidValue(format!("spin {other}"))),
        }
    }
}
