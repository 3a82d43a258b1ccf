//! Nonces and coarse ledger time.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Random value making otherwise identical particles distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nonce(pub i64);

impl Nonce {
    /// Draw a uniformly random nonce.
    #[must_use]
    pub fn random() -> Self {
        Self(rand::random())
    }
}

impl Default for Nonce {
    fn default() -> Self {
        Self::random()
    }
}

impl From<i64> for Nonce {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Ledger time in whole minutes since the Unix epoch, offset by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Planck(pub u64);

impl Planck {
    const MILLIS_PER_PLANCK: u64 = 60_000;

    /// Planck containing the given Unix time in milliseconds.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis / Self::MILLIS_PER_PLANCK + 1)
    }

    /// Planck of the current wall clock.
    #[must_use]
    pub fn now() -> Self {
        Self::from_millis(now_millis())
    }
}

impl Default for Planck {
    fn default() -> Self {
        Self::now()
    }
}

/// Current Unix time in milliseconds. A clock before the epoch reads as zero.
#[must_use]
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
