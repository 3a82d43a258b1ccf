//! Token mint and burn permissions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Who may perform a token action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPermission {
    /// Only the address that defined the token.
    TokenOwnerOnly,
    /// Any address.
    All,
    /// Nobody.
    None,
}

impl TokenPermission {
    /// Wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TokenOwnerOnly => "token_owner_only",
            Self::All => "all",
            Self::None => "none",
        }
    }

    /// Parse the wire name.
    #[must_use]
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "token_owner_only" => Some(Self::TokenOwnerOnly),
            "all" => Some(Self::All),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

impl fmt::Display for TokenPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permissions attached to a token definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenPermissions {
    /// Who may burn.
    pub burn: TokenPermission,
    /// Who may mint.
    pub mint: TokenPermission,
}

impl TokenPermissions {
    /// Owner may mint and burn.
    pub const MUTABLE_SUPPLY: Self = Self {
        burn: TokenPermission::TokenOwnerOnly,
        mint: TokenPermission::TokenOwnerOnly,
    };

    /// Supply can never change.
    pub const FIXED_SUPPLY: Self = Self {
        burn: TokenPermission::None,
        mint: TokenPermission::None,
    };

    /// Whether new supply can be minted by anyone.
    #[must_use]
    pub fn can_mint(&self) -> bool {
        self.mint != TokenPermission::None
    }

    /// Key-sorted `action -> permission` form used in encodings.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<&'static str, TokenPermission> {
        BTreeMap::from([("burn", self.burn), ("mint", self.mint)])
    }
}

impl Default for TokenPermissions {
    fn default() -> Self {
        Self::MUTABLE_SUPPLY
    }
}
