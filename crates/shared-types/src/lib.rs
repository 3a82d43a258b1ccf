//! # Shared Types Crate
//!
//! Primitive value types used across the ledger client: addresses, amounts,
//! hashes, signatures, nonces, resource identifiers and node endpoints.
//!
//! ## Design Principles
//!
//! - **Self-Validating**: every constructor checks its invariants and returns
//!   a typed error; an instance that exists is valid.
//! - **Immutable**: arithmetic returns new values and never wraps.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod address;
pub mod amount;
pub mod errors;
pub mod hash;
pub mod node;
pub mod nonce;
pub mod permissions;
pub mod public_key;
pub mod resource;
pub mod signature;
pub mod strings;

pub use address::{Address, Magic};
pub use amount::{Granularity, NonNegativeAmount, PositiveAmount, SignedAmount};
pub use errors::*;
pub use hash::{sha256d, Euid, RadixHash, Shard};
pub use node::{Node, WebSocketStatus};
pub use nonce::{now_millis, Nonce, Planck};
pub use permissions::{TokenPermission, TokenPermissions};
pub use primitive_types::U256;
pub use public_key::PublicKey;
pub use resource::ResourceIdentifier;
pub use signature::{Signature, CURVE_ORDER};
pub use strings::{Description, Name, Symbol};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
