//! # Shared Crypto - secp256k1 Signing Capability
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `ecdsa` | secp256k1 | Atom signing and verification |
//! | `der` | ASN.1 DER | Signature interchange |
//!
//! Consumers depend on the [`EcdsaSigning`] trait, not on `k256` directly.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod der;
pub mod ecdsa;
pub mod errors;

// Re-exports
pub use der::{from_der, to_der};
pub use ecdsa::{verify_or_err, EcdsaSigning, K256Signer, KeyPair, PrivateKey};
pub use errors::CryptoError;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
