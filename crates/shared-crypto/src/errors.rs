//! Crypto error types.

use shared_types::{PublicKeyError, SignatureError};
use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Signature verification failed
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// DER input could not be parsed
    #[error("Invalid DER signature encoding")]
    InvalidDerEncoding,

    /// Key bytes are not a point on the curve
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Scalar is zero or not below the curve order
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Signing backend rejected the digest
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// Produced or parsed signature is out of range
    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// Produced public key is malformed
    #[error(transparent)]
    PublicKey(#[from] PublicKeyError),
}
