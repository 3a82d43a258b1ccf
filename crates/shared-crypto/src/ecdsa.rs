//! # ECDSA Signatures (secp256k1)
//!
//! The signing capability consumed by the atom model. Digests are signed as
//! prehashes: the caller supplies the 32-byte `RadixHash` of the payload and
//! it is not hashed again.
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces (no RNG dependency for signing)
//! - Low-S normalization

use crate::CryptoError;
use k256::ecdsa::{
    signature::hazmat::{PrehashSigner, PrehashVerifier},
    SigningKey, VerifyingKey,
};
use shared_types::{PublicKey, RadixHash, Signature};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// secp256k1 private scalar, wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey([u8; 32]);

impl PrivateKey {
    /// Wrap a 32-byte scalar, checking it lies in `[1, n - 1]`.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        SigningKey::from_bytes((&bytes).into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self(bytes))
    }

    /// Draw a random key.
    #[must_use]
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        Self(signing_key.to_bytes().into())
    }

    /// Raw scalar bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    fn signing_key(&self) -> Result<SigningKey, CryptoError> {
        SigningKey::from_bytes((&self.0).into()).map_err(|_| CryptoError::InvalidPrivateKey)
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}

/// Signing capability over 32-byte digests.
pub trait EcdsaSigning: Send + Sync {
    /// Sign `hash` with `private_key`.
    fn sign(&self, hash: &RadixHash, private_key: &PrivateKey) -> Result<Signature, CryptoError>;

    /// Whether `signature` over `hash` was produced by the holder of `public_key`.
    fn verify(&self, signature: &Signature, hash: &RadixHash, public_key: &PublicKey) -> bool;

    /// Compressed public key of `private_key`.
    fn derive_public_key(&self, private_key: &PrivateKey) -> Result<PublicKey, CryptoError>;
}

/// `EcdsaSigning` backed by the `k256` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct K256Signer;

impl EcdsaSigning for K256Signer {
    fn sign(&self, hash: &RadixHash, private_key: &PrivateKey) -> Result<Signature, CryptoError> {
        let signing_key = private_key.signing_key()?;
        let signature: k256::ecdsa::Signature = signing_key
            .sign_prehash(hash.as_bytes())
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
        Ok(Signature::from_bytes(&signature.to_bytes())?)
    }

    fn verify(&self, signature: &Signature, hash: &RadixHash, public_key: &PublicKey) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_sec1_bytes(public_key.as_bytes()) else {
            return false;
        };
        let Ok(signature) = k256::ecdsa::Signature::from_slice(&signature.to_bytes()) else {
            return false;
        };
        verifying_key
            .verify_prehash(hash.as_bytes(), &signature)
            .is_ok()
    }

    fn derive_public_key(&self, private_key: &PrivateKey) -> Result<PublicKey, CryptoError> {
        let signing_key = private_key.signing_key()?;
        let point = signing_key.verifying_key().to_encoded_point(true);
        Ok(PublicKey::from_slice(point.as_bytes())?)
    }
}

/// A private key together with its public key.
pub struct KeyPair {
    private_key: PrivateKey,
    public_key: PublicKey,
}

impl KeyPair {
    /// Random key pair.
    pub fn generate() -> Result<Self, CryptoError> {
        Self::from_private_key(PrivateKey::generate())
    }

    /// Derive the public half of `private_key`.
    pub fn from_private_key(private_key: PrivateKey) -> Result<Self, CryptoError> {
        let public_key = K256Signer.derive_public_key(&private_key)?;
        Ok(Self {
            private_key,
            public_key,
        })
    }

    /// Private half.
    #[must_use]
    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    /// Public half.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    /// Sign with the `k256` backend.
    pub fn sign(&self, hash: &RadixHash) -> Result<Signature, CryptoError> {
        K256Signer.sign(hash, &self.private_key)
    }
}

/// Verify a signature, surfacing failure as an error.
pub fn verify_or_err(
    signer: &dyn EcdsaSigning,
    signature: &Signature,
    hash: &RadixHash,
    public_key: &PublicKey,
) -> Result<(), CryptoError> {
    if signer.verify(signature, hash, public_key) {
        Ok(())
    } else {
        Err(CryptoError::SignatureVerificationFailed)
    }
}
