//! DER form of ECDSA signatures.

use crate::CryptoError;
use shared_types::Signature;

/// ASN.1 DER `SEQUENCE { r INTEGER, s INTEGER }`.
pub fn to_der(signature: &Signature) -> Result<Vec<u8>, CryptoError> {
    let signature = k256::ecdsa::Signature::from_slice(&signature.to_bytes())
        .map_err(|_| CryptoError::InvalidDerEncoding)?;
    Ok(signature.to_der().as_bytes().to_vec())
}

/// Parse a DER signature and range-check its components.
pub fn from_der(bytes: &[u8]) -> Result<Signature, CryptoError> {
    let signature =
        k256::ecdsa::Signature::from_der(bytes).map_err(|_| CryptoError::InvalidDerEncoding)?;
    Ok(Signature::from_bytes(&signature.to_bytes())?)
}
