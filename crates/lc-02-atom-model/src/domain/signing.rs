//! # Atom Signing
//!
//! The signed message is the atom's content hash. Signatures are stored
//! under the signer's EUID, so an atom carries at most one per key.

use crate::domain::atom::Atom;
use crate::domain::errors::{AtomIdentifierError, SigningError};
use crate::domain::identifier::AtomIdentifier;
use lc_01_dson::{DsonDecode, DsonEncode, DsonError, DsonOutput, DsonValue};
use shared_crypto::{EcdsaSigning, PrivateKey};
use shared_types::{PublicKey, RadixHash};
use std::fmt;
use tracing::debug;

impl Atom {
    /// Sign the atom's hash with `key`.
    pub fn sign(
        self,
        signer: &dyn EcdsaSigning,
        key: &PrivateKey,
    ) -> Result<SignedAtom, SigningError> {
        SignedAtom { atom: self }.add_signature(signer, key)
    }
}

/// An atom carrying at least one signature.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SignedAtom {
    atom: Atom,
}

impl SignedAtom {
    /// Accept an atom received from elsewhere if it is signed.
    pub fn try_from_atom(atom: Atom) -> Result<Self, SigningError> {
        if atom.signatures().is_empty() {
            return Err(SigningError::MissingSignature(atom.hash_euid().to_hex()));
        }
        Ok(Self { atom })
    }

    /// Add a signature from another key.
    pub fn add_signature(
        mut self,
        signer: &dyn EcdsaSigning,
        key: &PrivateKey,
    ) -> Result<Self, SigningError> {
        let public_key = signer.derive_public_key(key)?;
        let hash = self.atom.hash();
        let signature = signer.sign(&hash, key)?;
        debug!(signer = %public_key.euid(), atom = %self.atom, "Signed atom");
        self.atom.insert_signature(public_key.euid(), signature);
        Ok(self)
    }

    /// Check that `public_key` signed this atom.
    pub fn verify(
        &self,
        verifier: &dyn EcdsaSigning,
        public_key: &PublicKey,
    ) -> Result<(), SigningError> {
        let signer = public_key.euid();
        let signature = self
            .atom
            .signature_by(&signer)
            .ok_or_else(|| SigningError::MissingSignature(signer.to_hex()))?;
        if verifier.verify(signature, &self.atom.hash(), public_key) {
            Ok(())
        } else {
            Err(SigningError::InvalidSignature(signer.to_hex()))
        }
    }

    /// The signed atom.
    #[must_use]
    pub const fn atom(&self) -> &Atom {
        &self.atom
    }

    /// Give back the atom.
    #[must_use]
    pub fn into_atom(self) -> Atom {
        self.atom
    }

    /// Content hash, identical to the unsigned atom's.
    #[must_use]
    pub fn hash(&self) -> RadixHash {
        self.atom.hash()
    }

    /// Content address.
    pub fn identifier(&self) -> Result<AtomIdentifier, AtomIdentifierError> {
        self.atom.identifier()
    }
}

impl fmt::Debug for SignedAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.atom, f)
    }
}

impl fmt::Display for SignedAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.atom, f)
    }
}

impl DsonEncode for SignedAtom {
    fn to_dson(&self, mode: DsonOutput) -> DsonValue {
        self.atom.to_dson(mode)
    }
}

impl DsonDecode for SignedAtom {
    fn from_dson(value: &DsonValue) -> Result<Self, DsonError> {
        Self::try_from_atom(Atom::from_dson(value)?).map_err(DsonError::invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::particle_group::SpunParticle;
    use crate::domain::particles::MessageParticle;
    use lc_01_dson::{decode, encode};
    use shared_crypto::{K256Signer, KeyPair};
    use shared_types::{Address, Magic};

    fn atom_from(keys: &KeyPair) -> Atom {
        let me = Address::new(Magic::default(), &keys.public_key());
        let message = MessageParticle::new(me.clone(), me, b"note to self".to_vec());
        Atom::with_timestamp(vec![[SpunParticle::up(message)].into_iter().collect()], 42)
    }

    #[test]
    fn test_sign_and_verify() {
        let keys = KeyPair::generate().unwrap();
        let atom = atom_from(&keys);
        let hash = atom.hash();
        let signed = atom.sign(&K256Signer, keys.private_key()).unwrap();
        assert_eq!(signed.hash(), hash);
        assert_eq!(signed.atom().signatures().len(), 1);
        signed.verify(&K256Signer, &keys.public_key()).unwrap();
    }

    #[test]
    fn test_verify_unknown_signer() {
        let keys = KeyPair::generate().unwrap();
        let other = KeyPair::generate().unwrap();
        let signed = atom_from(&keys)
            .sign(&K256Signer, keys.private_key())
            .unwrap();
        assert!(matches!(
            signed.verify(&K256Signer, &other.public_key()),
            Err(SigningError::MissingSignature(_))
        ));
    }

    #[test]
    fn test_tampered_signature_fails() {
        let keys = KeyPair::generate().unwrap();
        let other = KeyPair::generate().unwrap();
        let signed = atom_from(&keys)
            .sign(&K256Signer, keys.private_key())
            .unwrap();
        // Re-key the signature under another signer's EUID.
        let mut atom = signed.into_atom();
        let signature = *atom.signatures().values().next().unwrap();
        atom.insert_signature(other.public_key().euid(), signature);
        let forged = SignedAtom::try_from_atom(atom).unwrap();
        assert!(matches!(
            forged.verify(&K256Signer, &other.public_key()),
            Err(SigningError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_two_signers() {
        let a = KeyPair::generate().unwrap();
        let b = KeyPair::generate().unwrap();
        let signed = atom_from(&a)
            .sign(&K256Signer, a.private_key())
            .and_then(|s| s.add_signature(&K256Signer, b.private_key()))
            .unwrap();
        assert_eq!(signed.atom().signatures().len(), 2);
        signed.verify(&K256Signer, &a.public_key()).unwrap();
        signed.verify(&K256Signer, &b.public_key()).unwrap();
    }

    #[test]
    fn test_decode_requires_signature() {
        let keys = KeyPair::generate().unwrap();
        let unsigned = atom_from(&keys);
        let bytes = encode(&unsigned, DsonOutput::Default);
        assert!(decode::<SignedAtom>(&bytes).is_err());

        let signed = unsigned.sign(&K256Signer, keys.private_key()).unwrap();
        let decoded: SignedAtom = decode(&encode(&signed, DsonOutput::Default)).unwrap();
        decoded.verify(&K256Signer, &keys.public_key()).unwrap();
    }
}
