//! Uniqueness claims and resource identifier reservations.

use crate::domain::errors::ParticleError;
use lc_01_dson::{DsonDecode, DsonEncode, DsonError, DsonOutput, DsonValue, ObjectBuilder, ObjectReader};
use shared_types::{Address, Nonce, ResourceIdentifier};

/// Serializer of unique claims.
pub const UNIQUE_SERIALIZER: &str = "radix.particles.unique";

/// Serializer of identifier reservations.
pub const RESOURCE_IDENTIFIER_SERIALIZER: &str = "radix.particles.rri";

/// Claim of a name that can exist only once per address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniqueParticle {
    /// Claimant.
    pub address: Address,
    /// Claimed name.
    pub name: String,
    /// Disambiguates otherwise equal particles.
    pub nonce: Nonce,
}

impl UniqueParticle {
    /// New claim with a random nonce.
    #[must_use]
    pub fn new(address: Address, name: impl Into<String>) -> Self {
        Self {
            address,
            name: name.into(),
            nonce: Nonce::random(),
        }
    }

    /// `/address/name` of the claim.
    pub fn identifier(&self) -> Result<ResourceIdentifier, ParticleError> {
        ResourceIdentifier::new(self.address.clone(), self.name.clone())
            .map_err(|e| ParticleError::InvalidResourceIdentifier(e.to_string()))
    }
}

impl DsonEncode for UniqueParticle {
    fn to_dson(&self, mode: DsonOutput) -> DsonValue {
        ObjectBuilder::new(UNIQUE_SERIALIZER, mode)
            .field("address", &self.address)
            .field("name", &self.name)
            .field("nonce", &self.nonce)
            .build()
    }
}

impl DsonDecode for UniqueParticle {
    fn from_dson(value: &DsonValue) -> Result<Self, DsonError> {
        let reader = ObjectReader::new(value, UNIQUE_SERIALIZER)?;
        Ok(Self {
            address: reader.required("address")?,
            name: reader.required("name")?,
            nonce: reader.required("nonce")?,
        })
    }
}

/// Reserves a resource identifier. Consumed (down) when the resource is
/// defined so the same identifier cannot be defined twice.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceIdentifierParticle {
    /// Reserved identifier.
    pub rri: ResourceIdentifier,
    /// Disambiguates otherwise equal particles.
    pub nonce: Nonce,
}

impl ResourceIdentifierParticle {
    /// Reservation with nonce zero, as every address implicitly owns one.
    #[must_use]
    pub fn new(rri: ResourceIdentifier) -> Self {
        Self {
            rri,
            nonce: Nonce(0),
        }
    }
}

impl DsonEncode for ResourceIdentifierParticle {
    fn to_dson(&self, mode: DsonOutput) -> DsonValue {
        ObjectBuilder::new(RESOURCE_IDENTIFIER_SERIALIZER, mode)
            .field("rri", &self.rri)
            .field("nonce", &self.nonce)
            .build()
    }
}

impl DsonDecode for ResourceIdentifierParticle {
    fn from_dson(value: &DsonValue) -> Result<Self, DsonError> {
        let reader = ObjectReader::new(value, RESOURCE_IDENTIFIER_SERIALIZER)?;
        Ok(Self {
            rri: reader.required("rri")?,
            nonce: reader.required("nonce")?,
        })
    }
}
