//! # Particles
//!
//! The closed set of ledger facts. Dispatch over the variants is a plain
//! `match`; decoding picks the variant from the `serializer` field.

mod definition;
mod message;
mod transferrable;
mod unallocated;
mod unique;

pub use definition::{
    TokenDefinitionParticle, TokenSupplyType, FIXED_SUPPLY_SERIALIZER, MUTABLE_SUPPLY_SERIALIZER,
};
pub use message::{MessageParticle, MESSAGE_SERIALIZER};
pub use transferrable::{TransferrableTokensParticle, TRANSFERRABLE_TOKENS_SERIALIZER};
pub use unallocated::{UnallocatedTokensParticle, UNALLOCATED_TOKENS_SERIALIZER};
pub use unique::{
    ResourceIdentifierParticle, UniqueParticle, RESOURCE_IDENTIFIER_SERIALIZER, UNIQUE_SERIALIZER,
};

use lc_01_dson::{DsonDecode, DsonEncode, DsonError, DsonOutput, DsonValue};
use shared_types::{Address, RadixHash, ResourceIdentifier, Shard};
use std::collections::BTreeSet;

/// A ledger fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Particle {
    /// Tokens owned by an address.
    Transferrable(TransferrableTokensParticle),
    /// Unminted supply of a mutable token.
    Unallocated(UnallocatedTokensParticle),
    /// Token definition.
    Definition(TokenDefinitionParticle),
    /// Message between addresses.
    Message(MessageParticle),
    /// Uniqueness claim.
    Unique(UniqueParticle),
    /// Resource identifier reservation.
    ResourceIdentifier(ResourceIdentifierParticle),
}

impl Particle {
    /// Serializer name of the variant.
    #[must_use]
    pub fn serializer(&self) -> &'static str {
        match self {
            Self::Transferrable(_) => TRANSFERRABLE_TOKENS_SERIALIZER,
            Self::Unallocated(_) => UNALLOCATED_TOKENS_SERIALIZER,
            Self::Definition(p) => p.serializer(),
            Self::Message(_) => MESSAGE_SERIALIZER,
            Self::Unique(_) => UNIQUE_SERIALIZER,
            Self::ResourceIdentifier(_) => RESOURCE_IDENTIFIER_SERIALIZER,
        }
    }

    /// Accounting parties.
    #[must_use]
    pub fn addresses(&self) -> BTreeSet<Address> {
        match self {
            Self::Transferrable(p) => BTreeSet::from([p.address.clone()]),
            Self::Unallocated(p) => BTreeSet::from([p.token_definition_reference.address().clone()]),
            Self::Definition(p) => BTreeSet::from([p.owner().clone()]),
            Self::Message(p) => BTreeSet::from([p.from.clone(), p.to.clone()]),
            Self::Unique(p) => BTreeSet::from([p.address.clone()]),
            Self::ResourceIdentifier(p) => BTreeSet::from([p.rri.address().clone()]),
        }
    }

    /// Parties whose shards hold this particle's state.
    #[must_use]
    pub fn shardables(&self) -> BTreeSet<Address> {
        // Every current variant routes by its accounting parties.
        self.addresses()
    }

    /// Shards of [`Self::shardables`].
    #[must_use]
    pub fn shards(&self) -> BTreeSet<Shard> {
        self.shardables().iter().map(Address::shard).collect()
    }

    /// Token the particle refers to, if any.
    #[must_use]
    pub fn token_reference(&self) -> Option<&ResourceIdentifier> {
        match self {
            Self::Transferrable(p) => Some(&p.token_definition_reference),
            Self::Unallocated(p) => Some(&p.token_definition_reference),
            Self::Definition(p) => Some(&p.rri),
            _ => None,
        }
    }

    /// Content hash of the particle.
    #[must_use]
    pub fn hash(&self) -> RadixHash {
        lc_01_dson::hash_of(self)
    }

    /// The transferrable payload, if this is one.
    #[must_use]
    pub fn as_transferrable(&self) -> Option<&TransferrableTokensParticle> {
        match self {
            Self::Transferrable(p) => Some(p),
            _ => None,
        }
    }

    /// The message payload, if this is one.
    #[must_use]
    pub fn as_message(&self) -> Option<&MessageParticle> {
        match self {
            Self::Message(p) => Some(p),
            _ => None,
        }
    }
}

impl DsonEncode for Particle {
    fn to_dson(&self, mode: DsonOutput) -> DsonValue {
        match self {
            Self::Transferrable(p) => p.to_dson(mode),
            Self::Unallocated(p) => p.to_dson(mode),
            Self::Definition(p) => p.to_dson(mode),
            Self::Message(p) => p.to_dson(mode),
            Self::Unique(p) => p.to_dson(mode),
            Self::ResourceIdentifier(p) => p.to_dson(mode),
        }
    }
}

impl DsonDecode for Particle {
    fn from_dson(value: &DsonValue) -> Result<Self, DsonError> {
        let particle = match value.serializer()? {
            TRANSFERRABLE_TOKENS_SERIALIZER => {
                Self::Transferrable(TransferrableTokensParticle::from_dson(value)?)
            }
            UNALLOCATED_TOKENS_SERIALIZER => {
                Self::Unallocated(UnallocatedTokensParticle::from_dson(value)?)
            }
            MUTABLE_SUPPLY_SERIALIZER | FIXED_SUPPLY_SERIALIZER => {
                Self::Definition(TokenDefinitionParticle::from_dson(value)?)
            }
            MESSAGE_SERIALIZER => Self::Message(MessageParticle::from_dson(value)?),
            UNIQUE_SERIALIZER => Self::Unique(UniqueParticle::from_dson(value)?),
            RESOURCE_IDENTIFIER_SERIALIZER => {
                Self::ResourceIdentifier(ResourceIdentifierParticle::from_dson(value)?)
            }
            other => return Err(DsonError::UnknownSerializer(other.to_string())),
        };
        Ok(particle)
    }
}

macro_rules! into_particle {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Particle {
            fn from(particle: $ty) -> Self {
                Self::$variant(particle)
            }
        }
    };
}

into_particle!(TransferrableTokensParticle, Transferrable);
into_particle!(UnallocatedTokensParticle, Unallocated);
into_particle!(TokenDefinitionParticle, Definition);
into_particle!(MessageParticle, Message);
into_particle!(UniqueParticle, Unique);
into_particle!(ResourceIdentifierParticle, ResourceIdentifier);
