//! # Atoms
//!
//! The unit of ledger submission: ordered particle groups, signatures keyed
//! by signer EUID, and metadata carrying the creation timestamp.
//!
//! Two atoms are equal exactly when their content hashes are equal.
//! Signatures are left out of the hash so that signing does not change it.

use crate::domain::errors::AtomIdentifierError;
use crate::domain::identifier::AtomIdentifier;
use crate::domain::particle_group::{ParticleGroup, SpunParticle};
use crate::domain::particles::Particle;
use crate::domain::spin::Spin;
use lc_01_dson::{
    DsonDecode, DsonEncode, DsonError, DsonOutput, DsonValue, ObjectBuilder, ObjectReader,
    Visibility,
};
use shared_types::{now_millis, Address, Euid, RadixHash, Shard, Signature};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Serializer name.
pub const ATOM_SERIALIZER: &str = "radix.atom";

/// Metadata key of the creation time in Unix milliseconds.
pub const TIMESTAMP_KEY: &str = "timestamp";

/// A ledger transaction.
#[derive(Clone)]
pub struct Atom {
    particle_groups: Vec<ParticleGroup>,
    signatures: BTreeMap<String, Signature>,
    meta_data: BTreeMap<String, String>,
}

impl Atom {
    /// Unsigned atom stamped with the current time.
    #[must_use]
    pub fn new(particle_groups: Vec<ParticleGroup>) -> Self {
        Self::with_timestamp(particle_groups, now_millis())
    }

    /// Unsigned atom with an explicit timestamp.
    #[must_use]
    pub fn with_timestamp(particle_groups: Vec<ParticleGroup>, timestamp_millis: u64) -> Self {
        let meta_data = BTreeMap::from([(TIMESTAMP_KEY.to_string(), timestamp_millis.to_string())]);
        Self {
            particle_groups,
            signatures: BTreeMap::new(),
            meta_data,
        }
    }

    /// Particle groups in order.
    #[must_use]
    pub fn particle_groups(&self) -> &[ParticleGroup] {
        &self.particle_groups
    }

    /// Signatures keyed by signer EUID hex.
    #[must_use]
    pub const fn signatures(&self) -> &BTreeMap<String, Signature> {
        &self.signatures
    }

    /// Free-form metadata.
    #[must_use]
    pub const fn meta_data(&self) -> &BTreeMap<String, String> {
        &self.meta_data
    }

    /// Creation time in Unix milliseconds, if recorded.
    #[must_use]
    pub fn timestamp(&self) -> Option<u64> {
        self.meta_data.get(TIMESTAMP_KEY)?.parse().ok()
    }

    /// Every spun particle across all groups, in order.
    pub fn spun_particles(&self) -> impl Iterator<Item = &SpunParticle> + '_ {
        self.particle_groups
            .iter()
            .flat_map(|group| group.particles.iter())
    }

    /// Particles with the given spin, in order.
    pub fn particles(&self, spin: Spin) -> impl Iterator<Item = &Particle> + '_ {
        self.spun_particles()
            .filter(move |sp| sp.spin == spin)
            .map(|sp| &sp.particle)
    }

    /// Shards of every party the atom touches.
    #[must_use]
    pub fn shards(&self) -> BTreeSet<Shard> {
        self.spun_particles()
            .flat_map(|sp| sp.particle.shards())
            .collect()
    }

    /// Shards that must be consulted before any consumed particle can be
    /// resolved. Equal to [`Self::shards`] when nothing is consumed.
    #[must_use]
    pub fn required_first_shards(&self) -> BTreeSet<Shard> {
        let down: Vec<&Particle> = self.particles(Spin::Down).collect();
        if down.is_empty() {
            return self.shards();
        }
        down.into_iter().flat_map(Particle::shards).collect()
    }

    /// Addresses of every party the atom touches.
    #[must_use]
    pub fn addresses(&self) -> BTreeSet<Address> {
        self.spun_particles()
            .flat_map(|sp| sp.particle.addresses())
            .collect()
    }

    /// Content hash. Excludes signatures.
    #[must_use]
    pub fn hash(&self) -> RadixHash {
        lc_01_dson::hash_of(self)
    }

    /// EUID of the content hash.
    #[must_use]
    pub fn hash_euid(&self) -> Euid {
        self.hash().to_euid()
    }

    /// Content address. Fails only for an atom without particles.
    pub fn identifier(&self) -> Result<AtomIdentifier, AtomIdentifierError> {
        AtomIdentifier::new(&self.hash(), &self.shards())
    }

    pub(crate) fn insert_signature(&mut self, signer: Euid, signature: Signature) {
        self.signatures.insert(signer.to_hex(), signature);
    }

    pub(crate) fn signature_by(&self, signer: &Euid) -> Option<&Signature> {
        self.signatures.get(&signer.to_hex())
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        self.hash() == other.hash()
    }
}

impl Eq for Atom {}

impl Hash for Atom {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Atom::hash(self).hash(state);
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Atom({})", self.hash_euid())
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Atom({}, pg#{}, p#{}, md#{}, s#{})",
            self.hash_euid(),
            self.particle_groups.len(),
            self.spun_particles().count(),
            self.meta_data.len(),
            self.signatures.len()
        )
    }
}

impl DsonEncode for Atom {
    fn to_dson(&self, mode: DsonOutput) -> DsonValue {
        let builder = ObjectBuilder::new(ATOM_SERIALIZER, mode)
            .field("particleGroups", self.particle_groups.as_slice());
        let builder = if self.signatures.is_empty() {
            builder
        } else {
            builder.field_with(Visibility::NotInHash, "signatures", &self.signatures)
        };
        builder.field("metaData", &self.meta_data).build()
    }
}

impl DsonDecode for Atom {
    fn from_dson(value: &DsonValue) -> Result<Self, DsonError> {
        let reader = ObjectReader::new(value, ATOM_SERIALIZER)?;
        Ok(Self {
            particle_groups: reader.optional("particleGroups")?.unwrap_or_default(),
            signatures: reader.optional("signatures")?.unwrap_or_default(),
            meta_data: reader.optional("metaData")?.unwrap_or_default(),
        })
    }
}
