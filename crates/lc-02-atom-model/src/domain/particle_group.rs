//! # Particle Groups
//!
//! A group is an ordered list of spun particles that must be valid together.

use crate::domain::particles::Particle;
use crate::domain::spin::Spin;
use lc_01_dson::{DsonDecode, DsonEncode, DsonError, DsonOutput, DsonValue, ObjectBuilder, ObjectReader};
use std::collections::BTreeMap;

/// Serializer of [`SpunParticle`].
pub const SPUN_PARTICLE_SERIALIZER: &str = "radix.spun_particle";

/// Serializer of [`ParticleGroup`].
pub const PARTICLE_GROUP_SERIALIZER: &str = "radix.particle_group";

/// A particle together with the state transition applied to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpunParticle {
    /// The particle.
    pub particle: Particle,
    /// Up creates it, down consumes it.
    pub spin: Spin,
}

impl SpunParticle {
    /// Pair a particle with a spin.
    pub fn new(particle: impl Into<Particle>, spin: Spin) -> Self {
        Self {
            particle: particle.into(),
            spin,
        }
    }

    /// Spun up.
    pub fn up(particle: impl Into<Particle>) -> Self {
        Self::new(particle, Spin::Up)
    }

    /// Spun down.
    pub fn down(particle: impl Into<Particle>) -> Self {
        Self::new(particle, Spin::Down)
    }
}

impl DsonEncode for SpunParticle {
    fn to_dson(&self, mode: DsonOutput) -> DsonValue {
        ObjectBuilder::new(SPUN_PARTICLE_SERIALIZER, mode)
            .field("particle", &self.particle)
            .field("spin", &self.spin)
            .build()
    }
}

impl DsonDecode for SpunParticle {
    fn from_dson(value: &DsonValue) -> Result<Self, DsonError> {
        let reader = ObjectReader::new(value, SPUN_PARTICLE_SERIALIZER)?;
        Ok(Self {
            particle: reader.required("particle")?,
            spin: reader.required("spin")?,
        })
    }
}

/// Ordered spun particles plus free-form metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ParticleGroup {
    /// Particles in application order.
    pub particles: Vec<SpunParticle>,
    /// Group metadata.
    pub meta_data: BTreeMap<String, String>,
}

impl ParticleGroup {
    /// Group of the given particles without metadata.
    #[must_use]
    pub fn new(particles: Vec<SpunParticle>) -> Self {
        Self {
            particles,
            meta_data: BTreeMap::new(),
        }
    }

    /// Particles with the given spin, in order.
    pub fn particles_with_spin(&self, spin: Spin) -> impl Iterator<Item = &Particle> + '_ {
        self.particles
            .iter()
            .filter(move |sp| sp.spin == spin)
            .map(|sp| &sp.particle)
    }

    /// Whether the group carries no particles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

impl FromIterator<SpunParticle> for ParticleGroup {
    fn from_iter<I: IntoIterator<Item = SpunParticle>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl DsonEncode for ParticleGroup {
    fn to_dson(&self, mode: DsonOutput) -> DsonValue {
        let meta_data = (!self.meta_data.is_empty()).then_some(&self.meta_data);
        ObjectBuilder::new(PARTICLE_GROUP_SERIALIZER, mode)
            .field("particles", self.particles.as_slice())
            .optional_field("metaData", meta_data)
            .build()
    }
}

impl DsonDecode for ParticleGroup {
    fn from_dson(value: &DsonValue) -> Result<Self, DsonError> {
        let reader = ObjectReader::new(value, PARTICLE_GROUP_SERIALIZER)?;
        Ok(Self {
            particles: reader.required("particles")?,
            meta_data: reader.optional("metaData")?.unwrap_or_default(),
        })
    }
}
