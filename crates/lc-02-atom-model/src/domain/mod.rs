//! Domain layer: particles, groups, atoms, identity and signing.

pub mod atom;
pub mod errors;
pub mod identifier;
pub mod particle_group;
pub mod particles;
pub mod signing;
pub mod spin;

pub use atom::{Atom, ATOM_SERIALIZER, TIMESTAMP_KEY};
pub use errors::{AtomIdentifierError, ParticleError, SigningError};
pub use identifier::{select_shard, AtomIdentifier};
pub use particle_group::{
    ParticleGroup, SpunParticle, PARTICLE_GROUP_SERIALIZER, SPUN_PARTICLE_SERIALIZER,
};
pub use particles::*;
pub use signing::SignedAtom;
pub use spin::Spin;
