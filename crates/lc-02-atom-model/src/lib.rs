//! # LC-02 Atom Model
//!
//! Ledger facts and the transactions that carry them.
//!
//! **Architecture:** pure domain crate, no I/O
//!
//! ## Purpose
//!
//! - Particles: the closed set of ledger facts (tokens, definitions,
//!   messages, uniqueness claims, identifier reservations)
//! - Spun particles and particle groups: state transitions applied together
//! - Atoms: content hashed, signed, routed by shard
//! - Atom identifiers: `hash[0..24] ‖ shard`
//!
//! ## Module Structure
//!
//! ```text
//! lc-02-atom-model/
//! └── domain/
//!     ├── particles/       # Particle enum and its variants
//!     ├── spin.rs          # Up / Down
//!     ├── particle_group.rs
//!     ├── atom.rs          # Atom, shards, required first shards
//!     ├── identifier.rs    # AtomIdentifier, shard selection
//!     ├── signing.rs       # SignedAtom
//!     └── errors.rs
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;

// Re-exports
pub use domain::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
