//! # LC-03 Particle Reduction
//!
//! Folds ledger particles into application state and maps user actions
//! back into particles.
//!
//! **Architecture:** pure algorithms over the atom model, no I/O
//!
//! ## Purpose
//!
//! - Token balances per holder, order independent
//! - Token definitions assembled from definition and supply fragments
//! - Transfers mapped to consumed and created particles
//!
//! ## Module Structure
//!
//! ```text
//! lc-03-reduction/
//! ├── domain/
//! │   ├── balances.rs      # TokenBalances
//! │   ├── token_state.rs   # Partial / Full token state and merging
//! │   ├── action.rs        # TransferTokensAction
//! │   └── errors.rs
//! └── algorithms/
//!     ├── token_balance.rs
//!     ├── token_definitions.rs
//!     └── transfer.rs
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod algorithms;
pub mod domain;

// Re-exports
pub use algorithms::{
    ParticleReducer, TokenBalanceReducer, TokenDefinitionsReducer, TokenDefinitionsState,
    TransferTokensActionToParticleGroupsMapper,
};
pub use domain::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
