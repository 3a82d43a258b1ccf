//! # Algorithms Module
//!
//! Pure folds of particles into application state, and the mapping of
//! user actions back into particles.

pub mod token_balance;
pub mod token_definitions;
pub mod transfer;

pub use token_balance::TokenBalanceReducer;
pub use token_definitions::{TokenDefinitionsReducer, TokenDefinitionsState};
pub use transfer::{
    TransferTokensActionToParticleGroupsMapper, APPLICATION_KEY, MESSAGE_APPLICATION,
};

use lc_02_atom_model::SpunParticle;

/// Folds spun particles into a projection. No I/O.
pub trait ParticleReducer {
    /// Projection being built.
    type State: Clone;
    /// Failure that aborts the fold.
    type Error;

    /// State before any particle.
    fn initial_state(&self) -> Self::State;

    /// Fold one spun particle. Particles the reducer does not track leave
    /// the state unchanged.
    fn reduce(&self, state: Self::State, spun: &SpunParticle) -> Result<Self::State, Self::Error>;

    /// Fold every particle, starting from [`Self::initial_state`].
    fn reduce_all<'a, I>(&self, particles: I) -> Result<Self::State, Self::Error>
    where
        I: IntoIterator<Item = &'a SpunParticle>,
    {
        particles
            .into_iter()
            .try_fold(self.initial_state(), |state, spun| self.reduce(state, spun))
    }
}
