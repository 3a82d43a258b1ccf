//! Token balances: up adds, down subtracts.

use super::ParticleReducer;
use crate::domain::{ReductionError, TokenBalances};
use lc_02_atom_model::{Particle, Spin, SpunParticle};
use shared_types::SignedAmount;

/// Sums transferrable particles per holder and token.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenBalanceReducer;

impl ParticleReducer for TokenBalanceReducer {
    type State = TokenBalances;
    type Error = ReductionError;

    fn initial_state(&self) -> TokenBalances {
        TokenBalances::default()
    }

    fn reduce(&self, mut state: TokenBalances, spun: &SpunParticle) -> Result<TokenBalances, ReductionError> {
        let Particle::Transferrable(tokens) = &spun.particle else {
            return Ok(state);
        };
        let delta = match spun.spin {
            Spin::Up => SignedAmount::positive(tokens.amount),
            Spin::Down => SignedAmount::negative(tokens.amount),
        };
        let rri = tokens.token_definition_reference.clone();
        let balance = state.entry(tokens.address.clone(), rri.clone());
        *balance = balance
            .add(delta)
            .map_err(|source| ReductionError::Amount { rri, source })?;
        Ok(state)
    }
}
