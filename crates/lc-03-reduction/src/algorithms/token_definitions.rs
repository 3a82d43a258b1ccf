//! # Token Definitions Reducer
//!
//! Folds definition and unallocated particles into per-token state.
//! A merge failure poisons only the token it concerns.

use super::ParticleReducer;
use crate::domain::{Partial, SupplyInfo, TokenDefinition, TokenDefinitionError, TokenDefinitionsValue};
use lc_02_atom_model::{Particle, Spin, SpunParticle};
use shared_types::ResourceIdentifier;
use std::collections::BTreeMap;
use std::convert::Infallible;
use tracing::warn;

/// Reduced token definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenDefinitionsState {
    values: BTreeMap<ResourceIdentifier, TokenDefinitionsValue>,
    failures: BTreeMap<ResourceIdentifier, TokenDefinitionError>,
}

impl TokenDefinitionsState {
    /// State of `rri`, unless it failed to merge.
    #[must_use]
    pub fn get(&self, rri: &ResourceIdentifier) -> Option<&TokenDefinitionsValue> {
        self.values.get(rri)
    }

    /// Definition of `rri`, if known.
    #[must_use]
    pub fn definition(&self, rri: &ResourceIdentifier) -> Option<&TokenDefinition> {
        self.get(rri).and_then(TokenDefinitionsValue::definition)
    }

    /// Merge failure recorded for `rri`.
    #[must_use]
    pub fn failure(&self, rri: &ResourceIdentifier) -> Option<&TokenDefinitionError> {
        self.failures.get(rri)
    }

    /// Every healthy token state.
    pub fn values(&self) -> impl Iterator<Item = &TokenDefinitionsValue> + '_ {
        self.values.values()
    }

    /// Merge a fragment into the state of its resource.
    #[must_use]
    pub fn merging(mut self, value: TokenDefinitionsValue) -> Self {
        let rri = value.rri().clone();
        if self.failures.contains_key(&rri) {
            return self;
        }
        let merged = match self.values.remove(&rri) {
            None => Ok(value),
            Some(existing) => existing.merging(&value),
        };
        match merged {
            Ok(merged) => {
                self.values.insert(rri, merged);
            }
            Err(error) => {
                warn!(rri = %rri, error = %error, "Token state merge failed");
                self.failures.insert(rri, error);
            }
        }
        self
    }
}

/// Reduces definition and unallocated particles. Only up particles count.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenDefinitionsReducer;

impl ParticleReducer for TokenDefinitionsReducer {
    type State = TokenDefinitionsState;
    type Error = Infallible;

    fn initial_state(&self) -> TokenDefinitionsState {
        TokenDefinitionsState::default()
    }

    fn reduce(
        &self,
        state: TokenDefinitionsState,
        spun: &SpunParticle,
    ) -> Result<TokenDefinitionsState, Infallible> {
        if spun.spin != Spin::Up {
            return Ok(state);
        }
        let fragment = match &spun.particle {
            Particle::Definition(definition) => Partial::Definition(definition.into()),
            Particle::Unallocated(unallocated) => Partial::Supply(SupplyInfo::from(unallocated)),
            _ => return Ok(state),
        };
        Ok(state.merging(TokenDefinitionsValue::Partial(fragment)))
    }
}
