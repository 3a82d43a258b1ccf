//! # Token Definition State
//!
//! A token's state is assembled from fragments found in different
//! particles: the definition itself and its unallocated supply. Fragments
//! merge in any order; once both kinds are present the state is full.

use crate::domain::errors::TokenDefinitionError;
use lc_02_atom_model::{TokenDefinitionParticle, TokenSupplyType, UnallocatedTokensParticle};
use shared_types::{
    Address, Description, Granularity, Name, NonNegativeAmount, ResourceIdentifier,
    TokenPermissions,
};

/// Descriptive part of a token, as declared by its definition particle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDefinition {
    /// `/owner/SYMBOL`.
    pub rri: ResourceIdentifier,
    /// Human readable name.
    pub name: Name,
    /// Free text description.
    pub description: Description,
    /// Smallest transferable unit.
    pub granularity: Granularity,
    /// Optional icon location.
    pub icon_url: Option<String>,
    /// Supply governance.
    pub supply_type: TokenSupplyType,
}

impl TokenDefinition {
    /// Effective mint and burn permissions.
    #[must_use]
    pub fn permissions(&self) -> TokenPermissions {
        match self.supply_type {
            TokenSupplyType::Mutable { permissions } => permissions,
            TokenSupplyType::Fixed { .. } => TokenPermissions::FIXED_SUPPLY,
        }
    }

    /// Owner of the token.
    #[must_use]
    pub fn owner(&self) -> &Address {
        self.rri.address()
    }
}

impl From<&TokenDefinitionParticle> for TokenDefinition {
    fn from(particle: &TokenDefinitionParticle) -> Self {
        Self {
            rri: particle.rri.clone(),
            name: particle.name.clone(),
            description: particle.description.clone(),
            granularity: particle.granularity,
            icon_url: particle.icon_url.clone(),
            supply_type: particle.supply_type,
        }
    }
}

/// Unallocated supply seen so far for a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplyInfo {
    /// Token the supply belongs to.
    pub rri: ResourceIdentifier,
    /// Sum of unallocated particles.
    pub unallocated: NonNegativeAmount,
}

impl From<&UnallocatedTokensParticle> for SupplyInfo {
    fn from(particle: &UnallocatedTokensParticle) -> Self {
        Self {
            rri: particle.token_definition_reference.clone(),
            unallocated: particle.amount.into(),
        }
    }
}

impl SupplyInfo {
    fn merging(&self, other: &SupplyInfo) -> Result<SupplyInfo, TokenDefinitionError> {
        ensure_same_resource(&self.rri, &other.rri)?;
        Ok(SupplyInfo {
            rri: self.rri.clone(),
            unallocated: self.unallocated.add(other.unallocated)?,
        })
    }
}

/// A fragment of token state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Partial {
    /// Only the definition is known.
    Definition(TokenDefinition),
    /// Only supply is known.
    Supply(SupplyInfo),
}

impl Partial {
    /// Resource the fragment belongs to.
    #[must_use]
    pub fn rri(&self) -> &ResourceIdentifier {
        match self {
            Self::Definition(definition) => &definition.rri,
            Self::Supply(supply) => &supply.rri,
        }
    }
}

/// Definition and supply of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenState {
    /// Declared definition.
    pub definition: TokenDefinition,
    /// Supply not yet minted.
    pub unallocated: NonNegativeAmount,
}

impl TokenState {
    /// Circulating supply. Mutable tokens start with the whole range
    /// unallocated; fixed tokens are minted in full at creation.
    pub fn total_supply(&self) -> Result<NonNegativeAmount, TokenDefinitionError> {
        match self.definition.supply_type {
            TokenSupplyType::Mutable { .. } => Ok(NonNegativeAmount::MAX.subtract(self.unallocated)?),
            TokenSupplyType::Fixed { supply } => Ok(supply.into()),
        }
    }

    fn with_definition(
        &self,
        definition: &TokenDefinition,
    ) -> Result<TokenState, TokenDefinitionError> {
        ensure_same_resource(&self.definition.rri, &definition.rri)?;
        if self.definition != *definition {
            return Err(TokenDefinitionError::ConflictingDefinitions(
                definition.rri.clone(),
            ));
        }
        Ok(self.clone())
    }

    fn with_supply(&self, supply: &SupplyInfo) -> Result<TokenState, TokenDefinitionError> {
        ensure_same_resource(&self.definition.rri, &supply.rri)?;
        Ok(TokenState {
            definition: self.definition.clone(),
            unallocated: self.unallocated.add(supply.unallocated)?,
        })
    }

    fn merging_partial(&self, partial: &Partial) -> Result<TokenState, TokenDefinitionError> {
        match partial {
            Partial::Definition(definition) => self.with_definition(definition),
            Partial::Supply(supply) => self.with_supply(supply),
        }
    }
}

/// State of one token: a fragment or the full picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenDefinitionsValue {
    /// Incomplete.
    Partial(Partial),
    /// Definition and supply both known.
    Full(TokenState),
}

impl TokenDefinitionsValue {
    /// Resource the value describes.
    #[must_use]
    pub fn rri(&self) -> &ResourceIdentifier {
        match self {
            Self::Partial(partial) => partial.rri(),
            Self::Full(state) => &state.definition.rri,
        }
    }

    /// Definition, if known.
    #[must_use]
    pub fn definition(&self) -> Option<&TokenDefinition> {
        match self {
            Self::Partial(Partial::Definition(definition)) => Some(definition),
            Self::Full(state) => Some(&state.definition),
            Self::Partial(Partial::Supply(_)) => None,
        }
    }

    /// Full state, if complete.
    #[must_use]
    pub fn full(&self) -> Option<&TokenState> {
        match self {
            Self::Full(state) => Some(state),
            Self::Partial(_) => None,
        }
    }

    /// Combine two values of the same resource. Commutative.
    pub fn merging(&self, other: &TokenDefinitionsValue) -> Result<Self, TokenDefinitionError> {
        use TokenDefinitionsValue::{Full, Partial as P};
        match (self, other) {
            (P(a), P(b)) => merge_partials(a, b),
            (Full(a), Full(b)) => {
                let merged = a
                    .with_definition(&b.definition)?
                    .with_supply(&SupplyInfo {
                        rri: b.definition.rri.clone(),
                        unallocated: b.unallocated,
                    })?;
                Ok(Full(merged))
            }
            (P(partial), Full(state)) | (Full(state), P(partial)) => {
                Ok(Full(state.merging_partial(partial)?))
            }
        }
    }
}

fn merge_partials(a: &Partial, b: &Partial) -> Result<TokenDefinitionsValue, TokenDefinitionError> {
    ensure_same_resource(a.rri(), b.rri())?;
    let merged = match (a, b) {
        (Partial::Definition(x), Partial::Definition(y)) => {
            if x != y {
                return Err(TokenDefinitionError::ConflictingDefinitions(x.rri.clone()));
            }
            TokenDefinitionsValue::Partial(Partial::Definition(x.clone()))
        }
        (Partial::Supply(x), Partial::Supply(y)) => {
            TokenDefinitionsValue::Partial(Partial::Supply(x.merging(y)?))
        }
        (Partial::Definition(definition), Partial::Supply(supply))
        | (Partial::Supply(supply), Partial::Definition(definition)) => {
            TokenDefinitionsValue::Full(TokenState {
                definition: definition.clone(),
                unallocated: supply.unallocated,
            })
        }
    };
    Ok(merged)
}

fn ensure_same_resource(
    expected: &ResourceIdentifier,
    found: &ResourceIdentifier,
) -> Result<(), TokenDefinitionError> {
    if expected != found {
        return Err(TokenDefinitionError::ResourceMismatch {
            expected: expected.clone(),
            found: found.clone(),
        });
    }
    Ok(())
}
