//! # Token Definitions
//!
//! A token is either of fixed supply, minted in full at creation, or of
//! mutable supply, minted and burned by the owner afterwards. The two kinds
//! have different serializers.

use crate::domain::errors::ParticleError;
use lc_01_dson::{DsonDecode, DsonEncode, DsonError, DsonOutput, DsonValue, ObjectBuilder, ObjectReader};
use shared_types::{
    Address, Description, Granularity, Name, PositiveAmount, ResourceIdentifier, Symbol,
    TokenPermissions,
};

/// Serializer of mutable supply definitions.
pub const MUTABLE_SUPPLY_SERIALIZER: &str = "radix.particles.mutable_supply_token_definition";

/// Serializer of fixed supply definitions.
pub const FIXED_SUPPLY_SERIALIZER: &str = "radix.particles.fixed_supply_token_definition";

/// How a token's supply is governed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenSupplyType {
    /// Owner mints and burns under these permissions.
    Mutable {
        /// Mint and burn permissions.
        permissions: TokenPermissions,
    },
    /// Entire supply created with the definition.
    Fixed {
        /// Total supply.
        supply: PositiveAmount,
    },
}

/// Definition of a token owned by the address in its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenDefinitionParticle {
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

impl TokenDefinitionParticle {
    /// Define `symbol` owned by `owner`.
    pub fn new(
        owner: Address,
        symbol: &Symbol,
        name: Name,
        description: Description,
        granularity: Granularity,
        supply_type: TokenSupplyType,
    ) -> Result<Self, ParticleError> {
        let rri = ResourceIdentifier::new(owner, symbol.as_str())
            .map_err(|e| ParticleError::InvalidResourceIdentifier(e.to_string()))?;
        if let TokenSupplyType::Fixed { supply } = supply_type {
            if !supply.is_multiple_of(&granularity) {
                return Err(ParticleError::AmountNotMultipleOfGranularity {
                    amount: supply.to_string(),
                    granularity: granularity.to_string(),
                });
            }
        }
        Ok(Self {
            rri,
            name,
            description,
            granularity,
            icon_url: None,
            supply_type,
        })
    }

    /// Same definition with an icon.
    #[must_use]
    pub fn with_icon_url(mut self, icon_url: impl Into<String>) -> Self {
        self.icon_url = Some(icon_url.into());
        self
    }

    /// Owner of the token.
    #[must_use]
    pub fn owner(&self) -> &Address {
        self.rri.address()
    }

    /// Ticker symbol, the name part of the identifier.
    #[must_use]
    pub fn symbol(&self) -> &str {
        self.rri.name()
    }

    /// Effective permissions; fixed supply tokens cannot mint or burn.
    #[must_use]
    pub fn permissions(&self) -> TokenPermissions {
        match self.supply_type {
            TokenSupplyType::Mutable { permissions } => permissions,
            TokenSupplyType::Fixed { .. } => TokenPermissions::FIXED_SUPPLY,
        }
    }

    /// Serializer for this definition's supply type.
    #[must_use]
    pub const fn serializer(&self) -> &'static str {
        match self.supply_type {
            TokenSupplyType::Mutable { .. } => MUTABLE_SUPPLY_SERIALIZER,
            TokenSupplyType::Fixed { .. } => FIXED_SUPPLY_SERIALIZER,
        }
    }
}

impl DsonEncode for TokenDefinitionParticle {
    fn to_dson(&self, mode: DsonOutput) -> DsonValue {
        let builder = ObjectBuilder::new(self.serializer(), mode)
            .field("rri", &self.rri)
            .field("name", &self.name)
            .field("symbol", self.symbol())
            .field("description", &self.description)
            .field("granularity", &self.granularity);
        let builder = match &self.supply_type {
            TokenSupplyType::Mutable { permissions } => builder.field("permissions", permissions),
            TokenSupplyType::Fixed { supply } => builder.field("supply", supply),
        };
        builder
            .optional_field("iconUrl", self.icon_url.as_ref())
            .build()
    }
}

impl DsonDecode for TokenDefinitionParticle {
    fn from_dson(value: &DsonValue) -> Result<Self, DsonError> {
        let reader = ObjectReader::open(value)?;
        let supply_type = match reader.serializer() {
            MUTABLE_SUPPLY_SERIALIZER => TokenSupplyType::Mutable {
                permissions: reader.required("permissions")?,
            },
            FIXED_SUPPLY_SERIALIZER => TokenSupplyType::Fixed {
                supply: reader.required("supply")?,
            },
            other => {
                return Err(DsonError::SerializerMismatch {
                    expected: MUTABLE_SUPPLY_SERIALIZER.to_string(),
                    found: other.to_string(),
                })
            }
        };
        let rri: ResourceIdentifier = reader.required("rri")?;
        let symbol: Symbol = reader.required("symbol")?;
        if symbol.as_str() != rri.name() {
            return Err(DsonError::invalid(ParticleError::SymbolMismatch {
                symbol: symbol.to_string(),
                rri: rri.to_string(),
            }));
        }
        Ok(Self {
            rri,
            name: reader.required("name")?,
            description: reader.required("description")?,
            granularity: reader.required("granularity")?,
            icon_url: reader.optional("iconUrl")?,
            supply_type,
        })
    }
}
