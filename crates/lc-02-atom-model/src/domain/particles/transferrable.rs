//! Spendable tokens held by an address.

use crate::domain::errors::ParticleError;
use lc_01_dson::{DsonDecode, DsonEncode, DsonError, DsonOutput, DsonValue, ObjectBuilder, ObjectReader};
use shared_types::{
    Address, Granularity, Nonce, Planck, PositiveAmount, ResourceIdentifier, TokenPermissions,
};

/// Serializer name.
pub const TRANSFERRABLE_TOKENS_SERIALIZER: &str = "radix.particles.transferrable_tokens";

/// An amount of one token owned by `address`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransferrableTokensParticle {
    /// Owner.
    pub address: Address,
    /// Held amount, a multiple of `granularity`.
    pub amount: PositiveAmount,
    /// Token this amount is of.
    pub token_definition_reference: ResourceIdentifier,
    /// Token permissions, copied from the definition.
    pub permissions: TokenPermissions,
    /// Token granularity, copied from the definition.
    pub granularity: Granularity,
    /// Disambiguates otherwise equal particles.
    pub nonce: Nonce,
    /// Creation time.
    pub planck: Planck,
}

impl TransferrableTokensParticle {
    /// New particle with a random nonce, stamped now.
    pub fn new(
        address: Address,
        amount: PositiveAmount,
        token_definition_reference: ResourceIdentifier,
        permissions: TokenPermissions,
        granularity: Granularity,
    ) -> Result<Self, ParticleError> {
        if !amount.is_multiple_of(&granularity) {
            return Err(ParticleError::AmountNotMultipleOfGranularity {
                amount: amount.to_string(),
                granularity: granularity.to_string(),
            });
        }
        Ok(Self {
            address,
            amount,
            token_definition_reference,
            permissions,
            granularity,
            nonce: Nonce::random(),
            planck: Planck::now(),
        })
    }

    /// Same particle with a fixed nonce.
    #[must_use]
    pub fn with_nonce(mut self, nonce: Nonce) -> Self {
        self.nonce = nonce;
        self
    }
}

impl DsonEncode for TransferrableTokensParticle {
    fn to_dson(&self, mode: DsonOutput) -> DsonValue {
        ObjectBuilder::new(TRANSFERRABLE_TOKENS_SERIALIZER, mode)
            .field("address", &self.address)
            .field("amount", &self.amount)
            .field("tokenDefinitionReference", &self.token_definition_reference)
            .field("permissions", &self.permissions)
            .field("granularity", &self.granularity)
            .field("nonce", &self.nonce)
            .field("planck", &self.planck)
            .build()
    }
}

impl DsonDecode for TransferrableTokensParticle {
    fn from_dson(value: &DsonValue) -> Result<Self, DsonError> {
        let reader = ObjectReader::new(value, TRANSFERRABLE_TOKENS_SERIALIZER)?;
        Ok(Self {
            address: reader.required("address")?,
            amount: reader.required("amount")?,
            token_definition_reference: reader.required("tokenDefinitionReference")?,
            permissions: reader.required("permissions")?,
            granularity: reader.required("granularity")?,
            nonce: reader.required("nonce")?,
            planck: reader.required("planck")?,
        })
    }
}
