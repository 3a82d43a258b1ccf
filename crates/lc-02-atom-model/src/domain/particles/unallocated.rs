//! Supply of a mutable token that has not been minted yet.

use lc_01_dson::{DsonDecode, DsonEncode, DsonError, DsonOutput, DsonValue, ObjectBuilder, ObjectReader};
use shared_types::{Granularity, Nonce, PositiveAmount, ResourceIdentifier, TokenPermissions};

/// Serializer name.
pub const UNALLOCATED_TOKENS_SERIALIZER: &str = "radix.particles.unallocated_tokens";

/// Mintable remainder of a token's maximum supply.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnallocatedTokensParticle {
    /// Token this supply belongs to.
    pub token_definition_reference: ResourceIdentifier,
    /// Token granularity.
    pub granularity: Granularity,
    /// Token permissions.
    pub permissions: TokenPermissions,
    /// Disambiguates otherwise equal particles.
    pub nonce: Nonce,
    /// Unallocated amount.
    pub amount: PositiveAmount,
}

impl UnallocatedTokensParticle {
    /// New particle with a random nonce.
    #[must_use]
    pub fn new(
        token_definition_reference: ResourceIdentifier,
        granularity: Granularity,
        permissions: TokenPermissions,
        amount: PositiveAmount,
    ) -> Self {
        Self {
            token_definition_reference,
            granularity,
            permissions,
            nonce: Nonce::random(),
            amount,
        }
    }
}

impl DsonEncode for UnallocatedTokensParticle {
    fn to_dson(&self, mode: DsonOutput) -> DsonValue {
        ObjectBuilder::new(UNALLOCATED_TOKENS_SERIALIZER, mode)
            .field("tokenDefinitionReference", &self.token_definition_reference)
            .field("granularity", &self.granularity)
            .field("permissions", &self.permissions)
            .field("nonce", &self.nonce)
            .field("amount", &self.amount)
            .build()
    }
}

impl DsonDecode for UnallocatedTokensParticle {
    fn from_dson(value: &DsonValue) -> Result<Self, DsonError> {
        let reader = ObjectReader::new(value, UNALLOCATED_TOKENS_SERIALIZER)?;
        Ok(Self {
            token_definition_reference: reader.required("tokenDefinitionReference")?,
            granularity: reader.required("granularity")?,
            permissions: reader.required("permissions")?,
            nonce: reader.required("nonce")?,
            amount: reader.required("amount")?,
        })
    }
}
