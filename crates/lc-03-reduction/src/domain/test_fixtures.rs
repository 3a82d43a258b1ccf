//! Builders shared by the unit tests.

use crate::domain::token_state::{SupplyInfo, TokenDefinition};
use lc_02_atom_model::{TokenSupplyType, TransferrableTokensParticle, UnallocatedTokensParticle};
use shared_types::{
    Address, Description, Granularity, Magic, Name, PositiveAmount, PublicKey, ResourceIdentifier,
    TokenPermissions,
};

pub fn address(seed: u8) -> Address {
    let mut key = [seed; 33];
    key[0] = 0x02;
    Address::new(Magic::default(), &PublicKey::from_slice(&key).unwrap())
}

pub fn rri(symbol: &str) -> ResourceIdentifier {
    ResourceIdentifier::new(address(1), symbol).unwrap()
}

pub fn definition(symbol: &str) -> TokenDefinition {
    TokenDefinition {
        rri: rri(symbol),
        name: Name::new("Test token").unwrap(),
        description: Description::new("Token used in tests").unwrap(),
        granularity: Granularity::default(),
        icon_url: None,
        supply_type: TokenSupplyType::Mutable {
            permissions: TokenPermissions::default(),
        },
    }
}

pub fn supply(symbol: &str, amount: u64) -> SupplyInfo {
    SupplyInfo {
        rri: rri(symbol),
        unallocated: amount.into(),
    }
}

pub fn tokens(owner: &Address, symbol: &str, amount: u64) -> TransferrableTokensParticle {
    TransferrableTokensParticle::new(
        owner.clone(),
        PositiveAmount::from_u64(amount).unwrap(),
        rri(symbol),
        TokenPermissions::default(),
        Granularity::default(),
    )
    .unwrap()
}

pub fn unallocated(symbol: &str, amount: u64) -> UnallocatedTokensParticle {
    UnallocatedTokensParticle::new(
        rri(symbol),
        Granularity::default(),
        TokenPermissions::default(),
        PositiveAmount::from_u64(amount).unwrap(),
    )
}
