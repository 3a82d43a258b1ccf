//! Builders shared by the unit tests.

use lc_02_atom_model::{
    Atom, MessageParticle, SignedAtom, SpunParticle, TokenDefinitionParticle, TokenSupplyType,
    TransferrableTokensParticle, UnallocatedTokensParticle,
};
use shared_crypto::{K256Signer, KeyPair};
use shared_types::{
    Address, Description, Magic, Name, PositiveAmount, PublicKey, ResourceIdentifier,
    Symbol, TokenPermissions,
};

pub fn address(seed: u8) -> Address {
    let mut key = [seed; 33];
    key[0] = 0x02;
    Address::new(Magic::default(), &PublicKey::from_slice(&key).unwrap())
}

pub fn address_of(keys: &KeyPair) -> Address {
    Address::new(Magic::default(), &keys.public_key())
}

pub fn rri(symbol: &str) -> ResourceIdentifier {
    ResourceIdentifier::new(address(1), symbol).unwrap()
}

pub fn tokens(owner: &Address, symbol: &str, amount: u64) -> TransferrableTokensParticle {
    tokens_with_granularity(owner, symbol, amount, 1)
}

pub fn tokens_with_granularity(
    owner: &Address,
    symbol: &str,
    amount: u64,
    granularity: u64,
) -> TransferrableTokensParticle {
    TransferrableTokensParticle::new(
        owner.clone(),
        PositiveAmount::from_u64(amount).unwrap(),
        rri(symbol),
        TokenPermissions::default(),
        PositiveAmount::from_u64(granularity).unwrap(),
    )
    .unwrap()
}

/// Up particles defining `symbol` with the given granularity.
pub fn token_definition(symbol: &str, granularity: u64) -> Vec<SpunParticle> {
    let definition = TokenDefinitionParticle::new(
        address(1),
        &Symbol::new(symbol).unwrap(),
        Name::new("Test token").unwrap(),
        Description::new("Token used in tests").unwrap(),
        PositiveAmount::from_u64(granularity).unwrap(),
        TokenSupplyType::Mutable {
            permissions: TokenPermissions::default(),
        },
    )
    .unwrap();
    let supply = UnallocatedTokensParticle::new(
        rri(symbol),
        PositiveAmount::from_u64(granularity).unwrap(),
        TokenPermissions::default(),
        PositiveAmount::from_u64(1_000_000).unwrap(),
    );
    vec![SpunParticle::up(definition), SpunParticle::up(supply)]
}

pub fn signed_atom(note: &str) -> SignedAtom {
    let keys = KeyPair::generate().unwrap();
    let me = address_of(&keys);
    let message = MessageParticle::new(me.clone(), me, note.as_bytes().to_vec());
    sign_with(&keys, vec![SpunParticle::up(message)])
}

/// Atom with one particle group holding `particles`.
pub fn signed_atom_with(particles: Vec<SpunParticle>) -> SignedAtom {
    sign_with(&KeyPair::generate().unwrap(), particles)
}

fn sign_with(keys: &KeyPair, particles: Vec<SpunParticle>) -> SignedAtom {
    Atom::new(vec![particles.into_iter().collect()])
        .sign(&K256Signer, keys.private_key())
        .unwrap()
}
