//! Domain layer: reduced state, actions and errors.

pub mod action;
pub mod balances;
pub mod errors;
pub mod token_state;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use action::TransferTokensAction;
pub use balances::TokenBalances;
pub use errors::{ReductionError, TokenDefinitionError, TransferError};
pub use token_state::{Partial, SupplyInfo, TokenDefinition, TokenDefinitionsValue, TokenState};
