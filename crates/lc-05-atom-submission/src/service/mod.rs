//! Service layer: ledger view and transaction maker.

pub mod ledger;
pub mod transaction_maker;

pub use ledger::InMemoryLedgerState;
pub use transaction_maker::TransactionMaker;
