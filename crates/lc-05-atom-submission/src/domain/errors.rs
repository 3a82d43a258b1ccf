//! # Submission Errors

use lc_02_atom_model::SigningError;
use lc_03_reduction::{TransferError, TransferTokensAction};
use shared_bus::SubmitAtomError;
use thiserror::Error;

/// Why a user action could not be turned into a signed atom.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    /// The transfer cannot be expressed with the sender's tokens.
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// The atom could not be signed.
    #[error(transparent)]
    Signing(#[from] SigningError),

    /// The signing key does not own the sending address.
    #[error("Signing key does not own {0}")]
    NotOwner(String),
}

/// A user action rejected before anything was sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to stage transfer of {} {}: {error}", action.amount, action.rri)]
pub struct FailedToStageAction {
    /// Underlying failure.
    pub error: StageError,
    /// The rejected action.
    pub action: TransferTokensAction,
}

/// How a user action ended when it did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserActionError {
    /// Rejected locally.
    #[error(transparent)]
    FailedToStageAction(#[from] FailedToStageAction),

    /// Sent, but the submission failed.
    #[error("Failed to submit atom: {0}")]
    FailedToSubmitAtom(#[from] SubmitAtomError),

    /// The action store shut down before the submission completed.
    #[error("Action store closed before completion")]
    StoreClosed,
}
