//! # Result Of User Action
//!
//! Handle to a staged action: either the atom's submission in progress or
//! the reason it never left the client.

use crate::domain::errors::{FailedToStageAction, UserActionError};
use lc_02_atom_model::SignedAtom;
use shared_bus::{AtomStatusEvent, SubmitAtomAction, Subscription};
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

/// A submission in flight, observed through its correlated actions.
pub struct PendingSubmission {
    uuid: Uuid,
    atom: SignedAtom,
    updates: Subscription,
    finished: bool,
}

impl PendingSubmission {
    /// Wrap a subscription to actions correlated with `uuid`. The
    /// subscription must exist before the request is dispatched.
    #[must_use]
    pub fn new(uuid: Uuid, atom: SignedAtom, updates: Subscription) -> Self {
        Self {
            uuid,
            atom,
            updates,
            finished: false,
        }
    }

    /// Correlation id.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// The signed atom.
    #[must_use]
    pub fn atom(&self) -> &SignedAtom {
        &self.atom
    }

    /// Next submission step. `None` after the completion or once the store
    /// has shut down.
    pub async fn next_update(&mut self) -> Option<SubmitAtomAction> {
        if self.finished {
            return None;
        }
        loop {
            let action = self.updates.recv().await?;
            let shared_bus::NodeAction::SubmitAtom(step) = action else {
                continue;
            };
            if step.uuid() != self.uuid {
                continue;
            }
            if matches!(step, SubmitAtomAction::Completed(_)) {
                self.finished = true;
            }
            return Some(step);
        }
    }

    /// Wait for the completion.
    pub async fn await_completion(mut self) -> Result<AtomStatusEvent, UserActionError> {
        while let Some(step) = self.next_update().await {
            if let SubmitAtomAction::Completed(completed) = step {
                if let Err(error) = &completed.result {
                    warn!(uuid = %self.uuid, error = %error, "Atom not submitted");
                }
                return completed.result.map_err(UserActionError::from);
            }
        }
        Err(UserActionError::StoreClosed)
    }
}

/// Outcome of handing a user action to the transaction maker.
pub enum ResultOfUserAction {
    /// The atom was signed and its submission dispatched.
    PendingSending(PendingSubmission),
    /// The action was rejected before anything was sent.
    FailedToStageAction(FailedToStageAction),
}

impl ResultOfUserAction {
    /// Whether the action made it to submission.
    #[must_use]
    pub fn is_staged(&self) -> bool {
        matches!(self, Self::PendingSending(_))
    }

    /// The signed atom, or why there is none.
    pub fn atom(&self) -> Result<&SignedAtom, UserActionError> {
        match self {
            Self::PendingSending(pending) => Ok(pending.atom()),
            Self::FailedToStageAction(failed) => Err(failed.clone().into()),
        }
    }

    /// Wait for the submission to complete.
    pub async fn await_completion(self) -> Result<AtomStatusEvent, UserActionError> {
        match self {
            Self::PendingSending(pending) => pending.await_completion().await,
            Self::FailedToStageAction(failed) => Err(failed.into()),
        }
    }

    /// Whether the action completed successfully within `timeout`.
    pub async fn complete_within(self, timeout: Duration) -> bool {
        matches!(
            tokio::time::timeout(timeout, self.await_completion()).await,
            Ok(Ok(_))
        )
    }
}
