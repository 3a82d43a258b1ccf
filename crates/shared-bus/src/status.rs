//! # Atom Status
//!
//! Statuses a node reports for a submitted atom, and the errors a
//! submission can end with.

use lc_02_atom_model::AtomIdentifier;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Ledger status of an atom as reported by a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AtomStatus {
    /// The node has never seen the atom.
    DoesNotExist,
    /// Malformed or otherwise invalid.
    EvictedInvalidAtom,
    /// Failed constraint machine verification.
    EvictedFailedCmVerification,
    /// Lost a conflict and was evicted.
    EvictedConflictLoser,
    /// Awaiting constraint machine verification.
    PendingCmVerification,
    /// Awaiting verification of its dependencies.
    PendingDependencyVerification,
    /// A dependency is not known yet.
    MissingDependency,
    /// Lost a conflict.
    ConflictLoser,
    /// Stored in the ledger.
    Stored,
}

impl AtomStatus {
    /// Whether the node may still store the atom later.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(
            self,
            Self::PendingCmVerification | Self::PendingDependencyVerification | Self::MissingDependency
        )
    }

    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DoesNotExist => "DOES_NOT_EXIST",
            Self::EvictedInvalidAtom => "EVICTED_INVALID_ATOM",
            Self::EvictedFailedCmVerification => "EVICTED_FAILED_CM_VERIFICATION",
            Self::EvictedConflictLoser => "EVICTED_CONFLICT_LOSER",
            Self::PendingCmVerification => "PENDING_CM_VERIFICATION",
            Self::PendingDependencyVerification => "PENDING_DEPENDENCY_VERIFICATION",
            Self::MissingDependency => "MISSING_DEPENDENCY",
            Self::ConflictLoser => "CONFLICT_LOSER",
            Self::Stored => "STORED",
        }
    }
}

impl fmt::Display for AtomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an atom is not stored, with whatever detail the node attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotStoredReason {
    /// Reported status, never `Stored`.
    pub status: AtomStatus,
    /// Raw detail payload.
    pub data: serde_json::Value,
}

impl NotStoredReason {
    /// Whether the node attached any detail.
    #[must_use]
    pub fn has_data(&self) -> bool {
        match &self.data {
            serde_json::Value::Null => false,
            serde_json::Value::Object(map) => !map.is_empty(),
            _ => true,
        }
    }
}

impl fmt::Display for NotStoredReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_data() {
            write!(f, "{} {}", self.status, self.data)
        } else {
            write!(f, "{}", self.status)
        }
    }
}

/// One status notification for an atom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtomStatusEvent {
    /// The atom is in the ledger.
    Stored,
    /// The atom is not in the ledger, possibly yet.
    NotStored(NotStoredReason),
}

impl AtomStatusEvent {
    /// Event for a reported status and its detail payload.
    #[must_use]
    pub fn new(status: AtomStatus, data: serde_json::Value) -> Self {
        match status {
            AtomStatus::Stored => Self::Stored,
            status => Self::NotStored(NotStoredReason { status, data }),
        }
    }

    /// Status carried by the event.
    #[must_use]
    pub fn status(&self) -> AtomStatus {
        match self {
            Self::Stored => AtomStatus::Stored,
            Self::NotStored(reason) => reason.status,
        }
    }

    /// Whether the atom is stored.
    #[must_use]
    pub fn is_stored(&self) -> bool {
        matches!(self, Self::Stored)
    }
}

/// How a submission ended when it did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitAtomError {
    /// No terminal status arrived in time.
    #[error("Submission timed out")]
    Timeout,

    /// The node reported the atom as not stored, with its detail.
    #[error("Atom not stored: {0}")]
    NotStored(NotStoredReason),

    /// No node could be found for the atom's shards.
    #[error("No node available for submission")]
    NoNodeAvailable,

    /// The atom has no identifier (it carries no particles).
    #[error("Atom has no identifier")]
    NoIdentifier,

    /// Connecting to the node failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The node rejected a request.
    #[error("RPC failed: {0}")]
    Rpc(String),
}

/// Identifier of a status subscription, unique per submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriberId(String);

impl SubscriberId {
    /// Fresh random id.
    #[must_use]
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Id for a submission of `atom_id`, unique even for repeated submissions.
    #[must_use]
    pub fn for_atom(atom_id: &AtomIdentifier) -> Self {
        Self(format!("{}-{}", atom_id.short(), uuid::Uuid::new_v4().simple()))
    }

    /// Wire form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SubscriberId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
