//! # Node Actions
//!
//! Every message that flows through the node action store.
//! Submission actions share the uuid of the request that started them.

use crate::status::{AtomStatusEvent, SubmitAtomError};
use lc_02_atom_model::{AtomIdentifier, SignedAtom};
use shared_types::{Node, Shard, WebSocketStatus};
use std::collections::BTreeSet;
use uuid::Uuid;

/// When a submission counts as complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompletionPolicy {
    /// Only a `stored` status completes successfully.
    #[default]
    OnAtomStored,
    /// Any status completes, as the node has accepted the atom.
    OnSubmissionAccepted,
}

/// Submit an atom, letting the store find a node unless one is given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitAtomRequest {
    /// Correlation id of the whole submission.
    pub uuid: Uuid,
    /// Atom to submit.
    pub atom: SignedAtom,
    /// Completion policy.
    pub completion: CompletionPolicy,
    /// Node to submit to, skipping node discovery.
    pub origin_node: Option<Node>,
}

impl SubmitAtomRequest {
    /// New request with a fresh uuid.
    #[must_use]
    pub fn new(atom: SignedAtom, completion: CompletionPolicy) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            atom,
            completion,
            origin_node: None,
        }
    }

    /// Same request pinned to `node`.
    #[must_use]
    pub fn with_origin_node(mut self, node: Node) -> Self {
        self.origin_node = Some(node);
        self
    }

    /// Shards a node must serve to accept the atom.
    #[must_use]
    pub fn shards(&self) -> BTreeSet<Shard> {
        self.atom.atom().required_first_shards()
    }
}

/// Push the atom to a chosen node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitAtomSend {
    /// Correlation id.
    pub uuid: Uuid,
    /// Atom to submit.
    pub atom: SignedAtom,
    /// Target node.
    pub node: Node,
    /// Completion policy.
    pub completion: CompletionPolicy,
}

/// A status notification for the submitted atom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitAtomStatus {
    /// Correlation id.
    pub uuid: Uuid,
    /// Identifier of the atom.
    pub atom_id: AtomIdentifier,
    /// Reporting node.
    pub node: Node,
    /// Reported status.
    pub event: AtomStatusEvent,
}

/// Final outcome of a submission. Emitted exactly once per uuid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitAtomCompleted {
    /// Correlation id.
    pub uuid: Uuid,
    /// Atom that was submitted.
    pub atom: SignedAtom,
    /// Node it was submitted to, if one was reached.
    pub node: Option<Node>,
    /// Terminal status, or why there is none.
    pub result: Result<AtomStatusEvent, SubmitAtomError>,
}

impl SubmitAtomCompleted {
    /// Whether the submission succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Steps of one atom submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitAtomAction {
    /// Submission requested.
    Request(SubmitAtomRequest),
    /// Node chosen, push the atom.
    Send(SubmitAtomSend),
    /// Status received.
    Status(SubmitAtomStatus),
    /// Submission finished.
    Completed(SubmitAtomCompleted),
}

impl SubmitAtomAction {
    /// Correlation id.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        match self {
            Self::Request(a) => a.uuid,
            Self::Send(a) => a.uuid,
            Self::Status(a) => a.uuid,
            Self::Completed(a) => a.uuid,
        }
    }

    /// Node involved, once one is known.
    #[must_use]
    pub fn node(&self) -> Option<&Node> {
        match self {
            Self::Request(a) => a.origin_node.as_ref(),
            Self::Send(a) => Some(&a.node),
            Self::Status(a) => Some(&a.node),
            Self::Completed(a) => a.node.as_ref(),
        }
    }
}

/// Message on the node action store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeAction {
    /// Find a node serving `shards` on behalf of request `uuid`.
    FindANodeRequest {
        /// Correlation id of the requesting submission.
        uuid: Uuid,
        /// Shards the node must serve.
        shards: BTreeSet<Shard>,
    },
    /// Answer to [`NodeAction::FindANodeRequest`].
    FindANodeResult {
        /// Correlation id of the requesting submission.
        uuid: Uuid,
        /// Chosen node, `None` when none is available.
        node: Option<Node>,
    },
    /// Open a websocket to `node`.
    ConnectWebSocket {
        /// Target node.
        node: Node,
    },
    /// Close the websocket to `node` if unused.
    CloseWebSocket {
        /// Target node.
        node: Node,
    },
    /// The websocket to `node` changed status.
    WebSocketStatusChanged {
        /// Node.
        node: Node,
        /// New status.
        status: WebSocketStatus,
    },
    /// A step of an atom submission.
    SubmitAtom(SubmitAtomAction),
}

impl NodeAction {
    /// Kind used for filtering.
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::FindANodeRequest { .. } | Self::FindANodeResult { .. } => ActionKind::FindANode,
            Self::ConnectWebSocket { .. } | Self::CloseWebSocket { .. } => ActionKind::WebSocketCommand,
            Self::WebSocketStatusChanged { .. } => ActionKind::WebSocketStatus,
            Self::SubmitAtom(_) => ActionKind::SubmitAtom,
        }
    }

    /// Correlation id, for actions that carry one.
    #[must_use]
    pub fn uuid(&self) -> Option<Uuid> {
        match self {
            Self::FindANodeRequest { uuid, .. } | Self::FindANodeResult { uuid, .. } => Some(*uuid),
            Self::SubmitAtom(action) => Some(action.uuid()),
            _ => None,
        }
    }

    /// Node the action concerns, if any.
    #[must_use]
    pub fn node(&self) -> Option<&Node> {
        match self {
            Self::FindANodeRequest { .. } => None,
            Self::FindANodeResult { node, .. } => node.as_ref(),
            Self::ConnectWebSocket { node }
            | Self::CloseWebSocket { node }
            | Self::WebSocketStatusChanged { node, .. } => Some(node),
            Self::SubmitAtom(action) => action.node(),
        }
    }
}

impl From<SubmitAtomAction> for NodeAction {
    fn from(action: SubmitAtomAction) -> Self {
        Self::SubmitAtom(action)
    }
}

/// Action kinds for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Node discovery requests and results.
    FindANode,
    /// Connect and close commands.
    WebSocketCommand,
    /// Websocket status changes.
    WebSocketStatus,
    /// Atom submission steps.
    SubmitAtom,
}

/// Filter for subscriptions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionFilter {
    /// Kinds to include. Empty means all kinds.
    pub kinds: Vec<ActionKind>,
    /// Only actions with this correlation id.
    pub uuid: Option<Uuid>,
}

impl ActionFilter {
    /// Accept every action.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Accept the given kinds.
    #[must_use]
    pub fn kinds(kinds: Vec<ActionKind>) -> Self {
        Self { kinds, uuid: None }
    }

    /// Accept actions of one submission.
    #[must_use]
    pub fn correlated(uuid: Uuid) -> Self {
        Self {
            kinds: Vec::new(),
            uuid: Some(uuid),
        }
    }

    /// Check if an action matches this filter.
    #[must_use]
    pub fn matches(&self, action: &NodeAction) -> bool {
        let kind_match = self.kinds.is_empty() || self.kinds.contains(&action.kind());
        let uuid_match = self.uuid.is_none() || action.uuid() == self.uuid;
        kind_match && uuid_match
    }
}
