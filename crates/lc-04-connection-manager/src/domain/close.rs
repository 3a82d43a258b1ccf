//! # Close Strategies
//!
//! A websocket is shared by every listener of its node, so closing it is
//! normally skipped while anyone still listens.

use std::fmt;

/// How to treat registered listeners when closing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CloseStrategy {
    /// Leave the socket open while it has listeners.
    #[default]
    SkipIfInUse,
    /// Close even if listeners are registered.
    ForceEvenIfInUse,
}

/// Why a close request left the socket open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotClosedReason {
    /// At least one listener is registered.
    InUse,
    /// No socket to that node exists.
    NoSuchSocket,
}

/// Outcome of a close request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseResult {
    /// The socket is closing or already closed.
    Closed,
    /// The socket was left as it was.
    DidNotClose(NotClosedReason),
}

impl CloseResult {
    /// Whether the socket was closed.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for CloseResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => f.write_str("closed"),
            Self::DidNotClose(NotClosedReason::InUse) => f.write_str("not closed, in use"),
            Self::DidNotClose(NotClosedReason::NoSuchSocket) => f.write_str("not closed, no such socket"),
        }
    }
}
