//! Ports layer: the transport seam.

pub mod outbound;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

pub use outbound::{LinkEvent, WebSocketDialer, WebSocketLink};

#[cfg(any(test, feature = "test-utils"))]
pub use mocks::{MockDialBehavior, MockDialer, MockRemote};
