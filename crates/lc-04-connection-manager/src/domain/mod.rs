//! Domain layer: errors, close strategies and connection settings.

pub mod close;
pub mod errors;
pub mod settings;

pub use close::{CloseResult, CloseStrategy, NotClosedReason};
pub use errors::{ConnectionError, RpcError};
pub use settings::{
    ConnectionSettings, DEFAULT_CLOSE_DELAY, DEFAULT_CONNECT_TIMEOUT, DEFAULT_FAILED_DEBOUNCE,
};
