//! # Connection Settings

use std::time::Duration;

/// Default delay before a failed socket may be retried.
pub const DEFAULT_FAILED_DEBOUNCE: Duration = Duration::from_secs(60);

/// Default delay before an unused socket is closed.
pub const DEFAULT_CLOSE_DELAY: Duration = Duration::from_secs(5);

/// Default handshake timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timing of socket lifecycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Time spent in `Failed` before reverting to `Disconnected`.
    pub failed_debounce: Duration,
    /// Delay between a close request and the close attempt.
    pub close_delay: Duration,
    /// Handshake timeout.
    pub connect_timeout: Duration,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            failed_debounce: DEFAULT_FAILED_DEBOUNCE,
            close_delay: DEFAULT_CLOSE_DELAY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}
