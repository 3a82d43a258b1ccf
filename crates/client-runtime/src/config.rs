//! # Client Configuration
//!
//! Defaults carry the protocol constants. A JSON file and environment
//! variables override them, in that order, and the result is validated
//! before anything is started.
//!
//! ```json
//! {
//!   "universe": { "magic": 63799298 },
//!   "nodes": [{ "host": "localhost", "port": 8080 }],
//!   "websocket": { "failed_debounce": "60s", "close_delay": "5s", "connect_timeout": "10s" },
//!   "submission": { "timeout": "30s" },
//!   "store": { "channel_capacity": 1000 },
//!   "log_level": "info"
//! }
//! ```

use lc_04_connection_manager::{
    ConnectionSettings, DEFAULT_CLOSE_DELAY, DEFAULT_CONNECT_TIMEOUT, DEFAULT_FAILED_DEBOUNCE,
};
use lc_05_atom_submission::DEFAULT_SUBMISSION_TIMEOUT;
use serde::{Deserialize, Serialize};
use shared_types::{Magic, Node};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Path of the JSON config file.
pub const ENV_CONFIG_PATH: &str = "LC_CONFIG";
/// Comma separated `host:port` list replacing the configured nodes.
pub const ENV_NODES: &str = "LC_NODES";
/// Universe magic.
pub const ENV_MAGIC: &str = "LC_MAGIC";
/// Submission timeout in whole seconds.
pub const ENV_SUBMISSION_TIMEOUT_SECS: &str = "LC_SUBMISSION_TIMEOUT_SECS";

/// Port of a development node.
const DEFAULT_NODE_PORT: u16 = 8080;

/// Default store channel capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Complete client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Universe the client talks to.
    pub universe: UniverseConfig,
    /// Nodes to connect to.
    pub nodes: Vec<Node>,
    /// Websocket lifecycle timing.
    pub websocket: WebSocketConfig,
    /// Atom submission.
    pub submission: SubmissionConfig,
    /// Node action store.
    pub store: StoreConfig,
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            universe: UniverseConfig::default(),
            nodes: vec![Node::localhost(DEFAULT_NODE_PORT)],
            websocket: WebSocketConfig::default(),
            submission: SubmissionConfig::default(),
            store: StoreConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

/// Universe configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniverseConfig {
    /// Universe magic. Its low byte prefixes every address.
    pub magic: Magic,
}

/// Websocket lifecycle timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSocketConfig {
    /// Time a failed socket stays `Failed`.
    #[serde(with = "humantime_serde")]
    pub failed_debounce: Duration,
    /// Delay before an unused socket is closed.
    #[serde(with = "humantime_serde")]
    pub close_delay: Duration,
    /// Handshake timeout.
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            failed_debounce: DEFAULT_FAILED_DEBOUNCE,
            close_delay: DEFAULT_CLOSE_DELAY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// Atom submission configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Time allowed from sending an atom to its terminal status.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_SUBMISSION_TIMEOUT,
        }
    }
}

/// Node action store configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Queued actions above which a subscriber is logged as falling behind.
    pub channel_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("cannot read config file {path}: {reason}")]
    Read {
        /// File path.
        path: String,
        /// I/O error.
        reason: String,
    },
    /// Config file is not valid JSON for [`ClientConfig`].
    #[error("cannot parse config: {0}")]
    Parse(String),
    /// An environment variable holds an unusable value.
    #[error("invalid value for {key}: {value}")]
    InvalidEnv {
        /// Variable name.
        key: &'static str,
        /// Offending value.
        value: String,
    },
    /// No node configured.
    #[error("no nodes configured")]
    NoNodes,
    /// Invalid timeout value.
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// Invalid size or count limit.
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
}

impl ClientConfig {
    /// Defaults, then the file named by `LC_CONFIG`, then env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// [`ClientConfig::load`] reading variables through `env`.
    pub fn load_with(env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match env(ENV_CONFIG_PATH) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(env)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON config file. Missing sections keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&text)
    }

    /// Parse a JSON config document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply `LC_NODES`, `LC_MAGIC` and `LC_SUBMISSION_TIMEOUT_SECS`.
    pub fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(value) = env(ENV_NODES) {
            self.nodes = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<Node>().map_err(|_| ConfigError::InvalidEnv {
                        key: ENV_NODES,
                        value: s.to_string(),
                    })
                })
                .collect::<Result<_, _>>()?;
        }
        if let Some(value) = env(ENV_MAGIC) {
            let magic = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: ENV_MAGIC,
                value: value.clone(),
            })?;
            self.universe.magic = Magic(magic);
        }
        if let Some(value) = env(ENV_SUBMISSION_TIMEOUT_SECS) {
            let secs = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: ENV_SUBMISSION_TIMEOUT_SECS,
                value: value.clone(),
            })?;
            self.submission.timeout = Duration::from_secs(secs);
        }
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nodes.is_empty() {
            return Err(ConfigError::NoNodes);
        }
        if self.submission.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "submission timeout cannot be 0".into(),
            ));
        }
        if self.websocket.connect_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "connect timeout cannot be 0".into(),
            ));
        }
        if self.store.channel_capacity == 0 {
            return Err(ConfigError::InvalidLimit(
                "channel_capacity cannot be 0".into(),
            ));
        }
        Ok(())
    }

    /// Socket timing for the connection manager.
    #[must_use]
    pub fn to_connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            failed_debounce: self.websocket.failed_debounce,
            close_delay: self.websocket.close_delay,
            connect_timeout: self.websocket.connect_timeout,
        }
    }
}

/// Duration serialization helper
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_millis() == 0 {
            serializer.serialize_str(&format!("{}s", duration.as_secs()))
        } else {
            serializer.serialize_str(&format!("{}ms", duration.as_millis()))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub(super) fn parse_duration(s: &str) -> Result<Duration, &'static str> {
        let s = s.trim();
        // "ms" before "s" and "m"
        if let Some(ms) = s.strip_suffix("ms") {
            ms.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| "invalid milliseconds")
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid seconds")
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.trim()
                .parse::<u64>()
                .map(|m| Duration::from_secs(m * 60))
                .map_err(|_| "invalid minutes")
        } else {
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid duration format")
        }
    }
}
