//! # JSON-RPC Messages
//!
//! Requests go out as `{id, method, params, jsonrpc}`. Anything coming back
//! is either a response correlated by `id` or a notification keyed by
//! `params.subscriberId`.

use crate::domain::RpcError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_bus::{AtomStatus, AtomStatusEvent, SubscriberId};

/// Protocol version tag carried by every request.
pub const JSONRPC_VERSION: &str = "2.0";

/// Method names understood by nodes.
pub mod methods {
    /// Submit a signed atom.
    pub const SUBMIT_ATOM: &str = "Atoms.submitAtom";
    /// Start receiving status notifications for an atom.
    pub const GET_ATOM_STATUS_NOTIFICATIONS: &str = "Atoms.getAtomStatusNotifications";
    /// Stop receiving status notifications.
    pub const CLOSE_ATOM_STATUS_NOTIFICATIONS: &str = "Atoms.closeAtomStatusNotifications";
    /// Method of pushed status notifications.
    pub const NEXT_STATUS_EVENT: &str = "Atoms.nextStatusEvent";
}

/// Outgoing request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcRequest {
    /// Correlation id.
    pub id: String,
    /// Method name.
    pub method: String,
    /// Parameters.
    pub params: Value,
    /// Always [`JSONRPC_VERSION`].
    pub jsonrpc: &'static str,
}

impl RpcRequest {
    /// Request with a fresh uuid as id.
    #[must_use]
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            method: method.into(),
            params,
            jsonrpc: JSONRPC_VERSION,
        }
    }

    /// Wire text.
    pub fn to_text(&self) -> Result<String, RpcError> {
        serde_json::to_string(self).map_err(|e| RpcError::InvalidMessage(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct RawError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    params: Option<Value>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RawError>,
}

/// A parsed incoming text frame.
#[derive(Debug, Clone, PartialEq)]
pub enum IncomingMessage {
    /// Answer to a request.
    Response {
        /// Id of the request.
        id: String,
        /// Result, or the error the node returned.
        result: Result<Value, RpcError>,
    },
    /// Message pushed by the node.
    Notification {
        /// Method name.
        method: String,
        /// Parameters.
        params: Value,
    },
}

impl IncomingMessage {
    /// Parse a text frame.
    pub fn parse(text: &str) -> Result<Self, RpcError> {
        let raw: RawMessage =
            serde_json::from_str(text).map_err(|e| RpcError::InvalidMessage(e.to_string()))?;

        if let Some(id) = raw.id.as_ref().and_then(id_string) {
            let result = match raw.error {
                Some(error) => Err(RpcError::Remote {
                    code: error.code,
                    message: error.message,
                }),
                None => Ok(raw.result.unwrap_or(Value::Null)),
            };
            return Ok(Self::Response { id, result });
        }

        match raw.method {
            Some(method) => Ok(Self::Notification {
                method,
                params: raw.params.unwrap_or(Value::Null),
            }),
            None => Err(RpcError::InvalidMessage(
                "neither a response nor a notification".to_string(),
            )),
        }
    }

    /// Subscriber a notification is addressed to.
    #[must_use]
    pub fn subscriber_id(&self) -> Option<SubscriberId> {
        match self {
            Self::Notification { params, .. } => params
                .get("subscriberId")
                .and_then(Value::as_str)
                .map(SubscriberId::from),
            Self::Response { .. } => None,
        }
    }
}

fn id_string(id: &Value) -> Option<String> {
    match id {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Params of an `Atoms.nextStatusEvent` notification.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtomStatusNotification {
    /// Subscription the event belongs to.
    pub subscriber_id: String,
    /// Reported status.
    pub status: AtomStatus,
    /// Detail payload.
    #[serde(default)]
    pub data: Value,
}

impl AtomStatusNotification {
    /// Parse notification params.
    pub fn from_params(params: &Value) -> Result<Self, RpcError> {
        Self::deserialize(params).map_err(|e| RpcError::InvalidMessage(e.to_string()))
    }

    /// The event this notification reports.
    #[must_use]
    pub fn into_event(self) -> AtomStatusEvent {
        AtomStatusEvent::new(self.status, self.data)
    }
}
