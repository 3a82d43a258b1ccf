//! # Codecs
//!
//! Two renderings of the same value tree: CBOR for hashing and signing,
//! tagged JSON for JSON-RPC transport.

pub mod cbor;
pub mod json;

pub use cbor::{from_cbor, to_cbor, MAX_DEPTH};
pub use json::{from_json, to_json};
