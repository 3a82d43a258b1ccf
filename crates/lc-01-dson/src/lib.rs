//! # LC-01 DSON
//!
//! Deterministic, self-describing encoding of ledger values.
//!
//! **Architecture:** domain types, two codecs, schema traits
//!
//! ## Purpose
//!
//! Produce byte-identical output for a logical value on every platform, so
//! that hashes and signatures computed here match the network's:
//! - CBOR form: hashing, signing, persistence
//! - Tagged JSON form: JSON-RPC transport
//!
//! ## Module Structure
//!
//! ```text
//! lc-01-dson/
//! ├── domain/   # DsonValue, DsonTag, output modes, errors
//! ├── codec/    # CBOR and JSON renderings of the value tree
//! └── schema/   # DsonEncode / DsonDecode, ObjectBuilder / ObjectReader
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod codec;
pub mod domain;
pub mod schema;

// Re-exports
pub use codec::{from_cbor, from_json, to_cbor, to_json};
pub use domain::{
    DsonError, DsonOutput, DsonTag, DsonValue, Visibility, DSON_VERSION, SERIALIZER_KEY,
    VERSION_KEY,
};
pub use schema::{
    decode, decode_json, encode, encode_json, hash_of, DsonDecode, DsonEncode, ObjectBuilder,
    ObjectReader,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
