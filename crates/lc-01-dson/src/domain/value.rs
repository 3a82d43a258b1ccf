//! # DSON Value Tree
//!
//! Every encodable type projects itself into a [`DsonValue`]; the CBOR and
//! JSON codecs only ever see this tree.
//!
//! Aggregates (`Object`) keep their entries in declared order and always
//! start with `serializer` and end with `version`. Plain dictionaries
//! (`Map`) are key sorted.

use crate::domain::errors::DsonError;
use shared_types::{Address, Euid, RadixHash, ResourceIdentifier, U256};
use std::collections::BTreeMap;

/// Key naming an aggregate's type.
pub const SERIALIZER_KEY: &str = "serializer";

/// Key carrying the encoding version.
pub const VERSION_KEY: &str = "version";

/// Encoding version written into every aggregate.
pub const DSON_VERSION: i64 = 100;

/// Type tag of a scalar that is not a plain CBOR primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DsonTag {
    /// UTF-8 string.
    Str,
    /// Base58 address.
    Address,
    /// Resource identifier `/address/name`.
    Rri,
    /// Opaque bytes.
    Bytes,
    /// 256-bit unsigned integer.
    U256,
    /// 32-byte hash.
    Hash,
    /// 16-byte unique id.
    Euid,
}

impl DsonTag {
    /// Every tag, in JSON prefix lookup order.
    pub const ALL: [DsonTag; 7] = [
        Self::Str,
        Self::Address,
        Self::Rri,
        Self::Bytes,
        Self::U256,
        Self::Hash,
        Self::Euid,
    ];

    /// Three letter name used in the JSON form (`:adr:...`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Address => "adr",
            Self::Rri => "rri",
            Self::Bytes => "byt",
            Self::U256 => "u20",
            Self::Hash => "hsh",
            Self::Euid => "uid",
        }
    }

    /// Prefix byte inside CBOR byte strings. Strings are CBOR text instead.
    #[must_use]
    pub const fn cbor_prefix(self) -> Option<u8> {
        match self {
            Self::Str => None,
            Self::Bytes => Some(0x01),
            Self::Euid => Some(0x02),
            Self::Hash => Some(0x03),
            Self::Address => Some(0x04),
            Self::U256 => Some(0x05),
            Self::Rri => Some(0x06),
        }
    }

    /// Inverse of [`Self::cbor_prefix`].
    #[must_use]
    pub fn from_cbor_prefix(prefix: u8) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tag| tag.cbor_prefix() == Some(prefix))
    }
}

/// Decoded or to-be-encoded DSON value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DsonValue {
    /// Typed aggregate, entries in declared order.
    Object(Vec<(String, DsonValue)>),
    /// Plain dictionary, keys sorted.
    Map(BTreeMap<String, DsonValue>),
    /// Ordered sequence.
    Array(Vec<DsonValue>),
    /// Signed integer.
    Int(i64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Str(String),
    /// Opaque bytes.
    Bytes(Vec<u8>),
    /// Unique id.
    Euid(Euid),
    /// Hash.
    Hash(RadixHash),
    /// Address.
    Address(Address),
    /// 256-bit unsigned integer.
    U256(U256),
    /// Resource identifier.
    Rri(ResourceIdentifier),
}

macro_rules! accessor {
    ($name:ident, $variant:ident, $ty:ty, $expected:expr) => {
        #[doc = concat!("Borrow the inner value of a `", stringify!($variant), "`.")]
        pub fn $name(&self) -> Result<&$ty, DsonError> {
            match self {
                Self::$variant(inner) => Ok(inner),
                other => Err(DsonError::TagMismatch {
                    expected: $expected,
                    found: other.kind(),
                }),
            }
        }
    };
}

impl DsonValue {
    /// Short name of this value's type, used in mismatch errors.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Object(_) => "object",
            Self::Map(_) => "map",
            Self::Array(_) => "array",
            Self::Int(_) => "int",
            Self::Bool(_) => "bool",
            Self::Str(_) => DsonTag::Str.name(),
            Self::Bytes(_) => DsonTag::Bytes.name(),
            Self::Euid(_) => DsonTag::Euid.name(),
            Self::Hash(_) => DsonTag::Hash.name(),
            Self::Address(_) => DsonTag::Address.name(),
            Self::U256(_) => DsonTag::U256.name(),
            Self::Rri(_) => DsonTag::Rri.name(),
        }
    }

    accessor!(as_object, Object, Vec<(String, DsonValue)>, "object");
    accessor!(as_map, Map, BTreeMap<String, DsonValue>, "map");
    accessor!(as_array, Array, Vec<DsonValue>, "array");
    accessor!(as_int, Int, i64, "int");
    accessor!(as_bool, Bool, bool, "bool");
    accessor!(as_str, Str, String, "str");
    accessor!(as_bytes, Bytes, Vec<u8>, "byt");
    accessor!(as_euid, Euid, Euid, "uid");
    accessor!(as_hash, Hash, RadixHash, "hsh");
    accessor!(as_address, Address, Address, "adr");
    accessor!(as_u256, U256, U256, "u20");
    accessor!(as_rri, Rri, ResourceIdentifier, "rri");

    /// Serializer name of an aggregate.
    pub fn serializer(&self) -> Result<&str, DsonError> {
        let entries = self.as_object()?;
        entries
            .iter()
            .find(|(key, _)| key == SERIALIZER_KEY)
            .ok_or_else(|| DsonError::MissingField(SERIALIZER_KEY.to_string()))
            .and_then(|(_, value)| value.as_str().map(String::as_str))
    }

    /// Look up a field of an aggregate or a dictionary entry.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&DsonValue> {
        match self {
            Self::Object(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            Self::Map(map) => map.get(key),
            _ => None,
        }
    }
}

impl From<&str> for DsonValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for DsonValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for DsonValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for DsonValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}
