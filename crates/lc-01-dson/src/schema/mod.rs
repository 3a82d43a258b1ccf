//! # Schema Traits
//!
//! Types take part in DSON by projecting into and out of a [`DsonValue`].
//! Aggregates use [`ObjectBuilder`] so that field order is the order of the
//! builder calls, framed by `serializer` and `version`.

mod primitives;

pub use primitives::SIGNATURE_SERIALIZER;

use crate::codec::{from_cbor, from_json, to_cbor, to_json};
use crate::domain::{
    DsonError, DsonOutput, DsonValue, Visibility, DSON_VERSION, SERIALIZER_KEY, VERSION_KEY,
};
use shared_types::RadixHash;

/// Projection into the value tree.
pub trait DsonEncode {
    /// Build the tree for `mode`, omitting fields not visible in it.
    fn to_dson(&self, mode: DsonOutput) -> DsonValue;
}

/// Reconstruction from the value tree.
pub trait DsonDecode: Sized {
    /// Rebuild and validate.
    fn from_dson(value: &DsonValue) -> Result<Self, DsonError>;
}

/// CBOR bytes of `value` in `mode`.
pub fn encode<T: DsonEncode + ?Sized>(value: &T, mode: DsonOutput) -> Vec<u8> {
    to_cbor(&value.to_dson(mode))
}

/// Decode CBOR bytes into `T`.
pub fn decode<T: DsonDecode>(bytes: &[u8]) -> Result<T, DsonError> {
    T::from_dson(&from_cbor(bytes)?)
}

/// JSON of `value`, always in the default mode.
pub fn encode_json<T: DsonEncode + ?Sized>(value: &T) -> serde_json::Value {
    to_json(&value.to_dson(DsonOutput::Default))
}

/// Decode tagged JSON into `T`.
pub fn decode_json<T: DsonDecode>(json: &serde_json::Value) -> Result<T, DsonError> {
    T::from_dson(&from_json(json)?)
}

/// Double SHA-256 of the hash-mode encoding.
pub fn hash_of<T: DsonEncode + ?Sized>(value: &T) -> RadixHash {
    RadixHash::of(&encode(value, DsonOutput::Hash))
}

/// Accumulates an aggregate's fields in declared order.
#[derive(Debug)]
#[must_use]
pub struct ObjectBuilder {
    mode: DsonOutput,
    entries: Vec<(String, DsonValue)>,
}

impl ObjectBuilder {
    /// Start an aggregate of type `serializer`.
    pub fn new(serializer: &str, mode: DsonOutput) -> Self {
        Self {
            mode,
            entries: vec![(SERIALIZER_KEY.to_string(), DsonValue::Str(serializer.to_string()))],
        }
    }

    /// Mode the aggregate is being built for. Nested values use it too.
    #[must_use]
    pub const fn mode(&self) -> DsonOutput {
        self.mode
    }

    /// Field visible in every mode.
    pub fn field<T: DsonEncode + ?Sized>(self, key: &str, value: &T) -> Self {
        self.field_with(Visibility::All, key, value)
    }

    /// Field visible only in some modes.
    pub fn field_with<T: DsonEncode + ?Sized>(
        mut self,
        visibility: Visibility,
        key: &str,
        value: &T,
    ) -> Self {
        if visibility.is_included_in(self.mode) {
            let value = value.to_dson(self.mode);
            self.entries.push((key.to_string(), value));
        }
        self
    }

    /// Field written only when present.
    pub fn optional_field<T: DsonEncode>(self, key: &str, value: Option<&T>) -> Self {
        match value {
            Some(value) => self.field(key, value),
            None => self,
        }
    }

    /// Field whose tree was built by the caller.
    pub fn raw(mut self, key: &str, value: DsonValue) -> Self {
        self.entries.push((key.to_string(), value));
        self
    }

    /// Close the aggregate with its version.
    #[must_use]
    pub fn build(mut self) -> DsonValue {
        self.entries
            .push((VERSION_KEY.to_string(), DsonValue::Int(DSON_VERSION)));
        DsonValue::Object(self.entries)
    }
}

/// Typed access to the fields of a decoded aggregate.
#[derive(Debug, Clone, Copy)]
pub struct ObjectReader<'a> {
    serializer: &'a str,
    entries: &'a [(String, DsonValue)],
}

impl<'a> ObjectReader<'a> {
    /// Open an aggregate of any type.
    pub fn open(value: &'a DsonValue) -> Result<Self, DsonError> {
        let entries = value.as_object()?;
        let serializer = value.serializer()?;
        if let Some(version) = entries.iter().find(|(key, _)| key == VERSION_KEY) {
            let version = version.1.as_int()?;
            if *version != DSON_VERSION {
                return Err(DsonError::InvalidValue(format!(
                    "unsupported version {version}"
                )));
            }
        }
        Ok(Self {
            serializer,
            entries,
        })
    }

    /// Open an aggregate that must be of type `expected`.
    pub fn new(value: &'a DsonValue, expected: &str) -> Result<Self, DsonError> {
        let reader = Self::open(value)?;
        if reader.serializer != expected {
            return Err(DsonError::SerializerMismatch {
                expected: expected.to_string(),
                found: reader.serializer.to_string(),
            });
        }
        Ok(reader)
    }

    /// Type of the aggregate.
    #[must_use]
    pub const fn serializer(&self) -> &'a str {
        self.serializer
    }

    /// Raw field value.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&'a DsonValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    /// Raw field value that must be present.
    pub fn require_value(&self, key: &str) -> Result<&'a DsonValue, DsonError> {
        self.value(key)
            .ok_or_else(|| DsonError::MissingField(format!("{}.{key}", self.serializer)))
    }

    /// Decode a field that must be present.
    pub fn required<T: DsonDecode>(&self, key: &str) -> Result<T, DsonError> {
        T::from_dson(self.require_value(key)?)
    }

    /// Decode a field that may be absent.
    pub fn optional<T: DsonDecode>(&self, key: &str) -> Result<Option<T>, DsonError> {
        self.value(key).map(T::from_dson).transpose()
    }

    /// Opaque bytes field.
    pub fn bytes(&self, key: &str) -> Result<Vec<u8>, DsonError> {
        self.require_value(key)?.as_bytes().cloned()
    }
}
