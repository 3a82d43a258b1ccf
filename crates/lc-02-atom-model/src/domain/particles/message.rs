//! Arbitrary data sent from one address to another.

use lc_01_dson::{DsonDecode, DsonEncode, DsonError, DsonOutput, DsonValue, ObjectBuilder, ObjectReader};
use shared_types::{Address, Nonce};
use std::collections::BTreeMap;

/// Serializer name.
pub const MESSAGE_SERIALIZER: &str = "radix.particles.message";

/// Message payload with optional application metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageParticle {
    /// Sender.
    pub from: Address,
    /// Recipient.
    pub to: Address,
    /// Payload, possibly encrypted.
    pub bytes: Vec<u8>,
    /// Disambiguates otherwise equal particles.
    pub nonce: Nonce,
    /// Application metadata, e.g. `application = "message"`.
    pub meta_data: BTreeMap<String, String>,
}

impl MessageParticle {
    /// New message with a random nonce and no metadata.
    #[must_use]
    pub fn new(from: Address, to: Address, bytes: Vec<u8>) -> Self {
        Self {
            from,
            to,
            bytes,
            nonce: Nonce::random(),
            meta_data: BTreeMap::new(),
        }
    }

    /// Same message with one metadata entry added.
    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta_data.insert(key.into(), value.into());
        self
    }
}

impl DsonEncode for MessageParticle {
    fn to_dson(&self, mode: DsonOutput) -> DsonValue {
        let builder = ObjectBuilder::new(MESSAGE_SERIALIZER, mode)
            .field("from", &self.from)
            .field("to", &self.to)
            .raw("bytes", DsonValue::Bytes(self.bytes.clone()))
            .field("nonce", &self.nonce);
        let meta_data = (!self.meta_data.is_empty()).then_some(&self.meta_data);
        builder.optional_field("metaData", meta_data).build()
    }
}

impl DsonDecode for MessageParticle {
    fn from_dson(value: &DsonValue) -> Result<Self, DsonError> {
        let reader = ObjectReader::new(value, MESSAGE_SERIALIZER)?;
        Ok(Self {
            from: reader.required("from")?,
            to: reader.required("to")?,
            bytes: reader.bytes("bytes")?,
            nonce: reader.required("nonce")?,
            meta_data: reader.optional("metaData")?.unwrap_or_default(),
        })
    }
}
