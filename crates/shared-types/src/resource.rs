//! # Resource Identifiers
//!
//! Tokens and unique claims are referenced by `/address/name`.

use crate::address::Address;
use crate::errors::ResourceIdentifierError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Reference to a token or unique resource owned by an address.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceIdentifier {
    address: Address,
    name: String,
}

impl ResourceIdentifier {
    const SEPARATOR: char = '/';

    /// Build from parts. The name must not contain `/`.
    pub fn new(address: Address, name: impl Into<String>) -> Result<Self, ResourceIdentifierError> {
        let name = name.into();
        if name.is_empty() || name.contains(Self::SEPARATOR) {
            return Err(ResourceIdentifierError::MalformedIdentifier(format!(
                "/{address}/{name}"
            )));
        }
        Ok(Self { address, name })
    }

    /// Owning address.
    #[must_use]
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Resource name, usually a token symbol.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for ResourceIdentifier {
    type Err = ResourceIdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ResourceIdentifierError::MalformedIdentifier(s.to_string());
        let rest = s.strip_prefix(Self::SEPARATOR).ok_or_else(malformed)?;
        let (address, name) = rest.split_once(Self::SEPARATOR).ok_or_else(malformed)?;
        if name.is_empty() || name.contains(Self::SEPARATOR) {
            return Err(malformed());
        }
        Ok(Self {
            address: address.parse()?,
            name: name.to_string(),
        })
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.address, self.name)
    }
}

impl fmt::Debug for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rri({self})")
    }
}

impl Serialize for ResourceIdentifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResourceIdentifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: &str = "JHdWTe8zD2BMWwMWZxcKAFx1E8kK3UqBSsqxD9UWkkVD78uMCei";

    #[test]
    fn test_parse_and_render() {
        let text = format!("/{ALICE}/XRD");
        let rri: ResourceIdentifier = text.parse().unwrap();
        assert_eq!(rri.name(), "XRD");
        assert_eq!(rri.address().to_string(), ALICE);
        assert_eq!(rri.to_string(), text);
    }

    #[test]
    fn test_missing_leading_slash() {
        assert!(matches!(
            format!("{ALICE}/XRD").parse::<ResourceIdentifier>(),
            Err(ResourceIdentifierError::MalformedIdentifier(_))
        ));
    }

    #[test]
    fn test_extra_segment_rejected() {
        assert!(matches!(
            format!("/{ALICE}/XRD/more").parse::<ResourceIdentifier>(),
            Err(ResourceIdentifierError::MalformedIdentifier(_))
        ));
    }

    #[test]
    fn test_bad_address_segment() {
        assert!(matches!(
            "/notanaddress/XRD".parse::<ResourceIdentifier>(),
            Err(ResourceIdentifierError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_new_rejects_slash_in_name() {
        let address: Address = ALICE.parse().unwrap();
        assert!(ResourceIdentifier::new(address, "a/b").is_err());
    }
}
