//! # JSON Form
//!
//! The form used inside JSON-RPC messages. Scalars that are not JSON
//! primitives are strings carrying their tag, `":tag:value"`:
//!
//! | Tag | Value |
//! |-----|-------|
//! | `str` | the string |
//! | `adr` | base58 address |
//! | `rri` | `/address/name` |
//! | `byt` | base64 (standard alphabet, padded) |
//! | `u20` | decimal |
//! | `hsh` | hex |
//! | `uid` | hex |
//!
//! Aggregates and dictionaries are both JSON objects; an object carrying a
//! `serializer` key decodes as an aggregate.

use crate::domain::{DsonError, DsonTag, DsonValue, SERIALIZER_KEY};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{Map, Number, Value};
use shared_types::U256;
use std::collections::BTreeMap;

/// Render a value tree as JSON.
#[must_use]
pub fn to_json(value: &DsonValue) -> Value {
    match value {
        DsonValue::Object(entries) => Value::Object(
            entries
                .iter()
                .map(|(key, value)| (key.clone(), to_json(value)))
                .collect::<Map<_, _>>(),
        ),
        DsonValue::Map(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), to_json(value)))
                .collect::<Map<_, _>>(),
        ),
        DsonValue::Array(items) => Value::Array(items.iter().map(to_json).collect()),
        DsonValue::Int(n) => Value::Number(Number::from(*n)),
        DsonValue::Bool(b) => Value::Bool(*b),
        DsonValue::Str(s) => tagged(DsonTag::Str, s),
        DsonValue::Bytes(bytes) => tagged(DsonTag::Bytes, &STANDARD.encode(bytes)),
        DsonValue::Euid(euid) => tagged(DsonTag::Euid, &euid.to_hex()),
        DsonValue::Hash(hash) => tagged(DsonTag::Hash, &hash.to_hex()),
        DsonValue::Address(address) => tagged(DsonTag::Address, &address.to_base58()),
        DsonValue::U256(n) => tagged(DsonTag::U256, &n.to_string()),
        DsonValue::Rri(rri) => tagged(DsonTag::Rri, &rri.to_string()),
    }
}

fn tagged(tag: DsonTag, body: &str) -> Value {
    Value::String(format!(":{}:{body}", tag.name()))
}

/// Parse JSON into a value tree.
///
/// Untagged strings are accepted as plain strings. Floats and `null` are
/// rejected.
pub fn from_json(value: &Value) -> Result<DsonValue, DsonError> {
    match value {
        Value::Object(object) if object.contains_key(SERIALIZER_KEY) => Ok(DsonValue::Object(
            object
                .iter()
                .map(|(key, value)| Ok((key.clone(), from_json(value)?)))
                .collect::<Result<Vec<_>, DsonError>>()?,
        )),
        Value::Object(object) => Ok(DsonValue::Map(
            object
                .iter()
                .map(|(key, value)| Ok((key.clone(), from_json(value)?)))
                .collect::<Result<BTreeMap<_, _>, DsonError>>()?,
        )),
        Value::Array(items) => Ok(DsonValue::Array(
            items.iter().map(from_json).collect::<Result<_, _>>()?,
        )),
        Value::Number(n) => n
            .as_i64()
            .map(DsonValue::Int)
            .ok_or_else(|| DsonError::InvalidValue(format!("non-integer number {n}"))),
        Value::Bool(b) => Ok(DsonValue::Bool(*b)),
        Value::String(s) => parse_tagged(s),
        Value::Null => Err(DsonError::InvalidValue("null".to_string())),
    }
}

fn split_tag(s: &str) -> Option<(DsonTag, &str)> {
    let rest = s.strip_prefix(':')?;
    let (name, body) = rest.split_once(':')?;
    let tag = DsonTag::ALL.into_iter().find(|tag| tag.name() == name)?;
    Some((tag, body))
}

fn parse_tagged(s: &str) -> Result<DsonValue, DsonError> {
    let Some((tag, body)) = split_tag(s) else {
        return Ok(DsonValue::Str(s.to_string()));
    };
    let value = match tag {
        DsonTag::Str => DsonValue::Str(body.to_string()),
        DsonTag::Address => DsonValue::Address(body.parse().map_err(DsonError::invalid)?),
        DsonTag::Rri => DsonValue::Rri(body.parse().map_err(DsonError::invalid)?),
        DsonTag::Bytes => DsonValue::Bytes(STANDARD.decode(body).map_err(DsonError::invalid)?),
        DsonTag::U256 => DsonValue::U256(U256::from_dec_str(body).map_err(|e| {
            DsonError::InvalidValue(format!("bad decimal {body:?}: {e:?}"))
        })?),
        DsonTag::Hash => DsonValue::Hash(body.parse().map_err(DsonError::invalid)?),
        DsonTag::Euid => DsonValue::Euid(body.parse().map_err(DsonError::invalid)?),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared_types::{Address, RadixHash};

    const ALICE: &str = "JHdWTe8zD2BMWwMWZxcKAFx1E8kK3UqBSsqxD9UWkkVD78uMCei";

    #[test]
    fn test_scalar_prefixes() {
        let address: Address = ALICE.parse().unwrap();
        assert_eq!(to_json(&DsonValue::Address(address)), json!(format!(":adr:{ALICE}")));
        assert_eq!(to_json(&DsonValue::Str("hi".into())), json!(":str:hi"));
        assert_eq!(to_json(&DsonValue::Bytes(b"hi".to_vec())), json!(":byt:aGk="));
        assert_eq!(to_json(&DsonValue::U256(U256::from(1000))), json!(":u20:1000"));
        assert_eq!(to_json(&DsonValue::Int(-3)), json!(-3));
    }

    #[test]
    fn test_tagged_strings_parse_back() {
        let hash = RadixHash::of(b"abc");
        let value = DsonValue::Array(vec![
            DsonValue::Hash(hash),
            DsonValue::Euid(hash.to_euid()),
            DsonValue::Bytes(vec![]),
            DsonValue::Str(":not:a tag".into()),
        ]);
        assert_eq!(from_json(&to_json(&value)).unwrap(), value);
    }

    #[test]
    fn test_untagged_string_is_plain() {
        assert_eq!(
            from_json(&json!("radix.atom")).unwrap(),
            DsonValue::Str("radix.atom".into())
        );
    }

    #[test]
    fn test_object_detection() {
        let aggregate = from_json(&json!({"serializer": ":str:radix.atom", "version": 100})).unwrap();
        assert_eq!(aggregate.serializer().unwrap(), "radix.atom");

        let dictionary = from_json(&json!({"timestamp": ":str:1"})).unwrap();
        assert!(dictionary.as_map().is_ok());
    }

    #[test]
    fn test_bad_payloads() {
        assert!(matches!(
            from_json(&json!(":hsh:zz")),
            Err(DsonError::InvalidValue(_))
        ));
        assert!(matches!(from_json(&json!(1.5)), Err(DsonError::InvalidValue(_))));
        assert!(matches!(from_json(&json!(null)), Err(DsonError::InvalidValue(_))));
    }
}
