//! # CBOR Form
//!
//! The binary form hashed, signed and sent to nodes.
//!
//! - Aggregates are indefinite-length maps: `0xbf`, entries, `0xff`.
//! - Dictionaries are definite-length maps with sorted keys.
//! - Tagged scalars are byte strings whose first byte is the tag prefix;
//!   a 256-bit integer is 32 big-endian bytes after its prefix.
//! - Integer heads always use the shortest form.

use crate::domain::{DsonError, DsonTag, DsonValue};
use shared_types::{Address, Euid, RadixHash, ResourceIdentifier, U256};
use std::collections::BTreeMap;

const MAJOR_UNSIGNED: u8 = 0;
const MAJOR_NEGATIVE: u8 = 1;
const MAJOR_BYTES: u8 = 2;
const MAJOR_TEXT: u8 = 3;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_MAP: u8 = 5;
const MAJOR_SIMPLE: u8 = 7;

const INFO_INDEFINITE: u8 = 31;
const STREAM_START_MAP: u8 = 0xbf;
const BREAK: u8 = 0xff;
const FALSE: u8 = 0xf4;
const TRUE: u8 = 0xf5;

/// Maximum aggregate nesting accepted by the decoder.
pub const MAX_DEPTH: usize = 64;

/// Encode a value tree.
#[must_use]
pub fn to_cbor(value: &DsonValue) -> Vec<u8> {
    let mut out = Vec::with_capacity(256);
    write_value(&mut out, value);
    out
}

/// Decode exactly one item, rejecting trailing bytes.
pub fn from_cbor(bytes: &[u8]) -> Result<DsonValue, DsonError> {
    let mut reader = Reader { bytes, pos: 0 };
    let value = reader.read_value(0)?;
    let rest = bytes.len() - reader.pos;
    if rest > 0 {
        return Err(DsonError::TrailingBytes(rest));
    }
    Ok(value)
}

fn write_head(out: &mut Vec<u8>, major: u8, n: u64) {
    let major = major << 5;
    if n < 24 {
        out.push(major | n as u8);
    } else if n <= u64::from(u8::MAX) {
        out.push(major | 24);
        out.push(n as u8);
    } else if n <= u64::from(u16::MAX) {
        out.push(major | 25);
        out.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= u64::from(u32::MAX) {
        out.push(major | 26);
        out.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        out.push(major | 27);
        out.extend_from_slice(&n.to_be_bytes());
    }
}

fn write_text(out: &mut Vec<u8>, text: &str) {
    write_head(out, MAJOR_TEXT, text.len() as u64);
    out.extend_from_slice(text.as_bytes());
}

fn write_tagged(out: &mut Vec<u8>, tag: DsonTag, payload: &[u8]) {
    write_head(out, MAJOR_BYTES, payload.len() as u64 + 1);
    // Every non-string tag has a prefix.
    out.push(tag.cbor_prefix().unwrap_or_default());
    out.extend_from_slice(payload);
}

fn write_value(out: &mut Vec<u8>, value: &DsonValue) {
    match value {
        DsonValue::Object(entries) => {
            out.push(STREAM_START_MAP);
            for (key, value) in entries {
                write_text(out, key);
                write_value(out, value);
            }
            out.push(BREAK);
        }
        DsonValue::Map(map) => {
            write_head(out, MAJOR_MAP, map.len() as u64);
            for (key, value) in map {
                write_text(out, key);
                write_value(out, value);
            }
        }
        DsonValue::Array(items) => {
            write_head(out, MAJOR_ARRAY, items.len() as u64);
            for item in items {
                write_value(out, item);
            }
        }
        DsonValue::Int(n) if *n >= 0 => write_head(out, MAJOR_UNSIGNED, *n as u64),
        DsonValue::Int(n) => write_head(out, MAJOR_NEGATIVE, !(*n) as u64),
        DsonValue::Bool(b) => out.push(if *b { TRUE } else { FALSE }),
        DsonValue::Str(s) => write_text(out, s),
        DsonValue::Bytes(bytes) => write_tagged(out, DsonTag::Bytes, bytes),
        DsonValue::Euid(euid) => write_tagged(out, DsonTag::Euid, euid.as_bytes()),
        DsonValue::Hash(hash) => write_tagged(out, DsonTag::Hash, hash.as_bytes()),
        DsonValue::Address(address) => write_tagged(out, DsonTag::Address, address.as_bytes()),
        DsonValue::U256(n) => {
            let mut bytes = [0u8; 32];
            n.to_big_endian(&mut bytes);
            write_tagged(out, DsonTag::U256, &bytes);
        }
        DsonValue::Rri(rri) => write_tagged(out, DsonTag::Rri, rri.to_string().as_bytes()),
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn peek(&self) -> Result<u8, DsonError> {
        self.bytes
            .get(self.pos)
            .copied()
            .ok_or(DsonError::UnexpectedEnd)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DsonError> {
        let end = self.pos.checked_add(n).ok_or(DsonError::UnexpectedEnd)?;
        let slice = self
            .bytes
            .get(self.pos..end)
            .ok_or(DsonError::UnexpectedEnd)?;
        self.pos = end;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, DsonError> {
        let byte = self.peek()?;
        self.pos += 1;
        Ok(byte)
    }

    /// Argument of a head whose initial byte was already consumed.
    fn read_argument(&mut self, major: u8, info: u8) -> Result<u64, DsonError> {
        let width = match info {
            0..=23 => return Ok(u64::from(info)),
            24 => 1,
            25 => 2,
            26 => 4,
            27 => 8,
            _ => return Err(DsonError::UnsupportedMajorType { major, info }),
        };
        let mut buf = [0u8; 8];
        buf[8 - width..].copy_from_slice(self.take(width)?);
        Ok(u64::from_be_bytes(buf))
    }

    fn read_length(&mut self, major: u8, info: u8) -> Result<usize, DsonError> {
        let n = self.read_argument(major, info)?;
        let n = usize::try_from(n).map_err(|_| DsonError::UnexpectedEnd)?;
        // A length can never exceed what is left.
        if n > self.bytes.len() - self.pos {
            return Err(DsonError::UnexpectedEnd);
        }
        Ok(n)
    }

    fn read_text(&mut self, major: u8, info: u8) -> Result<String, DsonError> {
        let len = self.read_length(major, info)?;
        let raw = self.take(len)?;
        String::from_utf8(raw.to_vec()).map_err(DsonError::invalid)
    }

    fn read_key(&mut self) -> Result<String, DsonError> {
        let initial = self.read_u8()?;
        let (major, info) = (initial >> 5, initial & 0x1f);
        if major != MAJOR_TEXT {
            return Err(DsonError::TagMismatch {
                expected: "str",
                found: major_name(major),
            });
        }
        self.read_text(major, info)
    }

    fn read_value(&mut self, depth: usize) -> Result<DsonValue, DsonError> {
        if depth > MAX_DEPTH {
            return Err(DsonError::NestingTooDeep(MAX_DEPTH));
        }
        let initial = self.read_u8()?;
        let (major, info) = (initial >> 5, initial & 0x1f);
        match major {
            MAJOR_UNSIGNED => {
                let n = self.read_argument(major, info)?;
                i64::try_from(n)
                    .map(DsonValue::Int)
                    .map_err(|_| DsonError::InvalidValue(format!("integer {n} exceeds i64")))
            }
            MAJOR_NEGATIVE => {
                let n = self.read_argument(major, info)?;
                i64::try_from(n)
                    .map(|n| DsonValue::Int(!n))
                    .map_err(|_| DsonError::InvalidValue(format!("integer -1-{n} below i64")))
            }
            MAJOR_BYTES => {
                let len = self.read_length(major, info)?;
                let raw = self.take(len)?;
                decode_tagged(raw)
            }
            MAJOR_TEXT => self.read_text(major, info).map(DsonValue::Str),
            MAJOR_ARRAY if info == INFO_INDEFINITE => {
                let mut items = Vec::new();
                while self.peek()? != BREAK {
                    items.push(self.read_value(depth + 1)?);
                }
                self.pos += 1;
                Ok(DsonValue::Array(items))
            }
            MAJOR_ARRAY => {
                let len = self.read_length(major, info)?;
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(self.read_value(depth + 1)?);
                }
                Ok(DsonValue::Array(items))
            }
            MAJOR_MAP if info == INFO_INDEFINITE => {
                let mut entries = Vec::new();
                while self.peek()? != BREAK {
                    let key = self.read_key()?;
                    let value = self.read_value(depth + 1)?;
                    entries.push((key, value));
                }
                self.pos += 1;
                Ok(DsonValue::Object(entries))
            }
            MAJOR_MAP => {
                let len = self.read_length(major, info)?;
                let mut map = BTreeMap::new();
                for _ in 0..len {
                    let key = self.read_key()?;
                    let value = self.read_value(depth + 1)?;
                    map.insert(key, value);
                }
                Ok(DsonValue::Map(map))
            }
            MAJOR_SIMPLE if initial == FALSE => Ok(DsonValue::Bool(false)),
            MAJOR_SIMPLE if initial == TRUE => Ok(DsonValue::Bool(true)),
            _ => Err(DsonError::UnsupportedMajorType { major, info }),
        }
    }
}

fn major_name(major: u8) -> &'static str {
    match major {
        MAJOR_UNSIGNED | MAJOR_NEGATIVE => "int",
        MAJOR_BYTES => "byt",
        MAJOR_TEXT => "str",
        MAJOR_ARRAY => "array",
        MAJOR_MAP => "map",
        _ => "simple",
    }
}

fn decode_tagged(raw: &[u8]) -> Result<DsonValue, DsonError> {
    let (&prefix, payload) = raw
        .split_first()
        .ok_or_else(|| DsonError::InvalidValue("empty byte string".to_string()))?;
    let tag = DsonTag::from_cbor_prefix(prefix)
        .ok_or_else(|| DsonError::InvalidValue(format!("unknown byte string prefix {prefix:#04x}")))?;
    let value = match tag {
        DsonTag::Bytes => DsonValue::Bytes(payload.to_vec()),
        DsonTag::Euid => DsonValue::Euid(Euid::from_slice(payload).map_err(DsonError::invalid)?),
        DsonTag::Hash => {
            DsonValue::Hash(RadixHash::from_slice(payload).map_err(DsonError::invalid)?)
        }
        DsonTag::Address => {
            DsonValue::Address(Address::from_bytes(payload).map_err(DsonError::invalid)?)
        }
        DsonTag::U256 => {
            if payload.len() != 32 {
                return Err(DsonError::InvalidValue(format!(
                    "uint256 must be 32 bytes, got {}",
                    payload.len()
                )));
            }
            DsonValue::U256(U256::from_big_endian(payload))
        }
        DsonTag::Rri => {
            let text = std::str::from_utf8(payload).map_err(DsonError::invalid)?;
            DsonValue::Rri(
                text.parse::<ResourceIdentifier>()
                    .map_err(DsonError::invalid)?,
            )
        }
        DsonTag::Str => {
            return Err(DsonError::InvalidValue(
                "strings are not byte strings".to_string(),
            ))
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DSON_VERSION, SERIALIZER_KEY, VERSION_KEY};

    #[test]
    fn test_integer_heads_are_shortest() {
        assert_eq!(to_cbor(&DsonValue::Int(0)), vec![0x00]);
        assert_eq!(to_cbor(&DsonValue::Int(23)), vec![0x17]);
        assert_eq!(to_cbor(&DsonValue::Int(24)), vec![0x18, 0x18]);
        assert_eq!(to_cbor(&DsonValue::Int(100)), vec![0x18, 0x64]);
        assert_eq!(to_cbor(&DsonValue::Int(1000)), vec![0x19, 0x03, 0xe8]);
        assert_eq!(to_cbor(&DsonValue::Int(-1)), vec![0x20]);
        assert_eq!(to_cbor(&DsonValue::Int(-100)), vec![0x38, 0x63]);
    }

    #[test]
    fn test_extreme_integers_roundtrip() {
        for n in [i64::MIN, i64::MAX, -24, -25, 65_535, 65_536] {
            assert_eq!(from_cbor(&to_cbor(&DsonValue::Int(n))).unwrap(), DsonValue::Int(n));
        }
    }

    #[test]
    fn test_object_uses_stream_framing() {
        let value = DsonValue::Object(vec![
            (SERIALIZER_KEY.into(), "a".into()),
            (VERSION_KEY.into(), DSON_VERSION.into()),
        ]);
        let bytes = to_cbor(&value);
        assert_eq!(bytes.first(), Some(&0xbf));
        assert_eq!(bytes.last(), Some(&0xff));
        assert_eq!(
            hex::encode(&bytes),
            // "serializer": "a", "version": 100
            concat!("bf", "6a73657269616c697a6572", "6161", "6776657273696f6e", "1864", "ff")
        );
        assert_eq!(from_cbor(&bytes).unwrap(), value);
    }

    #[test]
    fn test_map_is_definite_and_sorted() {
        let mut map = BTreeMap::new();
        map.insert("b".to_string(), DsonValue::Int(2));
        map.insert("a".to_string(), DsonValue::Int(1));
        let bytes = to_cbor(&DsonValue::Map(map.clone()));
        assert_eq!(bytes, vec![0xa2, 0x61, b'a', 0x01, 0x61, b'b', 0x02]);
        assert_eq!(from_cbor(&bytes).unwrap(), DsonValue::Map(map));
    }

    #[test]
    fn test_tagged_scalars() {
        let bytes = to_cbor(&DsonValue::Bytes(vec![0xaa]));
        assert_eq!(bytes, vec![0x42, 0x01, 0xaa]);

        let hash = RadixHash::of(b"x");
        let bytes = to_cbor(&DsonValue::Hash(hash));
        assert_eq!(&bytes[..3], &[0x58, 33, 0x03]);
        assert_eq!(from_cbor(&bytes).unwrap(), DsonValue::Hash(hash));

        let n = U256::from(7);
        let bytes = to_cbor(&DsonValue::U256(n));
        assert_eq!(bytes.len(), 2 + 33);
        assert_eq!(bytes[2], 0x05);
        assert_eq!(bytes[34], 7);
        assert_eq!(from_cbor(&bytes).unwrap(), DsonValue::U256(n));
    }

    #[test]
    fn test_truncated_input() {
        let bytes = to_cbor(&DsonValue::Str("hello".into()));
        assert_eq!(from_cbor(&bytes[..3]), Err(DsonError::UnexpectedEnd));
        assert_eq!(from_cbor(&[0xbf, 0x61, b'a']), Err(DsonError::UnexpectedEnd));
    }

    #[test]
    fn test_trailing_bytes() {
        assert_eq!(from_cbor(&[0x01, 0x02]), Err(DsonError::TrailingBytes(1)));
    }

    #[test]
    fn test_unknown_prefix() {
        assert!(matches!(
            from_cbor(&[0x42, 0x09, 0x00]),
            Err(DsonError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_unsupported_items() {
        // float16
        assert_eq!(
            from_cbor(&[0xf9, 0x00, 0x00]),
            Err(DsonError::UnsupportedMajorType { major: 7, info: 25 })
        );
        // tag 1
        assert!(matches!(
            from_cbor(&[0xc1, 0x00]),
            Err(DsonError::UnsupportedMajorType { major: 6, .. })
        ));
    }

    #[test]
    fn test_non_text_key_rejected() {
        assert_eq!(
            from_cbor(&[0xa1, 0x01, 0x02]),
            Err(DsonError::TagMismatch {
                expected: "str",
                found: "int"
            })
        );
    }

    #[test]
    fn test_deep_nesting_rejected() {
        let mut bytes = vec![0x81; MAX_DEPTH + 2];
        bytes.push(0x00);
        assert_eq!(from_cbor(&bytes), Err(DsonError::NestingTooDeep(MAX_DEPTH)));
    }

    #[test]
    fn test_huge_declared_length() {
        assert_eq!(
            from_cbor(&[0x5b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]),
            Err(DsonError::UnexpectedEnd)
        );
    }
}
