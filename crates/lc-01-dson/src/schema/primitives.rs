//! Encodings of the primitive value types.

use super::{DsonDecode, DsonEncode, ObjectBuilder, ObjectReader};
use crate::domain::{DsonError, DsonOutput, DsonValue};
use shared_types::{
    Address, Description, Euid, Name, NonNegativeAmount, Nonce, Planck, PositiveAmount,
    RadixHash, ResourceIdentifier, Signature, Symbol, TokenPermission, TokenPermissions, U256,
};
use std::collections::BTreeMap;

impl DsonEncode for str {
    fn to_dson(&self, _: DsonOutput) -> DsonValue {
        DsonValue::Str(self.to_string())
    }
}

impl DsonEncode for String {
    fn to_dson(&self, _: DsonOutput) -> DsonValue {
        DsonValue::Str(self.clone())
    }
}

impl DsonDecode for String {
    fn from_dson(value: &DsonValue) -> Result<Self, DsonError> {
        value.as_str().cloned()
    }
}

impl DsonEncode for i64 {
    fn to_dson(&self, _: DsonOutput) -> DsonValue {
        DsonValue::Int(*self)
    }
}

impl DsonDecode for i64 {
    fn from_dson(value: &DsonValue) -> Result<Self, DsonError> {
        value.as_int().copied()
    }
}

impl DsonEncode for bool {
    fn to_dson(&self, _: DsonOutput) -> DsonValue {
        DsonValue::Bool(*self)
    }
}

impl DsonDecode for bool {
    fn from_dson(value: &DsonValue) -> Result<Self, DsonError> {
        value.as_bool().copied()
    }
}

impl<T: DsonEncode> DsonEncode for [T] {
    fn to_dson(&self, mode: DsonOutput) -> DsonValue {
        DsonValue::Array(self.iter().map(|item| item.to_dson(mode)).collect())
    }
}

impl<T: DsonEncode> DsonEncode for Vec<T> {
    fn to_dson(&self, mode: DsonOutput) -> DsonValue {
        self.as_slice().to_dson(mode)
    }
}

impl<T: DsonDecode> DsonDecode for Vec<T> {
    fn from_dson(value: &DsonValue) -> Result<Self, DsonError> {
        value.as_array()?.iter().map(T::from_dson).collect()
    }
}

impl<T: DsonEncode> DsonEncode for BTreeMap<String, T> {
    fn to_dson(&self, mode: DsonOutput) -> DsonValue {
        DsonValue::Map(
            self.iter()
                .map(|(key, value)| (key.clone(), value.to_dson(mode)))
                .collect(),
        )
    }
}

impl<T: DsonDecode> DsonDecode for BTreeMap<String, T> {
    fn from_dson(value: &DsonValue) -> Result<Self, DsonError> {
        value
            .as_map()?
            .iter()
            .map(|(key, value)| Ok((key.clone(), T::from_dson(value)?)))
            .collect()
    }
}

macro_rules! tagged_scalar {
    ($ty:ty, $variant:ident, $accessor:ident) => {
        impl DsonEncode for $ty {
            fn to_dson(&self, _: DsonOutput) -> DsonValue {
                DsonValue::$variant(self.clone())
            }
        }

        impl DsonDecode for $ty {
            fn from_dson(value: &DsonValue) -> Result<Self, DsonError> {
                value.$accessor().cloned()
            }
        }
    };
}

tagged_scalar!(Address, Address, as_address);
tagged_scalar!(Euid, Euid, as_euid);
tagged_scalar!(RadixHash, Hash, as_hash);
tagged_scalar!(U256, U256, as_u256);
tagged_scalar!(ResourceIdentifier, Rri, as_rri);

impl DsonEncode for NonNegativeAmount {
    fn to_dson(&self, _: DsonOutput) -> DsonValue {
        DsonValue::U256(self.as_u256())
    }
}

impl DsonDecode for NonNegativeAmount {
    fn from_dson(value: &DsonValue) -> Result<Self, DsonError> {
        value.as_u256().map(|n| Self::from_u256(*n))
    }
}

impl DsonEncode for PositiveAmount {
    fn to_dson(&self, _: DsonOutput) -> DsonValue {
        DsonValue::U256(self.as_u256())
    }
}

impl DsonDecode for PositiveAmount {
    fn from_dson(value: &DsonValue) -> Result<Self, DsonError> {
        Self::new(*value.as_u256()?).map_err(DsonError::invalid)
    }
}

impl DsonEncode for Nonce {
    fn to_dson(&self, _: DsonOutput) -> DsonValue {
        DsonValue::Int(self.0)
    }
}

impl DsonDecode for Nonce {
    fn from_dson(value: &DsonValue) -> Result<Self, DsonError> {
        value.as_int().map(|n| Self(*n))
    }
}

impl DsonEncode for Planck {
    fn to_dson(&self, _: DsonOutput) -> DsonValue {
        // Plancks are minutes; i64 covers them for the age of the universe.
        DsonValue::Int(i64::try_from(self.0).unwrap_or(i64::MAX))
    }
}

impl DsonDecode for Planck {
    fn from_dson(value: &DsonValue) -> Result<Self, DsonError> {
        let n = *value.as_int()?;
        u64::try_from(n)
            .map(Self)
            .map_err(|_| DsonError::InvalidValue(format!("negative planck {n}")))
    }
}

macro_rules! string_newtype {
    ($ty:ty) => {
        impl DsonEncode for $ty {
            fn to_dson(&self, _: DsonOutput) -> DsonValue {
                DsonValue::Str(self.as_str().to_string())
            }
        }

        impl DsonDecode for $ty {
            fn from_dson(value: &DsonValue) -> Result<Self, DsonError> {
                <$ty>::new(value.as_str()?.as_str()).map_err(DsonError::invalid)
            }
        }
    };
}

string_newtype!(Name);
string_newtype!(Symbol);
string_newtype!(Description);

impl DsonEncode for TokenPermissions {
    fn to_dson(&self, _: DsonOutput) -> DsonValue {
        DsonValue::Map(
            self.to_map()
                .into_iter()
                .map(|(action, permission)| (action.to_string(), permission.as_str().into()))
                .collect(),
        )
    }
}

impl DsonDecode for TokenPermissions {
    fn from_dson(value: &DsonValue) -> Result<Self, DsonError> {
        let map = value.as_map()?;
        let permission = |action: &str| -> Result<TokenPermission, DsonError> {
            let name = map
                .get(action)
                .ok_or_else(|| DsonError::MissingField(format!("permissions.{action}")))?
                .as_str()?;
            TokenPermission::from_wire(name)
                .ok_or_else(|| DsonError::InvalidValue(format!("unknown permission {name:?}")))
        };
        Ok(Self {
            burn: permission("burn")?,
            mint: permission("mint")?,
        })
    }
}

/// Serializer of an ECDSA signature aggregate.
pub const SIGNATURE_SERIALIZER: &str = "crypto.ecdsa_signature";

impl DsonEncode for Signature {
    fn to_dson(&self, mode: DsonOutput) -> DsonValue {
        ObjectBuilder::new(SIGNATURE_SERIALIZER, mode)
            .raw("r", DsonValue::Bytes(self.r_bytes().to_vec()))
            .raw("s", DsonValue::Bytes(self.s_bytes().to_vec()))
            .build()
    }
}

impl DsonDecode for Signature {
    fn from_dson(value: &DsonValue) -> Result<Self, DsonError> {
        let reader = ObjectReader::new(value, SIGNATURE_SERIALIZER)?;
        let r = reader.bytes("r")?;
        let s = reader.bytes("s")?;
        Self::from_components(&r, &s).map_err(DsonError::invalid)
    }
}
