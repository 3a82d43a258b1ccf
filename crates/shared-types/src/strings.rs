//! Length and charset constrained token metadata strings.

use crate::errors::StringValueError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

fn check_length(
    kind: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), StringValueError> {
    let actual = value.chars().count();
    if actual < min {
        return Err(StringValueError::TooShort { kind, min, actual });
    }
    if actual > max {
        return Err(StringValueError::TooLong { kind, max, actual });
    }
    Ok(())
}

macro_rules! constrained_string {
    ($(#[$meta:meta])* $name:ident, $min:expr, $max:expr, $check:expr) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            /// Minimum length in characters.
            pub const MIN_LENGTH: usize = $min;
            /// Maximum length in characters.
            pub const MAX_LENGTH: usize = $max;

            /// Validate and wrap.
            pub fn new(value: impl Into<String>) -> Result<Self, StringValueError> {
                let value = value.into();
                check_length(stringify!($name), &value, $min, $max)?;
                let check: fn(&'static str, &str) -> Result<(), StringValueError> = $check;
                check(stringify!($name), &value)?;
                Ok(Self(value))
            }

            /// Inner string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = StringValueError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.0)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::new(s).map_err(serde::de::Error::custom)
            }
        }
    };
}

constrained_string!(
    /// Human readable token name.
    Name, 2, 64, |_, _| Ok(())
);

constrained_string!(
    /// Ticker symbol, ASCII alphanumeric only.
    Symbol, 1, 14, |kind, value| {
        match value.chars().find(|c| !c.is_ascii_alphanumeric()) {
            Some(character) => Err(StringValueError::DisallowedCharacter { kind, character }),
            None => Ok(()),
        }
    }
);

constrained_string!(
    /// Free text token description.
    Description, 8, 200, |_, _| Ok(())
);
