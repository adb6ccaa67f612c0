//! crates/en_core/src/ids.rs
//! Registry identifiers: districts and party keys. No I/O.
//!
//! - `DistrictId` is the human-facing district name taken from source data.
//!   Any non-empty string without control characters, at most 256 bytes.
//!   Geography heuristics match against it, so it is kept verbatim.
//! - `PartyKey` is the `<party>` part of a `<party>_votes` column:
//!   `^[A-Za-z0-9_.:-]{1,64}$` (ASCII only).

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Errors returned when validating or parsing IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdError {
    Empty,
    TooLong,
    BadShape,
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdError::Empty => write!(f, "empty id"),
            IdError::TooLong => write!(f, "id too long"),
            IdError::BadShape => write!(f, "id has invalid characters"),
        }
    }
}

impl std::error::Error for IdError {}

const MAX_DISTRICT_LEN: usize = 256;
const TOKEN_MAX_LEN: usize = 64;

/// Token for PartyKey: ^[A-Za-z0-9_.:-]{1,64}$ (ASCII only)
#[inline]
pub fn is_valid_token(s: &str) -> bool {
    let len = s.len();
    if len == 0 || len > TOKEN_MAX_LEN {
        return false;
    }
    s.bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b':' | b'-'))
}

macro_rules! simple_string_newtype {
    ($(#[$m:meta])* $name:ident) => {
        $(#[$m])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        #[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
        pub struct $name(String);

        impl $name {
            #[inline] pub fn as_str(&self) -> &str { &self.0 }
        }

        impl fmt::Display for $name {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
        }

        impl TryFrom<&str> for $name {
            type Error = IdError;
            #[inline]
            fn try_from(value: &str) -> Result<Self, Self::Error> { value.parse() }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;
            #[inline]
            fn try_from(value: String) -> Result<Self, Self::Error> { value.parse() }
        }

        impl From<$name> for String {
            #[inline]
            fn from(v: $name) -> String { v.0 }
        }

        impl AsRef<str> for $name {
            #[inline]
            fn as_ref(&self) -> &str { &self.0 }
        }
    }
}

simple_string_newtype!(
    /// District name as it appears in the source rows.
    DistrictId
);
simple_string_newtype!(
    /// Party column key: ^[A-Za-z0-9_.:-]{1,64}$
    PartyKey
);

impl FromStr for DistrictId {
    type Err = IdError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() { return Err(IdError::Empty); }
        if s.len() > MAX_DISTRICT_LEN { return Err(IdError::TooLong); }
        if s.chars().any(char::is_control) { return Err(IdError::BadShape); }
        Ok(DistrictId(s.to_owned()))
    }
}

impl FromStr for PartyKey {
    type Err = IdError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() { return Err(IdError::Empty); }
        if s.len() > TOKEN_MAX_LEN { return Err(IdError::TooLong); }
        if !is_valid_token(s) { return Err(IdError::BadShape); }
        Ok(PartyKey(s.to_owned()))
    }
}
