//! Zarr format versions.
//!
//! - [Zarr Version 3 Specification](https://zarr-specs.readthedocs.io/en/latest/v3/core/index.html)
//! - [Zarr Version 2 Specification](https://zarr-specs.readthedocs.io/en/latest/v2/v2.0.html)

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A Zarr format version.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ZarrFormat {
    /// Zarr Version 2.
    V2,
    /// Zarr Version 3.
    V3,
}

/// An invalid Zarr format error.
#[derive(Clone, Debug, Error)]
#[error("invalid zarr format {_0}, expected 2 or 3")]
pub struct ZarrFormatError(pub serde_json::Value);

impl ZarrFormat {
    /// The integer used for the `zarr_format` metadata key.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        match self {
            Self::V2 => 2,
            Self::V3 => 3,
        }
    }

    /// Both format versions, oldest first.
    #[must_use]
    pub const fn all() -> [Self; 2] {
        [Self::V2, Self::V3]
    }
}

impl core::fmt::Display for ZarrFormat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_u64())
    }
}

impl TryFrom<&serde_json::Value> for ZarrFormat {
    type Error = ZarrFormatError;

    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        match value.as_u64() {
            Some(2) => Ok(Self::V2),
            Some(3) => Ok(Self::V3),
            _ => Err(ZarrFormatError(value.clone())),
        }
    }
}

impl Serialize for ZarrFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.as_u64())
    }
}

impl<'de> Deserialize<'de> for ZarrFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::try_from(&value).map_err(serde::de::Error::custom)
    }
}
