//! Zarr V2 arrays.
//!
//! An [`ArrayMetadataV2`] is the validated metadata document of a Zarr V2 array.
//! It is stored as two JSON documents: the array metadata (`.zarray`) and the user attributes (`.zattrs`).
//!
//! Metadata is created with the validating constructor [`ArrayMetadataV2::new`], with an [`ArrayMetadataV2Builder`]
//! (which takes unspecified codecs and memory order from the [configuration](crate::config)),
//! or loaded from a stored document with [`ArrayMetadataV2::from_dict`].
//! A document is immutable once created: every field is validated before the value exists.
//!
//! ```
//! # use zmeta::array::{ArrayMetadataV2, ChunkKeySeparator, MemoryOrder};
//! # use zmeta::data_type::{DataType, NativeDType, Scalar};
//! let data_type = DataType::from_native(&"<f8".parse::<NativeDType>()?)?;
//! let metadata = ArrayMetadataV2::new(
//!     vec![100, 100],
//!     vec![10, 10],
//!     data_type,
//!     Some(Scalar::Float(f64::NAN)),
//!     MemoryOrder::C,
//!     ChunkKeySeparator::Slash,
//!     None,
//!     None,
//!     serde_json::Map::new(),
//! )?;
//! assert_eq!(metadata.to_dict()["fill_value"], "NaN");
//! assert_eq!(metadata.encode_chunk_key(&[3, 7]), "3/7");
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```

mod array_builder;
mod array_errors;
mod array_metadata_v2;
mod array_spec;

use std::str::FromStr;

pub use array_builder::ArrayMetadataV2Builder;
pub use array_errors::ArrayMetadataV2Error;
pub use array_metadata_v2::{ArrayMetadataV2, CodecInput};
pub use array_spec::{ArrayConfig, ArraySpec};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The name of the Zarr V2 array metadata document.
pub const ZARRAY_JSON: &str = ".zarray";

/// The name of the Zarr V2 user attributes document.
pub const ZATTRS_JSON: &str = ".zattrs";

/// An array shape.
pub type ArrayShape = Vec<u64>;

/// The memory layout of elements within a chunk.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
pub enum MemoryOrder {
    /// Row-major order. The last dimension varies fastest.
    #[default]
    #[display("C")]
    C,
    /// Column-major order. The first dimension varies fastest.
    #[display("F")]
    F,
}

/// An invalid memory order.
#[derive(Clone, Debug, Error)]
#[error("invalid memory order {_0:?}, expected \"C\" or \"F\"")]
pub struct MemoryOrderError(String);

impl FromStr for MemoryOrder {
    type Err = MemoryOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "C" => Ok(Self::C),
            "F" => Ok(Self::F),
            _ => Err(MemoryOrderError(s.to_string())),
        }
    }
}

/// The separator of chunk grid coordinates in chunk keys.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
pub enum ChunkKeySeparator {
    /// The `.` separator.
    #[default]
    #[serde(rename = ".")]
    #[display(".")]
    Dot,
    /// The `/` separator.
    #[serde(rename = "/")]
    #[display("/")]
    Slash,
}

/// An invalid chunk key separator.
#[derive(Clone, Debug, Error)]
#[error("invalid dimension separator {_0:?}, expected \".\" or \"/\"")]
pub struct ChunkKeySeparatorError(String);

impl ChunkKeySeparator {
    /// The separator as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dot => ".",
            Self::Slash => "/",
        }
    }
}

impl FromStr for ChunkKeySeparator {
    type Err = ChunkKeySeparatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "." => Ok(Self::Dot),
            "/" => Ok(Self::Slash),
            _ => Err(ChunkKeySeparatorError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_order() {
        assert_eq!("C".parse::<MemoryOrder>().unwrap(), MemoryOrder::C);
        assert_eq!("F".parse::<MemoryOrder>().unwrap(), MemoryOrder::F);
        assert!("c".parse::<MemoryOrder>().is_err());
        assert_eq!(serde_json::to_string(&MemoryOrder::F).unwrap(), r#""F""#);
        assert!(serde_json::from_str::<MemoryOrder>(r#""K""#).is_err());
    }

    #[test]
    fn chunk_key_separator() {
        assert_eq!(".".parse::<ChunkKeySeparator>().unwrap(), ChunkKeySeparator::Dot);
        assert_eq!("/".parse::<ChunkKeySeparator>().unwrap(), ChunkKeySeparator::Slash);
        assert_eq!(
            "-".parse::<ChunkKeySeparator>().unwrap_err().to_string(),
            r#"invalid dimension separator "-", expected "." or "/""#
        );
        assert_eq!(
            serde_json::from_str::<ChunkKeySeparator>(r#""/""#).unwrap(),
            ChunkKeySeparator::Slash
        );
        assert_eq!(ChunkKeySeparator::Slash.to_string(), "/");
    }
}
