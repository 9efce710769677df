//! The `bytes` array to bytes codec.
//!
//! Serialises fixed size elements in a given byte order. The default serialiser in Zarr V3.
//!
//! ### Codec `id` Aliases
//! - `bytes`
//!
//! ### Codec `configuration` Example - [`BytesCodecConfiguration`]:
//! ```rust
//! # let JSON = r#"
//! {
//!     "endian": "little"
//! }
//! # "#;
//! # use zmeta::codec::BytesCodecConfiguration;
//! # serde_json::from_str::<BytesCodecConfiguration>(JSON).unwrap();
//! ```

use derive_more::Display;
use serde::{Deserialize, Serialize};
use zmeta_plugin::PluginCreateError;

use super::{Codec, CodecMetadata, CodecTraits, typed_configuration};

pub(super) const IDENTIFIER: &str = "bytes";

/// The byte order of serialised elements.
#[derive(Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Debug, Display)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    /// Little endian.
    #[display("little")]
    Little,
    /// Big endian.
    #[display("big")]
    Big,
}

/// `bytes` codec configuration parameters.
#[derive(Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Debug, Display, Default)]
#[serde(deny_unknown_fields)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct BytesCodecConfiguration {
    /// The byte order. Only optional for single byte elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endian: Option<Endianness>,
}

/// A `bytes` codec.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BytesCodec {
    endian: Option<Endianness>,
}

impl BytesCodec {
    /// Create a new `bytes` codec.
    #[must_use]
    pub const fn new(endian: Option<Endianness>) -> Self {
        Self { endian }
    }

    /// Create a new `bytes` codec that serialises little endian elements.
    #[must_use]
    pub const fn little() -> Self {
        Self::new(Some(Endianness::Little))
    }

    /// The byte order.
    #[must_use]
    pub const fn endian(&self) -> Option<Endianness> {
        self.endian
    }
}

impl CodecTraits for BytesCodec {
    fn identifier(&self) -> &'static str {
        IDENTIFIER
    }

    fn configuration(&self) -> CodecMetadata {
        CodecMetadata::with_configuration(
            IDENTIFIER,
            &BytesCodecConfiguration {
                endian: self.endian,
            },
        )
    }
}

pub(super) fn create_codec_bytes(metadata: &CodecMetadata) -> Result<Codec, PluginCreateError> {
    let configuration: BytesCodecConfiguration = typed_configuration(metadata)?;
    Ok(Codec::new(BytesCodec::new(configuration.endian)))
}
