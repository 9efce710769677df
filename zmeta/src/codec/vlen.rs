//! The `vlen-utf8` and `vlen-bytes` array to bytes codecs.
//!
//! Serialise variable length strings and byte strings as length-prefixed items.
//! These are the default filters of variable length string arrays in Zarr V2 and the default serialisers in Zarr V3.
//!
//! ### Codec `id` Aliases
//! - `vlen-utf8`
//! - `vlen-bytes`

use derive_more::Display;
use serde::{Deserialize, Serialize};
use zmeta_plugin::PluginCreateError;

use super::{Codec, CodecMetadata, CodecTraits, typed_configuration};

pub(super) const IDENTIFIER_UTF8: &str = "vlen-utf8";
pub(super) const IDENTIFIER_BYTES: &str = "vlen-bytes";

/// `vlen-utf8` and `vlen-bytes` codec configuration parameters.
#[derive(Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Debug, Display, Default)]
#[serde(deny_unknown_fields)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct VlenCodecConfiguration {}

/// A `vlen-utf8` codec.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VlenUtf8Codec;

/// A `vlen-bytes` codec.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VlenBytesCodec;

impl CodecTraits for VlenUtf8Codec {
    fn identifier(&self) -> &'static str {
        IDENTIFIER_UTF8
    }

    fn configuration(&self) -> CodecMetadata {
        CodecMetadata::with_configuration(IDENTIFIER_UTF8, &VlenCodecConfiguration {})
    }
}

impl CodecTraits for VlenBytesCodec {
    fn identifier(&self) -> &'static str {
        IDENTIFIER_BYTES
    }

    fn configuration(&self) -> CodecMetadata {
        CodecMetadata::with_configuration(IDENTIFIER_BYTES, &VlenCodecConfiguration {})
    }
}

pub(super) fn create_codec_vlen_utf8(metadata: &CodecMetadata) -> Result<Codec, PluginCreateError> {
    let VlenCodecConfiguration {} = typed_configuration(metadata)?;
    Ok(Codec::new(VlenUtf8Codec))
}

pub(super) fn create_codec_vlen_bytes(
    metadata: &CodecMetadata,
) -> Result<Codec, PluginCreateError> {
    let VlenCodecConfiguration {} = typed_configuration(metadata)?;
    Ok(Codec::new(VlenBytesCodec))
}
