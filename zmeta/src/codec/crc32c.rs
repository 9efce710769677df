//! The `crc32c` bytes to bytes codec.
//!
//! Appends a CRC32C checksum of the encoded bytes.
//!
//! ### Codec `id` Aliases
//! - `crc32c`
//!
//! ### Codec `configuration` Example - [`Crc32cCodecConfiguration`]:
//! ```rust
//! # let JSON = r#"
//! {}
//! # "#;
//! # use zmeta::codec::Crc32cCodecConfiguration;
//! # serde_json::from_str::<Crc32cCodecConfiguration>(JSON).unwrap();
//! ```

use derive_more::Display;
use serde::{Deserialize, Serialize};
use zmeta_plugin::PluginCreateError;

use super::{Codec, CodecMetadata, CodecTraits, typed_configuration};

pub(super) const IDENTIFIER: &str = "crc32c";

/// `crc32c` codec configuration parameters.
#[derive(Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Debug, Display, Default)]
#[serde(deny_unknown_fields)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct Crc32cCodecConfiguration {}

/// A `crc32c` codec.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Crc32cCodec;

impl CodecTraits for Crc32cCodec {
    fn identifier(&self) -> &'static str {
        IDENTIFIER
    }

    fn configuration(&self) -> CodecMetadata {
        CodecMetadata::with_configuration(IDENTIFIER, &Crc32cCodecConfiguration {})
    }
}

pub(super) fn create_codec_crc32c(metadata: &CodecMetadata) -> Result<Codec, PluginCreateError> {
    let Crc32cCodecConfiguration {} = typed_configuration(metadata)?;
    Ok(Codec::new(Crc32cCodec))
}
