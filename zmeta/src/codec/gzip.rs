//! The `gzip` bytes to bytes codec.
//!
//! Applies [gzip](https://datatracker.ietf.org/doc/html/rfc1952) compression.
//!
//! ### Codec `id` Aliases
//! - `gzip`
//!
//! ### Codec `configuration` Example - [`GzipCodecConfiguration`]:
//! ```rust
//! # let JSON = r#"
//! {
//!     "level": 1
//! }
//! # "#;
//! # use zmeta::codec::GzipCodecConfiguration;
//! # serde_json::from_str::<GzipCodecConfiguration>(JSON).unwrap();
//! ```

use derive_more::Display;
use serde::{Deserialize, Serialize};
use zmeta_plugin::{PluginConfigurationInvalidError, PluginCreateError};

use super::{Codec, CodecMetadata, CodecTraits, typed_configuration};

pub(super) const IDENTIFIER: &str = "gzip";

/// `gzip` codec configuration parameters.
#[derive(Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Debug, Display)]
#[serde(deny_unknown_fields)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct GzipCodecConfiguration {
    /// The compression level, from 0 to 9.
    pub level: u32,
}

/// A `gzip` codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GzipCodec {
    level: u32,
}

impl GzipCodec {
    /// Create a new `gzip` codec.
    ///
    /// # Errors
    /// Returns [`PluginCreateError`] if `level` is not between 0 and 9.
    pub fn new(level: u32) -> Result<Self, PluginCreateError> {
        if level <= 9 {
            Ok(Self { level })
        } else {
            Err(PluginConfigurationInvalidError::new(format!(
                "gzip compression level {level} must be between 0 and 9"
            ))
            .into())
        }
    }

    /// Create a new `gzip` codec from configuration.
    ///
    /// # Errors
    /// Returns [`PluginCreateError`] if the configuration is invalid.
    pub fn new_with_configuration(
        configuration: &GzipCodecConfiguration,
    ) -> Result<Self, PluginCreateError> {
        Self::new(configuration.level)
    }

    /// The compression level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }
}

impl CodecTraits for GzipCodec {
    fn identifier(&self) -> &'static str {
        IDENTIFIER
    }

    fn configuration(&self) -> CodecMetadata {
        CodecMetadata::with_configuration(IDENTIFIER, &GzipCodecConfiguration { level: self.level })
    }
}

pub(super) fn create_codec_gzip(metadata: &CodecMetadata) -> Result<Codec, PluginCreateError> {
    let configuration: GzipCodecConfiguration = typed_configuration(metadata)?;
    Ok(Codec::new(GzipCodec::new_with_configuration(&configuration)?))
}
