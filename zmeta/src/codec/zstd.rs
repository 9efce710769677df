//! The `zstd` bytes to bytes codec.
//!
//! Applies [Zstandard](https://tools.ietf.org/html/rfc8878) compression.
//!
//! ### Codec `id` Aliases
//! - `zstd`
//!
//! ### Codec `configuration` Example - [`ZstdCodecConfiguration`]:
//! ```rust
//! # let JSON = r#"
//! {
//!     "level": 1,
//!     "checksum": false
//! }
//! # "#;
//! # use zmeta::codec::ZstdCodecConfiguration;
//! # serde_json::from_str::<ZstdCodecConfiguration>(JSON).unwrap();
//! ```

use derive_more::Display;
use serde::{Deserialize, Serialize};
use zmeta_plugin::{PluginConfigurationInvalidError, PluginCreateError};

use super::{Codec, CodecMetadata, CodecTraits, typed_configuration};

pub(super) const IDENTIFIER: &str = "zstd";

/// `zstd` codec configuration parameters.
#[derive(Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Debug, Display, Default)]
#[serde(deny_unknown_fields)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct ZstdCodecConfiguration {
    /// The compression level, from -131072 (fastest) to 22 (smallest). 0 selects the library default.
    #[serde(default)]
    pub level: i32,
    /// Whether to store a checksum of the uncompressed data.
    #[serde(default)]
    pub checksum: bool,
}

/// A `zstd` codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZstdCodec {
    configuration: ZstdCodecConfiguration,
}

impl ZstdCodec {
    /// Create a new `zstd` codec.
    ///
    /// # Errors
    /// Returns [`PluginCreateError`] if `level` is outside the supported range.
    pub fn new(level: i32, checksum: bool) -> Result<Self, PluginCreateError> {
        if (-131_072..=22).contains(&level) {
            Ok(Self {
                configuration: ZstdCodecConfiguration { level, checksum },
            })
        } else {
            Err(PluginConfigurationInvalidError::new(format!(
                "zstd compression level {level} must be between -131072 and 22"
            ))
            .into())
        }
    }

    /// Create a new `zstd` codec from configuration.
    ///
    /// # Errors
    /// Returns [`PluginCreateError`] if the configuration is invalid.
    pub fn new_with_configuration(
        configuration: &ZstdCodecConfiguration,
    ) -> Result<Self, PluginCreateError> {
        Self::new(configuration.level, configuration.checksum)
    }

    /// The compression level.
    #[must_use]
    pub const fn level(&self) -> i32 {
        self.configuration.level
    }

    /// Returns true if a checksum of the uncompressed data is stored.
    #[must_use]
    pub const fn checksum(&self) -> bool {
        self.configuration.checksum
    }
}

impl CodecTraits for ZstdCodec {
    fn identifier(&self) -> &'static str {
        IDENTIFIER
    }

    fn configuration(&self) -> CodecMetadata {
        CodecMetadata::with_configuration(IDENTIFIER, &self.configuration)
    }
}

pub(super) fn create_codec_zstd(metadata: &CodecMetadata) -> Result<Codec, PluginCreateError> {
    let configuration: ZstdCodecConfiguration = typed_configuration(metadata)?;
    Ok(Codec::new(ZstdCodec::new_with_configuration(&configuration)?))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn codec_zstd_configuration() {
        let configuration: ZstdCodecConfiguration =
            serde_json::from_str(r#"{"level": 5, "checksum": true}"#).unwrap();
        assert_eq!(configuration.level, 5);
        assert!(configuration.checksum);
        assert_eq!(
            serde_json::from_str::<ZstdCodecConfiguration>("{}").unwrap(),
            ZstdCodecConfiguration::default()
        );
        assert!(serde_json::from_str::<ZstdCodecConfiguration>(r#"{"clevel": 5}"#).is_err());
    }

    #[test]
    fn codec_zstd_level_out_of_range() {
        assert!(ZstdCodec::new(23, false).is_err());
        assert!(ZstdCodec::new(-131_073, false).is_err());
        assert!(ZstdCodec::new(-5, true).is_ok());
    }

    #[test]
    fn codec_zstd_metadata() {
        let codec = ZstdCodec::new(3, false).unwrap();
        assert_eq!(
            serde_json::to_value(codec.configuration()).unwrap(),
            json!({"id": "zstd", "level": 3, "checksum": false})
        );
    }
}
