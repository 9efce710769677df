//! The `blosc` bytes to bytes codec.
//!
//! A meta-compressor combining a shuffle filter with one of several compressors.
//!
//! ### Codec `id` Aliases
//! - `blosc`
//!
//! ### Codec `configuration` Example - [`BloscCodecConfiguration`]:
//! ```rust
//! # let JSON = r#"
//! {
//!     "cname": "lz4",
//!     "clevel": 5,
//!     "shuffle": 1,
//!     "blocksize": 0
//! }
//! # "#;
//! # use zmeta::codec::BloscCodecConfiguration;
//! # serde_json::from_str::<BloscCodecConfiguration>(JSON).unwrap();
//! ```

use derive_more::Display;
use serde::{Deserialize, Serialize};
use zmeta_plugin::{PluginConfigurationInvalidError, PluginCreateError};

use super::{Codec, CodecMetadata, CodecTraits, typed_configuration};

pub(super) const IDENTIFIER: &str = "blosc";

/// The compressor used by the `blosc` codec.
#[derive(Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Debug, Display, Default)]
#[serde(rename_all = "lowercase")]
pub enum BloscCompressor {
    /// [BloscLZ](https://github.com/Blosc/c-blosc/blob/master/blosc/blosclz.h).
    #[display("blosclz")]
    BloscLZ,
    /// [LZ4](http://fastcompression.blogspot.com/p/lz4.html).
    #[default]
    #[display("lz4")]
    LZ4,
    /// [LZ4HC](http://fastcompression.blogspot.com/p/lz4.html).
    #[display("lz4hc")]
    LZ4HC,
    /// [Snappy](https://code.google.com/p/snappy).
    #[display("snappy")]
    Snappy,
    /// [Zlib](http://www.zlib.net/).
    #[display("zlib")]
    Zlib,
    /// [Zstandard](http://www.zstd.net/).
    #[display("zstd")]
    Zstd,
}

/// The shuffle mode of the `blosc` codec, encoded as an integer.
#[derive(Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Debug, Display, Default)]
#[serde(try_from = "i8", into = "i8")]
pub enum BloscShuffleMode {
    /// Bit shuffling for single byte elements, byte shuffling otherwise (-1).
    #[display("-1")]
    AutoShuffle,
    /// No shuffling (0).
    #[display("0")]
    NoShuffle,
    /// Byte-wise shuffling (1).
    #[default]
    #[display("1")]
    Shuffle,
    /// Bit-wise shuffling (2).
    #[display("2")]
    BitShuffle,
}

impl TryFrom<i8> for BloscShuffleMode {
    type Error = String;

    fn try_from(shuffle: i8) -> Result<Self, Self::Error> {
        match shuffle {
            -1 => Ok(Self::AutoShuffle),
            0 => Ok(Self::NoShuffle),
            1 => Ok(Self::Shuffle),
            2 => Ok(Self::BitShuffle),
            _ => Err(format!("blosc shuffle mode {shuffle} must be one of -1, 0, 1, 2")),
        }
    }
}

impl From<BloscShuffleMode> for i8 {
    fn from(shuffle: BloscShuffleMode) -> Self {
        match shuffle {
            BloscShuffleMode::AutoShuffle => -1,
            BloscShuffleMode::NoShuffle => 0,
            BloscShuffleMode::Shuffle => 1,
            BloscShuffleMode::BitShuffle => 2,
        }
    }
}

const fn default_clevel() -> u8 {
    5
}

/// `blosc` codec configuration parameters.
#[derive(Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Debug, Display)]
#[serde(deny_unknown_fields)]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct BloscCodecConfiguration {
    /// The compressor.
    #[serde(default)]
    pub cname: BloscCompressor,
    /// The compression level, from 0 to 9.
    #[serde(default = "default_clevel")]
    pub clevel: u8,
    /// The shuffle mode.
    #[serde(default)]
    pub shuffle: BloscShuffleMode,
    /// The block size in bytes. 0 selects a block size automatically.
    #[serde(default)]
    pub blocksize: usize,
}

impl Default for BloscCodecConfiguration {
    fn default() -> Self {
        Self {
            cname: BloscCompressor::default(),
            clevel: default_clevel(),
            shuffle: BloscShuffleMode::default(),
            blocksize: 0,
        }
    }
}

/// A `blosc` codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BloscCodec {
    configuration: BloscCodecConfiguration,
}

impl BloscCodec {
    /// Create a new `blosc` codec.
    ///
    /// # Errors
    /// Returns [`PluginCreateError`] if `clevel` is not between 0 and 9.
    pub fn new(
        cname: BloscCompressor,
        clevel: u8,
        shuffle: BloscShuffleMode,
        blocksize: usize,
    ) -> Result<Self, PluginCreateError> {
        if clevel > 9 {
            return Err(PluginConfigurationInvalidError::new(format!(
                "blosc compression level {clevel} must be between 0 and 9"
            ))
            .into());
        }
        Ok(Self {
            configuration: BloscCodecConfiguration {
                cname,
                clevel,
                shuffle,
                blocksize,
            },
        })
    }

    /// Create a new `blosc` codec from configuration.
    ///
    /// # Errors
    /// Returns [`PluginCreateError`] if the configuration is invalid.
    pub fn new_with_configuration(
        configuration: &BloscCodecConfiguration,
    ) -> Result<Self, PluginCreateError> {
        Self::new(
            configuration.cname,
            configuration.clevel,
            configuration.shuffle,
            configuration.blocksize,
        )
    }

    /// The compressor.
    #[must_use]
    pub const fn cname(&self) -> BloscCompressor {
        self.configuration.cname
    }

    /// The compression level.
    #[must_use]
    pub const fn clevel(&self) -> u8 {
        self.configuration.clevel
    }

    /// The shuffle mode.
    #[must_use]
    pub const fn shuffle(&self) -> BloscShuffleMode {
        self.configuration.shuffle
    }

    /// The block size.
    #[must_use]
    pub const fn blocksize(&self) -> usize {
        self.configuration.blocksize
    }
}

impl CodecTraits for BloscCodec {
    fn identifier(&self) -> &'static str {
        IDENTIFIER
    }

    fn configuration(&self) -> CodecMetadata {
        CodecMetadata::with_configuration(IDENTIFIER, &self.configuration)
    }
}

pub(super) fn create_codec_blosc(metadata: &CodecMetadata) -> Result<Codec, PluginCreateError> {
    let configuration: BloscCodecConfiguration = typed_configuration(metadata)?;
    Ok(Codec::new(BloscCodec::new_with_configuration(&configuration)?))
}
