//! `zmeta` is a Rust library for the metadata layer of [Zarr](https://zarr.dev) arrays.
//!
//! It provides
//!  - versioned data type wrappers and the data type registry ([`data_type`]),
//!  - the Zarr V2 array metadata document ([`array::ArrayMetadataV2`]),
//!  - codec descriptors and the codec resolver ([`codec`]),
//!  - the buffer and codec pipeline extension points ([`buffer`], [`pipeline`]),
//!  - and the layered configuration store ([`config`]).
//!
//! Chunk encoding, storage, and array value computation are out of scope.
//!
//! ## Example
//! ```
//! # use zmeta::array::ArrayMetadataV2Builder;
//! # use zmeta::data_type::{DataType, NativeDType};
//! let data_type = DataType::from_native(&"<i4".parse::<NativeDType>()?)?;
//! let metadata = ArrayMetadataV2Builder::new(vec![10, 10], vec![5, 5], data_type)
//!     .compressor(None)
//!     .build()?;
//! assert_eq!(metadata.encode_chunk_key(&[1, 2]), "1.2");
//! assert_eq!(metadata.to_dict()["dtype"], "<i4");
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Extensions
//! Data types, codecs, buffers, and codec pipelines are extension points.
//! Each is resolved by name through a registry populated with the built-in implementations,
//! and extended with implementations submitted from other crates with [`inventory::submit!`].
//! Submitted implementations are merged into the registries on first use, or eagerly with [`discover_extensions`].
//!
//! ## Licence
//! `zmeta` is licensed under either of
//!  - the Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> or
//!  - the MIT license <http://opensource.org/licenses/MIT>, at your option.

pub mod array;
pub mod buffer;
pub mod codec;
pub mod config;
pub mod pipeline;

pub use zmeta_data_type as data_type;
pub use zmeta_plugin as plugin;

use thiserror::Error;
use zmeta_plugin::{PluginCreateError, PluginUnsupportedError};

/// An extension is not registered under the requested name.
#[derive(Clone, Debug, Error)]
#[error("no {extension_point} is registered under {name}")]
pub struct ExtensionNotFoundError {
    extension_point: &'static str,
    name: String,
}

impl ExtensionNotFoundError {
    /// Create a new [`ExtensionNotFoundError`].
    #[must_use]
    pub fn new(extension_point: &'static str, name: impl Into<String>) -> Self {
        Self {
            extension_point,
            name: name.into(),
        }
    }

    /// The extension point (e.g. `codec`).
    #[must_use]
    pub const fn extension_point(&self) -> &'static str {
        self.extension_point
    }

    /// The requested name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl From<ExtensionNotFoundError> for PluginCreateError {
    fn from(err: ExtensionNotFoundError) -> Self {
        Self::Unsupported(PluginUnsupportedError::new(
            err.name,
            err.extension_point.to_string(),
        ))
    }
}

/// Merge every submitted data type, codec, buffer, and codec pipeline entry point into its registry.
///
/// Discovery runs once per extension point, so repeated calls register nothing new.
/// Returns the number of implementations registered by this call.
pub fn discover_extensions() -> usize {
    let count = data_type::discover_data_types()
        + codec::discover_codecs()
        + buffer::discover_buffers()
        + pipeline::discover_pipelines();
    log::debug!("discovered {count} extensions");
    count
}
