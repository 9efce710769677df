//! The plugin API for the `zmeta` crates.
//!
//! A [`Plugin`] creates concrete implementations of Zarr extension points (data types, codecs, buffers, codec pipelines) from inputs.
//!
//! Built-in plugins are inserted into a [`RuntimeRegistry`] when it is first created.
//! Third-party plugins are submitted at compile time with the [`inventory`](https://docs.rs/inventory/latest/inventory/) crate as *entry points*,
//! and merged into the matching registry by an [`EntryPointDiscovery`] the first time the registry is queried.
//!
//! ## Licence
//! `zmeta_plugin` is licensed under either of
//!  - the Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> or
//!  - the MIT license <http://opensource.org/licenses/MIT>, at your option.

use thiserror::Error;

mod entry_point;
pub use entry_point::EntryPointDiscovery;

mod plugin;
pub use plugin::Plugin;

mod runtime_registry;
pub use runtime_registry::{RuntimeRegistry, RuntimeRegistryHandle};

mod zarr_format;
pub use zarr_format::{ZarrFormat, ZarrFormatError};

/// An unsupported plugin error.
#[derive(Clone, Debug, Error)]
#[error("{plugin_type} {name} is not supported")]
pub struct PluginUnsupportedError {
    name: String,
    plugin_type: String,
}

impl PluginUnsupportedError {
    /// Create a new [`PluginUnsupportedError`].
    #[must_use]
    pub fn new(name: String, plugin_type: String) -> Self {
        Self { name, plugin_type }
    }

    /// The name of the unsupported plugin.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// An invalid plugin configuration error.
#[derive(Clone, Debug, Error)]
#[error("configuration is unsupported: {reason}")]
pub struct PluginConfigurationInvalidError {
    reason: String,
}

impl PluginConfigurationInvalidError {
    /// Create a new [`PluginConfigurationInvalidError`].
    #[must_use]
    pub fn new(reason: String) -> Self {
        Self { reason }
    }
}

/// A plugin creation error.
#[derive(Clone, Debug, Error)]
pub enum PluginCreateError {
    /// An unsupported plugin.
    #[error(transparent)]
    Unsupported(#[from] PluginUnsupportedError),
    /// Invalid configuration.
    #[error(transparent)]
    ConfigurationInvalid(#[from] PluginConfigurationInvalidError),
    /// Other
    #[error("{_0}")]
    Other(String),
}

impl From<&str> for PluginCreateError {
    fn from(err_string: &str) -> Self {
        Self::Other(err_string.to_string())
    }
}

impl From<String> for PluginCreateError {
    fn from(err_string: String) -> Self {
        Self::Other(err_string)
    }
}
