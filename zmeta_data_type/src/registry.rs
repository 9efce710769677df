//! The data type registry.
//!
//! A [`DataTypeRegistry`] maps identifiers to [`DataTypePlugin`]s and resolves native data types and data type metadata
//! to exactly one wrapper.
//!
//! The process-wide registry returned by [`data_type_registry`] is pre-populated with the built-in wrappers.
//! Data types defined in other crates are submitted as [`DataTypeEntryPoint`]s with [`inventory::submit!`]
//! and merged into the process-wide registry on first use.

use std::sync::{Arc, LazyLock};

use serde_json::Value;
use thiserror::Error;
use zmeta_plugin::{EntryPointDiscovery, RuntimeRegistry, RuntimeRegistryHandle, ZarrFormat};

use crate::{
    BoolDataType, Complex64DataType, Complex128DataType, DataType, DataTypeValidationError,
    DataTypeWrapper, FixedLengthAsciiDataType, FixedLengthBytesDataType, FixedLengthUtf32DataType,
    Float16DataType, Float32DataType, Float64DataType, Int8DataType, Int16DataType,
    Int32DataType, Int64DataType, NativeDType, NumpyDateTime64DataType, StructuredDataType,
    UInt8DataType, UInt16DataType, UInt32DataType, UInt64DataType, VariableLengthStringDataType,
};

/// A data type plugin.
///
/// Creates a [`DataType`] from a native data type or from data type metadata.
#[derive(Clone, Copy)]
pub struct DataTypePlugin {
    identifier: &'static str,
    from_native_fn: fn(&NativeDType, &DataTypeRegistry) -> Result<DataType, DataTypeValidationError>,
    from_json_fn:
        fn(&Value, ZarrFormat, &DataTypeRegistry) -> Result<DataType, DataTypeValidationError>,
}

fn from_native<T: DataTypeWrapper>(
    native: &NativeDType,
    registry: &DataTypeRegistry,
) -> Result<DataType, DataTypeValidationError> {
    T::from_native_with(native, registry).map(DataType::new)
}

fn from_json<T: DataTypeWrapper>(
    json: &Value,
    version: ZarrFormat,
    registry: &DataTypeRegistry,
) -> Result<DataType, DataTypeValidationError> {
    T::from_json_with(json, version, registry).map(DataType::new)
}

impl DataTypePlugin {
    /// Create a new plugin for the data type wrapper `T`.
    #[must_use]
    pub const fn new<T: DataTypeWrapper>() -> Self {
        Self {
            identifier: T::IDENTIFIER,
            from_native_fn: from_native::<T>,
            from_json_fn: from_json::<T>,
        }
    }

    /// The identifier of the data type.
    #[must_use]
    pub const fn identifier(&self) -> &'static str {
        self.identifier
    }

    /// Create the data type from a native data type.
    ///
    /// Nested data types (e.g. the fields of a structured data type) are resolved with `registry`.
    ///
    /// # Errors
    /// Returns [`DataTypeValidationError`] if the wrapper does not handle `native`.
    pub fn from_native(
        &self,
        native: &NativeDType,
        registry: &DataTypeRegistry,
    ) -> Result<DataType, DataTypeValidationError> {
        (self.from_native_fn)(native, registry)
    }

    /// Create the data type from data type metadata.
    ///
    /// Nested data types are resolved with `registry`.
    ///
    /// # Errors
    /// Returns [`DataTypeValidationError`] if the wrapper does not handle `json`.
    pub fn from_json(
        &self,
        json: &Value,
        version: ZarrFormat,
        registry: &DataTypeRegistry,
    ) -> Result<DataType, DataTypeValidationError> {
        (self.from_json_fn)(json, version, registry)
    }
}

impl core::fmt::Debug for DataTypePlugin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DataTypePlugin")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}

/// A data type entry point.
///
/// Submit with [`inventory::submit!`] to add a data type to the process-wide registry:
/// ```ignore
/// inventory::submit! {
///     zmeta_data_type::DataTypeEntryPoint::new(zmeta_data_type::DataTypePlugin::new::<MyDataType>())
/// }
/// ```
#[derive(derive_more::Deref)]
pub struct DataTypeEntryPoint(DataTypePlugin);

inventory::collect!(DataTypeEntryPoint);

impl DataTypeEntryPoint {
    /// The entry-point group of data types.
    pub const GROUP: &'static str = "zmeta.data_type";

    /// Create a new data type entry point.
    #[must_use]
    pub const fn new(plugin: DataTypePlugin) -> Self {
        Self(plugin)
    }
}

/// A data type not found error.
#[derive(Clone, Debug, Error)]
#[error("data type {_0} is not registered")]
pub struct DataTypeNotFoundError(String);

impl DataTypeNotFoundError {
    /// Create a new data type not found error.
    #[must_use]
    pub fn new(name: String) -> Self {
        Self(name)
    }

    /// The name that was looked up.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// A data type match error.
#[derive(Clone, Debug, Error)]
pub enum DataTypeMatchError {
    /// No registered wrapper handles the native data type.
    #[error("No data type wrapper found that matches dtype '{_0}'")]
    NoMatchNative(NativeDType),
    /// No registered wrapper handles the data type metadata.
    #[error("No data type wrapper found that matches zarr format {version} data type metadata {json}")]
    NoMatchJson {
        /// The data type metadata.
        json: Value,
        /// The Zarr format.
        version: ZarrFormat,
    },
    /// More than one registered wrapper handles the input.
    #[error("multiple data type wrappers match {input}: {candidates:?}")]
    Ambiguous {
        /// The input.
        input: String,
        /// The names of the matching wrappers.
        candidates: Vec<String>,
    },
}

/// A data type registry.
///
/// Registration overrides by name, and matching consults every registered wrapper.
#[derive(Debug, Default)]
pub struct DataTypeRegistry {
    plugins: RuntimeRegistry<DataTypePlugin>,
}

const BUILTIN_DATA_TYPES: [DataTypePlugin; 20] = [
    DataTypePlugin::new::<BoolDataType>(),
    DataTypePlugin::new::<Int8DataType>(),
    DataTypePlugin::new::<Int16DataType>(),
    DataTypePlugin::new::<Int32DataType>(),
    DataTypePlugin::new::<Int64DataType>(),
    DataTypePlugin::new::<UInt8DataType>(),
    DataTypePlugin::new::<UInt16DataType>(),
    DataTypePlugin::new::<UInt32DataType>(),
    DataTypePlugin::new::<UInt64DataType>(),
    DataTypePlugin::new::<Float16DataType>(),
    DataTypePlugin::new::<Float32DataType>(),
    DataTypePlugin::new::<Float64DataType>(),
    DataTypePlugin::new::<Complex64DataType>(),
    DataTypePlugin::new::<Complex128DataType>(),
    DataTypePlugin::new::<FixedLengthAsciiDataType>(),
    DataTypePlugin::new::<FixedLengthBytesDataType>(),
    DataTypePlugin::new::<FixedLengthUtf32DataType>(),
    DataTypePlugin::new::<VariableLengthStringDataType>(),
    DataTypePlugin::new::<StructuredDataType>(),
    DataTypePlugin::new::<NumpyDateTime64DataType>(),
];

impl DataTypeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in data types registered.
    #[must_use]
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        for plugin in BUILTIN_DATA_TYPES {
            registry.register(plugin.identifier(), plugin);
        }
        registry
    }

    /// Register `plugin` under `name`, replacing any plugin already registered under that name.
    pub fn register(
        &self,
        name: impl Into<String>,
        plugin: DataTypePlugin,
    ) -> RuntimeRegistryHandle<DataTypePlugin> {
        let name = name.into();
        if self.plugins.contains(&name) {
            log::debug!("data type {name} overridden by {}", plugin.identifier());
        }
        self.plugins.register(name, plugin)
    }

    /// Return the plugin registered under `name`.
    ///
    /// # Errors
    /// Returns [`DataTypeNotFoundError`] if no plugin is registered under `name`.
    pub fn get(&self, name: &str) -> Result<Arc<DataTypePlugin>, DataTypeNotFoundError> {
        self.plugins
            .get(name)
            .ok_or_else(|| DataTypeNotFoundError::new(name.to_string()))
    }

    /// Unregister the plugin registered under `name`. Returns `true` if it was registered.
    pub fn unregister(&self, name: &str) -> bool {
        self.plugins.unregister(name)
    }

    /// The registered names, in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.plugins.names()
    }

    fn match_unique(
        &self,
        input: impl core::fmt::Display,
        create: impl Fn(&DataTypePlugin) -> Option<DataType>,
    ) -> Result<Option<DataType>, DataTypeMatchError> {
        let mut matches: Vec<(String, DataType)> = self
            .plugins
            .snapshot()
            .iter()
            .filter_map(|(name, plugin)| create(plugin).map(|data_type| (name.clone(), data_type)))
            .collect();
        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop().map(|(_, data_type)| data_type)),
            _ => Err(DataTypeMatchError::Ambiguous {
                input: input.to_string(),
                candidates: matches.into_iter().map(|(name, _)| name).collect(),
            }),
        }
    }

    /// Resolve a native data type to the unique wrapper handling it.
    ///
    /// # Errors
    /// Returns [`DataTypeMatchError::NoMatchNative`] if no wrapper handles `native`,
    /// or [`DataTypeMatchError::Ambiguous`] if more than one does.
    pub fn match_dtype(&self, native: &NativeDType) -> Result<DataType, DataTypeMatchError> {
        self.match_unique(native, |plugin| plugin.from_native(native, self).ok())?
            .ok_or_else(|| DataTypeMatchError::NoMatchNative(native.clone()))
    }

    /// Resolve data type metadata to the unique wrapper handling it.
    ///
    /// # Errors
    /// Returns [`DataTypeMatchError::NoMatchJson`] if no wrapper handles `json`,
    /// or [`DataTypeMatchError::Ambiguous`] if more than one does.
    pub fn match_json(
        &self,
        json: &Value,
        version: ZarrFormat,
    ) -> Result<DataType, DataTypeMatchError> {
        self.match_unique(json, |plugin| plugin.from_json(json, version, self).ok())?
            .ok_or_else(|| DataTypeMatchError::NoMatchJson {
                json: json.clone(),
                version,
            })
    }
}

static DATA_TYPE_REGISTRY: LazyLock<DataTypeRegistry> =
    LazyLock::new(DataTypeRegistry::with_builtins);

static DATA_TYPE_DISCOVERY: EntryPointDiscovery<DataTypePlugin> =
    EntryPointDiscovery::new(DataTypeEntryPoint::GROUP);

/// The process-wide data type registry.
///
/// Data type entry points are merged into the registry on first access.
pub fn data_type_registry() -> &'static DataTypeRegistry {
    discover_data_types();
    &DATA_TYPE_REGISTRY
}

/// Merge the submitted [`DataTypeEntryPoint`]s into the process-wide registry.
///
/// Only the first call has an effect. Returns the number of data types registered by this call.
pub fn discover_data_types() -> usize {
    DATA_TYPE_DISCOVERY.discover(&DATA_TYPE_REGISTRY.plugins, || {
        inventory::iter::<DataTypeEntryPoint>
            .into_iter()
            .map(|entry_point| (entry_point.identifier().to_string(), **entry_point))
    })
}

/// Remove the discovered data types from the process-wide registry and re-arm discovery.
#[doc(hidden)]
pub fn clear_discovered_data_types() {
    DATA_TYPE_DISCOVERY.clear(&DATA_TYPE_REGISTRY.plugins);
}

/// Register a data type in the process-wide registry, replacing any data type already registered under `name`.
///
/// Returns a handle that can be used to unregister the data type with [`unregister_data_type`].
pub fn register_data_type(
    name: impl Into<String>,
    plugin: DataTypePlugin,
) -> RuntimeRegistryHandle<DataTypePlugin> {
    data_type_registry().register(name, plugin)
}

/// Unregister a data type from the process-wide registry by its handle.
///
/// Returns `true` if the data type was registered and has not been replaced since.
pub fn unregister_data_type(handle: &RuntimeRegistryHandle<DataTypePlugin>) -> bool {
    DATA_TYPE_REGISTRY.plugins.unregister_handle(handle)
}

/// Resolve a native data type with the process-wide registry.
///
/// # Errors
/// Returns [`DataTypeMatchError`] if no wrapper or more than one wrapper handles `native`.
pub fn get_data_type_from_native(native: &NativeDType) -> Result<DataType, DataTypeMatchError> {
    data_type_registry().match_dtype(native)
}

/// Resolve data type metadata with the process-wide registry.
///
/// # Errors
/// Returns [`DataTypeMatchError`] if no wrapper or more than one wrapper handles `json`.
pub fn get_data_type_from_json(
    json: &Value,
    version: ZarrFormat,
) -> Result<DataType, DataTypeMatchError> {
    data_type_registry().match_json(json, version)
}

impl DataType {
    /// Resolve a native data type with the process-wide registry.
    ///
    /// # Errors
    /// Returns [`DataTypeMatchError`] if no wrapper or more than one wrapper handles `native`.
    pub fn from_native(native: &NativeDType) -> Result<Self, DataTypeMatchError> {
        get_data_type_from_native(native)
    }

    /// Resolve data type metadata with the process-wide registry.
    ///
    /// # Errors
    /// Returns [`DataTypeMatchError`] if no wrapper or more than one wrapper handles `json`.
    pub fn from_json(json: &Value, version: ZarrFormat) -> Result<Self, DataTypeMatchError> {
        get_data_type_from_json(json, version)
    }
}
