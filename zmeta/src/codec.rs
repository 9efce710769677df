//! Codec descriptors and the codec resolver.
//!
//! A [`Codec`] is an instantiated compressor or filter.
//! At this layer a codec only describes its configuration; encoding and decoding chunks is the job of a codec pipeline.
//!
//! Codecs are created from [`CodecMetadata`] by a [`CodecPlugin`] looked up in the codec registry.
//! The configuration key `codecs.<id>` names the registered implementation serving each codec `id`,
//! so an alternative implementation can be selected without changing stored metadata.
//! Lookups fail closed: an `id` with no registered implementation is an error.
//!
//! Built-in codecs:
//!  - [`zstd`](ZstdCodec), [`gzip`](GzipCodec), [`blosc`](BloscCodec) compressors,
//!  - the [`crc32c`](Crc32cCodec) checksum,
//!  - the [`vlen-utf8`](VlenUtf8Codec) and [`vlen-bytes`](VlenBytesCodec) variable length serialisers,
//!  - the [`bytes`](BytesCodec) serialiser.
//!
//! Codecs defined in other crates are submitted as [`CodecEntryPoint`]s with [`inventory::submit!`].

mod blosc;
mod bytes;
mod crc32c;
mod gzip;
mod vlen;
mod zstd;

use std::{
    fmt::Debug,
    sync::{Arc, LazyLock},
};

pub use blosc::{BloscCodec, BloscCodecConfiguration, BloscCompressor, BloscShuffleMode};
pub use self::bytes::{BytesCodec, BytesCodecConfiguration, Endianness};
pub use crc32c::{Crc32cCodec, Crc32cCodecConfiguration};
use derive_more::{Deref, Display};
pub use gzip::{GzipCodec, GzipCodecConfiguration};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use thiserror::Error;
pub use vlen::{VlenBytesCodec, VlenCodecConfiguration, VlenUtf8Codec};
use zmeta_plugin::{
    EntryPointDiscovery, Plugin, PluginConfigurationInvalidError, PluginCreateError,
    RuntimeRegistry, RuntimeRegistryHandle,
};
pub use zstd::{ZstdCodec, ZstdCodecConfiguration};

use crate::{ExtensionNotFoundError, config::global_config};

/// Codec metadata.
///
/// Deserialises from the Zarr V2 form, where parameters sit next to the codec `id`:
/// ```json
/// {
///     "id": "zstd",
///     "level": 0,
///     "checksum": false
/// }
/// ```
/// or the Zarr V3 form, where parameters are nested in a `configuration`:
/// ```json
/// {
///     "name": "zstd",
///     "configuration": {
///         "level": 0,
///         "checksum": false
///     }
/// }
/// ```
/// Serialises to the Zarr V2 form. See [`CodecMetadata::to_v3_json`] for the Zarr V3 form.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Display)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
#[display("{}", serde_json::to_string(self).unwrap_or_default())]
pub struct CodecMetadata {
    id: String,
    configuration: Map<String, Value>,
}

/// Invalid codec metadata.
#[derive(Clone, Debug, Error)]
#[error("invalid codec metadata {_0}, expected an object with an `id` or a `name` and `configuration`")]
pub struct CodecMetadataError(String);

impl TryFrom<Map<String, Value>> for CodecMetadata {
    type Error = CodecMetadataError;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let invalid = |map: Map<String, Value>| CodecMetadataError(Value::Object(map).to_string());
        if let Some(Value::String(id)) = map.get("id").cloned() {
            let configuration = map.into_iter().filter(|(key, _)| key != "id").collect();
            return Ok(Self { id, configuration });
        }
        let Some(Value::String(name)) = map.get("name").cloned() else {
            return Err(invalid(map));
        };
        if map.keys().any(|key| key != "name" && key != "configuration") {
            return Err(invalid(map));
        }
        let configuration = match map.get("configuration").cloned() {
            None => Map::new(),
            Some(Value::Object(configuration)) => configuration,
            Some(_) => return Err(invalid(map)),
        };
        Ok(Self {
            id: name,
            configuration,
        })
    }
}

impl From<CodecMetadata> for Map<String, Value> {
    fn from(metadata: CodecMetadata) -> Self {
        let mut map = Map::with_capacity(metadata.configuration.len() + 1);
        map.insert("id".to_string(), Value::String(metadata.id));
        map.extend(metadata.configuration);
        map
    }
}

impl CodecMetadata {
    /// Create codec metadata from a codec `id` and its configuration parameters.
    #[must_use]
    pub fn new(id: impl Into<String>, configuration: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            configuration,
        }
    }

    /// Create codec metadata from a codec `id` and a serializable configuration.
    ///
    /// A configuration that does not serialise to a JSON object is treated as empty.
    #[must_use]
    pub fn with_configuration(id: impl Into<String>, configuration: &impl Serialize) -> Self {
        let configuration = match serde_json::to_value(configuration) {
            Ok(Value::Object(configuration)) => configuration,
            _ => Map::new(),
        };
        Self::new(id, configuration)
    }

    /// Return the codec `id`.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Return the configuration parameters, excluding the `id`.
    #[must_use]
    pub fn configuration(&self) -> &Map<String, Value> {
        &self.configuration
    }

    /// Mutate the configuration parameters.
    pub fn configuration_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.configuration
    }

    /// Try and convert the configuration to a specific serializable configuration.
    ///
    /// # Errors
    /// Returns a [`serde_json`] error if the configuration cannot be converted.
    pub fn to_typed_configuration<TConfiguration: DeserializeOwned>(
        &self,
    ) -> Result<TConfiguration, Arc<serde_json::Error>> {
        serde_json::from_value(Value::Object(self.configuration.clone())).map_err(Arc::new)
    }

    /// Render the metadata in the Zarr V3 `name`/`configuration` form.
    ///
    /// An empty configuration is omitted.
    #[must_use]
    pub fn to_v3_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("name".to_string(), Value::String(self.id.clone()));
        if !self.configuration.is_empty() {
            map.insert(
                "configuration".to_string(),
                Value::Object(self.configuration.clone()),
            );
        }
        Value::Object(map)
    }
}

/// Codec traits.
pub trait CodecTraits: Debug + Send + Sync {
    /// The codec `id`.
    fn identifier(&self) -> &'static str;

    /// The metadata of the codec, including every configuration parameter.
    fn configuration(&self) -> CodecMetadata;
}

/// A codec.
#[derive(Debug, Clone, Deref)]
pub struct Codec(Arc<dyn CodecTraits>);

impl Codec {
    /// Create a codec.
    pub fn new<T: CodecTraits + 'static>(codec: T) -> Self {
        Self(Arc::new(codec))
    }

    /// Create a codec from metadata.
    ///
    /// The implementation is the codec registered under the `codecs.<id>` configuration value,
    /// or under the `id` itself if the configuration has no entry for it.
    ///
    /// # Errors
    /// Returns [`PluginCreateError`] if no implementation is registered for the codec or its configuration is invalid.
    pub fn from_metadata(metadata: &CodecMetadata) -> Result<Self, PluginCreateError> {
        get_codec_plugin(metadata.id())?.create(metadata)
    }
}

impl PartialEq for Codec {
    fn eq(&self, other: &Self) -> bool {
        self.configuration() == other.configuration()
    }
}

impl Eq for Codec {}

/// A codec plugin.
pub type CodecPlugin = Plugin<Codec, CodecMetadata>;

/// A codec entry point.
///
/// Submit with [`inventory::submit!`] to add a codec to the codec registry:
/// ```ignore
/// inventory::submit! {
///     zmeta::codec::CodecEntryPoint::new(zmeta::codec::CodecPlugin::new("my_codec", create_my_codec))
/// }
/// ```
#[derive(Deref)]
pub struct CodecEntryPoint(CodecPlugin);

inventory::collect!(CodecEntryPoint);

impl CodecEntryPoint {
    /// The entry-point group of codecs.
    pub const GROUP: &'static str = "zmeta.codec";

    /// Create a new codec entry point.
    #[must_use]
    pub const fn new(plugin: CodecPlugin) -> Self {
        Self(plugin)
    }
}

static BUILTIN_CODECS: [CodecPlugin; 7] = [
    CodecPlugin::new(zstd::IDENTIFIER, zstd::create_codec_zstd),
    CodecPlugin::new(gzip::IDENTIFIER, gzip::create_codec_gzip),
    CodecPlugin::new(blosc::IDENTIFIER, blosc::create_codec_blosc),
    CodecPlugin::new(crc32c::IDENTIFIER, crc32c::create_codec_crc32c),
    CodecPlugin::new(vlen::IDENTIFIER_UTF8, vlen::create_codec_vlen_utf8),
    CodecPlugin::new(vlen::IDENTIFIER_BYTES, vlen::create_codec_vlen_bytes),
    CodecPlugin::new(bytes::IDENTIFIER, bytes::create_codec_bytes),
];

/// The identifiers of the built-in codecs.
pub(crate) fn builtin_codec_identifiers() -> impl Iterator<Item = &'static str> {
    BUILTIN_CODECS.iter().map(Plugin::identifier)
}

static CODEC_REGISTRY: LazyLock<RuntimeRegistry<CodecPlugin>> = LazyLock::new(|| {
    let registry = RuntimeRegistry::new();
    for plugin in &BUILTIN_CODECS {
        registry.register(plugin.identifier(), *plugin);
    }
    registry
});

static CODEC_DISCOVERY: EntryPointDiscovery<CodecPlugin> =
    EntryPointDiscovery::new(CodecEntryPoint::GROUP);

/// The process-wide codec registry.
///
/// Codec entry points are merged into the registry on first access.
pub fn codec_registry() -> &'static RuntimeRegistry<CodecPlugin> {
    discover_codecs();
    &CODEC_REGISTRY
}

/// Merge the submitted [`CodecEntryPoint`]s into the codec registry.
///
/// Only the first call has an effect. Returns the number of codecs registered by this call.
pub fn discover_codecs() -> usize {
    CODEC_DISCOVERY.discover(&CODEC_REGISTRY, || {
        inventory::iter::<CodecEntryPoint>
            .into_iter()
            .map(|entry_point| (entry_point.identifier().to_string(), **entry_point))
    })
}

/// Remove the discovered codecs from the codec registry and re-arm discovery.
#[doc(hidden)]
pub fn clear_discovered_codecs() {
    CODEC_DISCOVERY.clear(&CODEC_REGISTRY);
}

/// Register a codec under `name`, replacing any codec already registered under that name.
///
/// Returns a handle that can be used to unregister the codec with [`unregister_codec`].
pub fn register_codec(name: impl Into<String>, plugin: CodecPlugin) -> RuntimeRegistryHandle<CodecPlugin> {
    codec_registry().register(name, plugin)
}

/// Unregister a codec by its handle.
///
/// # Returns
/// `true` if the codec was found and removed, `false` otherwise.
pub fn unregister_codec(handle: &RuntimeRegistryHandle<CodecPlugin>) -> bool {
    codec_registry().unregister_handle(handle)
}

/// Return the codec plugin serving the codec `id`.
///
/// # Errors
/// Returns [`ExtensionNotFoundError`] if the implementation named for `id` is not registered.
pub fn get_codec_plugin(
    id: &str,
) -> Result<RuntimeRegistryHandle<CodecPlugin>, ExtensionNotFoundError> {
    let name = global_config()
        .codec_implementation(id)
        .map_or_else(|| id.to_string(), str::to_string);
    codec_registry()
        .get(&name)
        .ok_or_else(|| ExtensionNotFoundError::new("codec", name))
}

/// Convert codec metadata to a typed configuration, or fail with an invalid configuration error.
fn typed_configuration<TConfiguration: DeserializeOwned>(
    metadata: &CodecMetadata,
) -> Result<TConfiguration, PluginCreateError> {
    metadata
        .to_typed_configuration()
        .map_err(|_| PluginConfigurationInvalidError::new(metadata.to_string()).into())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn codec_metadata_forms() {
        let v2: CodecMetadata =
            serde_json::from_value(json!({"id": "blosc", "cname": "lz4", "clevel": 5})).unwrap();
        let v3: CodecMetadata = serde_json::from_value(
            json!({"name": "blosc", "configuration": {"cname": "lz4", "clevel": 5}}),
        )
        .unwrap();
        assert_eq!(v2, v3);
        assert_eq!(v2.id(), "blosc");
        assert_eq!(
            serde_json::to_value(&v3).unwrap(),
            json!({"id": "blosc", "cname": "lz4", "clevel": 5})
        );
        assert_eq!(
            v2.to_v3_json(),
            json!({"name": "blosc", "configuration": {"cname": "lz4", "clevel": 5}})
        );

        let bare: CodecMetadata = serde_json::from_value(json!({"name": "vlen-utf8"})).unwrap();
        assert!(bare.configuration().is_empty());
        assert_eq!(bare.to_v3_json(), json!({"name": "vlen-utf8"}));
    }

    #[test]
    fn codec_metadata_invalid() {
        for json in [
            json!({"cname": "lz4"}),
            json!({"id": 1}),
            json!({"name": "blosc", "configuration": 1}),
            json!({"name": "blosc", "must_understand": false}),
            json!(["zstd"]),
        ] {
            assert!(serde_json::from_value::<CodecMetadata>(json).is_err());
        }
    }

    #[test]
    fn codec_aliases() {
        let endian: CodecMetadata =
            serde_json::from_value(json!({"id": "endian", "endian": "big"})).unwrap();
        let codec = Codec::from_metadata(&endian).unwrap();
        assert_eq!(codec.identifier(), "bytes");
        assert_eq!(
            codec.configuration(),
            BytesCodec::new(Some(Endianness::Big)).configuration()
        );

        let transpose = CodecMetadata::new("transpose", Map::new());
        assert!(matches!(
            Codec::from_metadata(&transpose),
            Err(PluginCreateError::Unsupported(_))
        ));
    }

    #[test]
    fn builtin_codecs_are_unique() {
        let mut identifiers: Vec<_> = builtin_codec_identifiers().collect();
        identifiers.sort_unstable();
        identifiers.dedup();
        assert_eq!(identifiers.len(), BUILTIN_CODECS.len());
    }
}
