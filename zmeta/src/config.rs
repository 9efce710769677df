//! `zmeta` global configuration options.
//!
//! The configuration is a tree of JSON values assembled from layers, in increasing precedence:
//!  1. the built-in defaults,
//!  2. a configuration file ([`Config::load_file`]),
//!  3. environment variables ([`Config::refresh`]),
//!  4. programmatic overrides ([`Config::set`]).
//!
//! The effective value of a key is its value in the highest layer that sets it.
//!
//! Keys are addressed with dotted paths such as `array.order`.
//! `-` and `_` are interchangeable in keys, so `json-indent` and `json_indent` name the same key.
//!
//! ## Environment variables
//! Variables starting with `ZARR_` are configuration variables.
//! The rest of the name is lower-cased and split into nested keys at `__`,
//! and the value is parsed as a literal:
//! ```text
//! ZARR_ARRAY__ORDER=F                      -> array.order = "F"
//! ZARR_ASYNC__CONCURRENCY=20               -> async.concurrency = 20
//! ZARR_ARRAY__WRITE_EMPTY_CHUNKS=True      -> array.write_empty_chunks = true
//! ZARR_CODECS__ZSTD=my_zstd                -> codecs.zstd = "my_zstd"
//! ```
//! A value is parsed as JSON, then as one of `True`, `False`, `None`, or a single-quoted string.
//! Anything else is kept as a string.
//!
//! ## Global configuration
//! The process-wide configuration is initialised from the defaults and the environment on first use.
//! Read it with [`global_config`] and change it with [`global_config_mut`]:
//! ```
//! # use zmeta::config::global_config_mut;
//! # use serde_json::json;
//! global_config_mut().set(&json!({"array.order": "F"}))?;
//! # global_config_mut().reset();
//! # Ok::<_, zmeta::config::ConfigError>(())
//! ```
//! A write takes effect all at once: readers observe the configuration before or after it, never in between.
//! Do not hold a [`global_config`] guard while calling [`global_config_mut`] on the same thread.

use std::{
    path::{Path, PathBuf},
    sync::{LazyLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use derive_more::Display;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use thiserror::Error;
use zmeta_data_type::{DataType, VariableLengthStringDataType};
use zmeta_plugin::{PluginConfigurationInvalidError, PluginCreateError, ZarrFormat};

use crate::codec::{CodecMetadata, builtin_codec_identifiers};

/// The prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "ZARR_";

/// The separator of nested keys in configuration environment variable names.
pub const ENV_NESTED_SEPARATOR: &str = "__";

/// A configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The key is not set in any layer.
    #[error("configuration key {_0} is not set")]
    NotFound(String),
    /// The value of a key has the wrong type.
    #[error("configuration value {value} of {path} is invalid: {reason}")]
    InvalidValue {
        /// The key path.
        path: String,
        /// The value.
        value: Value,
        /// Why the value is invalid.
        reason: String,
    },
    /// A configuration layer is not a JSON object.
    #[error("configuration must be a JSON object, got {_0}")]
    NotAnObject(Value),
    /// A configuration file could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        /// The file path.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
    /// A configuration file is not valid JSON.
    #[error("failed to parse configuration file {path}: {source}")]
    Parse {
        /// The file path.
        path: PathBuf,
        /// The underlying error.
        source: serde_json::Error,
    },
}

impl From<ConfigError> for PluginCreateError {
    fn from(err: ConfigError) -> Self {
        PluginConfigurationInvalidError::new(err.to_string()).into()
    }
}

/// A coarse data type category selecting default codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum DataTypeCategory {
    /// Any data type without a dedicated category.
    #[display("default")]
    Default,
    /// Variable length strings.
    #[display("variable-length-string")]
    VariableLengthString,
}

impl DataTypeCategory {
    /// The configuration key of the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::VariableLengthString => "variable-length-string",
        }
    }
}

/// Return the category of a data type.
#[must_use]
pub fn categorize_data_type(data_type: &DataType) -> DataTypeCategory {
    if data_type.is::<VariableLengthStringDataType>() {
        DataTypeCategory::VariableLengthString
    } else {
        DataTypeCategory::Default
    }
}

fn default_compressor_v2() -> Value {
    json!({"id": "zstd", "level": 0, "checksum": false})
}

fn default_compressors_v3() -> Value {
    json!([{"name": "zstd", "configuration": {"level": 0, "checksum": false}}])
}

fn defaults() -> Value {
    let mut codecs: Map<String, Value> = builtin_codec_identifiers()
        .map(|identifier| (identifier.to_string(), Value::from(identifier)))
        .collect();
    // `endian` is the name of the `bytes` codec in early drafts of Zarr V3.
    codecs.insert("endian".to_string(), Value::from("bytes"));
    // Named for external implementations, none is built in.
    codecs.insert("sharding_indexed".to_string(), Value::from("sharding_indexed"));
    codecs.insert("transpose".to_string(), Value::from("transpose"));
    json!({
        "default_zarr_format": 3,
        "array": {
            "order": "C",
            "write_empty_chunks": false,
            "v2_default_compressor": {
                "default": default_compressor_v2(),
                "variable-length-string": default_compressor_v2(),
            },
            "v2_default_filters": {
                "default": null,
                "variable-length-string": [{"id": "vlen-utf8"}],
            },
            "v3_default_filters": {
                "default": [],
                "variable-length-string": [],
            },
            "v3_default_serializer": {
                "default": {"name": "bytes", "configuration": {"endian": "little"}},
                "variable-length-string": {"name": "vlen-utf8"},
            },
            "v3_default_compressors": {
                "default": default_compressors_v3(),
                "variable-length-string": default_compressors_v3(),
            },
        },
        "async": {"concurrency": 10, "timeout": null},
        "threading": {"max_workers": null},
        "json_indent": 2,
        "codec_pipeline": {
            "path": "zmeta.pipeline.batched",
            "batch_size": 1,
        },
        "codecs": codecs,
        "buffer": "zmeta.buffer.cpu",
        "ndbuffer": "zmeta.ndbuffer.cpu",
    })
}

/// Returns true if two keys are equal with `-` and `_` treated as the same character.
fn same_key(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a.bytes().zip(b.bytes()).all(|(a, b)| {
            a == b || (matches!(a, b'-' | b'_') && matches!(b, b'-' | b'_'))
        })
}

fn lookup<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key)
        .or_else(|| map.iter().find(|(k, _)| same_key(k, key)).map(|(_, v)| v))
}

/// Merge `source` into `target`. Objects merge key by key, anything else replaces.
fn merge(target: &mut Value, source: &Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                let key = target
                    .keys()
                    .find(|k| same_key(k, key))
                    .cloned()
                    .unwrap_or_else(|| key.clone());
                let nested = value.is_object() && target.get(&key).is_some_and(Value::is_object);
                match target.get_mut(&key) {
                    Some(existing) if nested => merge(existing, value),
                    _ => {
                        target.insert(key, value.clone());
                    }
                }
            }
        }
        (target, source) => *target = source.clone(),
    }
}

/// Wrap `value` in one object per path segment.
fn nest<'a>(path: impl DoubleEndedIterator<Item = &'a str>, value: Value) -> Value {
    path.rev().fold(value, |value, key| {
        let mut map = Map::new();
        map.insert(key.to_string(), value);
        Value::Object(map)
    })
}

/// Expand dotted keys (`{"a.b": 1}`) into nested objects (`{"a": {"b": 1}}`).
fn expand_dotted(map: &Map<String, Value>) -> Value {
    let mut expanded = Value::Object(Map::new());
    for (key, value) in map {
        let value = match value {
            Value::Object(inner) => expand_dotted(inner),
            value => value.clone(),
        };
        merge(&mut expanded, &nest(key.split('.'), value));
    }
    expanded
}

/// Parse the text of an environment variable as a literal.
fn parse_literal(name: &str, text: &str) -> Value {
    if let Ok(value) = serde_json::from_str(text) {
        return value;
    }
    match text {
        "True" => Value::Bool(true),
        "False" => Value::Bool(false),
        "None" => Value::Null,
        _ => {
            if let Some(quoted) = text.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')) {
                Value::String(quoted.to_string())
            } else {
                log::debug!("environment variable {name} is not a literal, using it as a string");
                Value::String(text.to_string())
            }
        }
    }
}

/// The `zmeta` configuration.
///
/// See the [module documentation](self) for the layers and key addressing.
#[derive(Debug, Clone)]
pub struct Config {
    defaults: Value,
    file: Value,
    environment: Value,
    overrides: Value,
    merged: Value,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Create a configuration holding only the built-in defaults.
    #[must_use]
    pub fn new() -> Self {
        let defaults = defaults();
        Self {
            merged: defaults.clone(),
            defaults,
            file: Value::Object(Map::new()),
            environment: Value::Object(Map::new()),
            overrides: Value::Object(Map::new()),
        }
    }

    /// Create a configuration from the built-in defaults and the `ZARR_` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::new();
        config.refresh();
        config
    }

    fn update(&mut self) {
        let mut merged = self.defaults.clone();
        for layer in [&self.file, &self.environment, &self.overrides] {
            merge(&mut merged, layer);
        }
        self.merged = merged;
    }

    /// The effective configuration tree.
    #[must_use]
    pub fn tree(&self) -> &Value {
        &self.merged
    }

    /// Return the effective value of the dotted `path`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.get_in(path.split('.'))
    }

    /// Return the effective value at a sequence of keys.
    ///
    /// Unlike [`get`](Self::get), keys may contain dots.
    pub fn get_in<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Option<&Value> {
        keys.into_iter().try_fold(&self.merged, |value, key| match value {
            Value::Object(map) => lookup(map, key),
            _ => None,
        })
    }

    fn get_in_as<T: DeserializeOwned>(&self, keys: &[&str]) -> Result<T, ConfigError> {
        let path = keys.join(".");
        let value = self
            .get_in(keys.iter().copied())
            .ok_or_else(|| ConfigError::NotFound(path.clone()))?;
        T::deserialize(value).map_err(|err| ConfigError::InvalidValue {
            path,
            value: value.clone(),
            reason: err.to_string(),
        })
    }

    /// Return the effective value of the dotted `path` converted to `T`.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the key is not set or its value cannot be converted to `T`.
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<T, ConfigError> {
        self.get_in_as(&path.split('.').collect::<Vec<_>>())
    }

    /// Apply programmatic overrides.
    ///
    /// `overrides` is a JSON object of nested objects and/or dotted keys, for example
    /// `{"array": {"order": "F"}}` or `{"array.order": "F"}`.
    /// Overrides accumulate across calls until [`reset`](Self::reset).
    ///
    /// # Errors
    /// Returns [`ConfigError::NotAnObject`] if `overrides` is not a JSON object.
    /// The configuration is unchanged on error.
    pub fn set(&mut self, overrides: &Value) -> Result<&mut Self, ConfigError> {
        let Value::Object(overrides) = overrides else {
            return Err(ConfigError::NotAnObject(overrides.clone()));
        };
        self.apply_overrides(overrides);
        Ok(self)
    }

    fn apply_overrides(&mut self, overrides: &Map<String, Value>) {
        merge(&mut self.overrides, &expand_dotted(overrides));
        self.update();
    }

    /// Restore the built-in defaults, discarding the file, environment, and programmatic layers.
    ///
    /// Call [`refresh`](Self::refresh) to read the environment again.
    pub fn reset(&mut self) -> &mut Self {
        *self = Self::new();
        self
    }

    /// Read the `ZARR_` environment variables into the environment layer, replacing it.
    ///
    /// Variables with a name or value that is not valid unicode are ignored.
    pub fn refresh(&mut self) -> &mut Self {
        self.refresh_from(std::env::vars_os().filter_map(|(name, value)| {
            Some((name.into_string().ok()?, value.into_string().ok()?))
        }))
    }

    /// Read configuration variables from `vars` into the environment layer, replacing it.
    ///
    /// Variables without the `ZARR_` prefix are ignored.
    pub fn refresh_from(&mut self, vars: impl IntoIterator<Item = (String, String)>) -> &mut Self {
        let mut environment = Value::Object(Map::new());
        for (name, text) in vars {
            let Some(path) = name.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let path = path.to_lowercase();
            if path.split(ENV_NESTED_SEPARATOR).any(str::is_empty) {
                log::debug!("ignoring environment variable {name} with an empty key");
                continue;
            }
            let value = parse_literal(&name, &text);
            merge(&mut environment, &nest(path.split(ENV_NESTED_SEPARATOR).collect::<Vec<_>>().into_iter(), value));
        }
        self.environment = environment;
        self.update();
        self
    }

    /// Load a JSON configuration file into the file layer, replacing it.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the file cannot be read, is not valid JSON, or is not a JSON object.
    /// The configuration is unchanged on error.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<&mut Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let Value::Object(file) = value else {
            return Err(ConfigError::NotAnObject(value));
        };
        self.file = expand_dotted(&file);
        self.update();
        Ok(self)
    }

    /// Select the GPU buffer and ndbuffer implementations.
    ///
    /// Both identifiers change in one update.
    pub fn enable_gpu(&mut self) -> &mut Self {
        let mut overrides = Map::new();
        overrides.insert("buffer".to_string(), json!("zmeta.buffer.gpu"));
        overrides.insert("ndbuffer".to_string(), json!("zmeta.ndbuffer.gpu"));
        self.apply_overrides(&overrides);
        self
    }

    /// The default Zarr format of new arrays.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if `default_zarr_format` is missing or not 2 or 3.
    pub fn default_zarr_format(&self) -> Result<ZarrFormat, ConfigError> {
        self.get_in_as(&["default_zarr_format"])
    }

    /// The indentation of JSON metadata documents, or [`None`] for compact documents.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if `json_indent` is missing or not a non-negative integer or null.
    pub fn json_indent(&self) -> Result<Option<usize>, ConfigError> {
        self.get_in_as(&["json_indent"])
    }

    /// The registered name of the buffer implementation.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if `buffer` is missing or not a string.
    pub fn buffer(&self) -> Result<String, ConfigError> {
        self.get_in_as(&["buffer"])
    }

    /// The registered name of the ndbuffer implementation.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if `ndbuffer` is missing or not a string.
    pub fn ndbuffer(&self) -> Result<String, ConfigError> {
        self.get_in_as(&["ndbuffer"])
    }

    /// The registered name of the codec pipeline implementation.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if `codec_pipeline.path` is missing or not a string.
    pub fn codec_pipeline_path(&self) -> Result<String, ConfigError> {
        self.get_in_as(&["codec_pipeline", "path"])
    }

    /// The number of chunks a codec pipeline processes per batch.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if `codec_pipeline.batch_size` is missing or not a non-negative integer.
    pub fn codec_pipeline_batch_size(&self) -> Result<usize, ConfigError> {
        self.get_in_as(&["codec_pipeline", "batch_size"])
    }

    /// The registered name of the implementation serving the codec `id`, if configured.
    #[must_use]
    pub fn codec_implementation(&self, id: &str) -> Option<&str> {
        self.get_in(["codecs", id]).and_then(Value::as_str)
    }

    /// The default compressors of a data type category.
    ///
    /// Zarr V2 arrays have at most one compressor.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the default is missing or is not valid codec metadata.
    pub fn default_compressor(
        &self,
        category: DataTypeCategory,
        version: ZarrFormat,
    ) -> Result<Vec<CodecMetadata>, ConfigError> {
        match version {
            ZarrFormat::V2 => Ok(self
                .get_in_as::<Option<CodecMetadata>>(&[
                    "array",
                    "v2_default_compressor",
                    category.as_str(),
                ])?
                .into_iter()
                .collect()),
            ZarrFormat::V3 => {
                self.get_in_as(&["array", "v3_default_compressors", category.as_str()])
            }
        }
    }

    /// The default filters of a data type category.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the default is missing or is not valid codec metadata.
    pub fn default_filters(
        &self,
        category: DataTypeCategory,
        version: ZarrFormat,
    ) -> Result<Option<Vec<CodecMetadata>>, ConfigError> {
        let key = match version {
            ZarrFormat::V2 => "v2_default_filters",
            ZarrFormat::V3 => "v3_default_filters",
        };
        self.get_in_as(&["array", key, category.as_str()])
    }

    /// The default Zarr V3 serialiser of a data type category.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the default is missing or is not valid codec metadata.
    pub fn default_serializer(
        &self,
        category: DataTypeCategory,
    ) -> Result<CodecMetadata, ConfigError> {
        self.get_in_as(&["array", "v3_default_serializer", category.as_str()])
    }
}

static CONFIG: LazyLock<RwLock<Config>> = LazyLock::new(|| RwLock::new(Config::from_env()));

/// Returns a reference to the global `zmeta` configuration.
pub fn global_config() -> RwLockReadGuard<'static, Config> {
    CONFIG.read().unwrap_or_else(PoisonError::into_inner)
}

/// Returns a mutable reference to the global `zmeta` configuration.
pub fn global_config_mut() -> RwLockWriteGuard<'static, Config> {
    CONFIG.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zmeta_data_type::{ByteOrder, Int32DataType};

    use super::*;

    fn vars(vars: &[(&str, &str)]) -> Vec<(String, String)> {
        vars.iter()
            .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
            .collect()
    }

    #[test]
    fn config_defaults() {
        let config = Config::new();
        assert_eq!(config.get("array.order"), Some(&json!("C")));
        assert_eq!(config.get("array.write_empty_chunks"), Some(&json!(false)));
        assert_eq!(config.get("async.concurrency"), Some(&json!(10)));
        assert_eq!(config.get("async.timeout"), Some(&Value::Null));
        assert_eq!(config.get("threading.max_workers"), Some(&Value::Null));
        assert_eq!(config.default_zarr_format().unwrap(), ZarrFormat::V3);
        assert_eq!(config.json_indent().unwrap(), Some(2));
        assert_eq!(config.codec_pipeline_path().unwrap(), "zmeta.pipeline.batched");
        assert_eq!(config.codec_pipeline_batch_size().unwrap(), 1);
        assert_eq!(config.buffer().unwrap(), "zmeta.buffer.cpu");
        assert_eq!(config.ndbuffer().unwrap(), "zmeta.ndbuffer.cpu");
        assert_eq!(config.codec_implementation("vlen-utf8"), Some("vlen-utf8"));
        assert_eq!(config.codec_implementation("endian"), Some("bytes"));
        assert_eq!(config.codec_implementation("transpose"), Some("transpose"));
        assert_eq!(
            config.codec_implementation("sharding_indexed"),
            Some("sharding_indexed")
        );
        assert_eq!(config.codec_implementation("zfpy"), None);
        assert_eq!(config.get("array.missing"), None);
        assert!(matches!(
            config.get_as::<u64>("array.missing"),
            Err(ConfigError::NotFound(_))
        ));
        assert!(matches!(
            config.get_as::<u64>("array.order"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn config_dash_underscore_equivalence() {
        let mut config = Config::new();
        assert_eq!(config.get("json-indent"), Some(&json!(2)));
        assert_eq!(config.get("array.write-empty-chunks"), Some(&json!(false)));
        assert_eq!(
            config.get_in(["array", "v2_default_filters", "variable_length_string"]),
            Some(&json!([{"id": "vlen-utf8"}]))
        );

        config.set(&json!({"json-indent": 4})).unwrap();
        assert_eq!(config.json_indent().unwrap(), Some(4));
        let keys: Vec<_> = config.tree().as_object().unwrap().keys().collect();
        assert!(!keys.iter().any(|key| *key == "json-indent"));
    }

    #[test]
    fn config_set() {
        let mut config = Config::new();
        config
            .set(&json!({"array.order": "F", "async": {"concurrency": 4}}))
            .unwrap();
        assert_eq!(config.get("array.order"), Some(&json!("F")));
        assert_eq!(config.get("async.concurrency"), Some(&json!(4)));
        // Siblings of overridden keys are untouched.
        assert_eq!(config.get("array.write_empty_chunks"), Some(&json!(false)));
        assert_eq!(config.get("async.timeout"), Some(&Value::Null));

        // Overrides accumulate.
        config.set(&json!({"array": {"write_empty_chunks": true}})).unwrap();
        assert_eq!(config.get("array.order"), Some(&json!("F")));
        assert_eq!(config.get("array.write_empty_chunks"), Some(&json!(true)));

        let before = config.tree().clone();
        assert!(matches!(
            config.set(&json!(["array.order"])),
            Err(ConfigError::NotAnObject(_))
        ));
        assert_eq!(config.tree(), &before);
    }

    #[test]
    fn config_reset() {
        let mut config = Config::new();
        config.refresh_from(vars(&[("ZARR_JSON_INDENT", "0")]));
        config.set(&json!({"array.order": "F"})).unwrap();
        config.enable_gpu();
        config.reset();
        assert_eq!(config.tree(), Config::new().tree());
        assert_eq!(config.tree(), &defaults());
    }

    #[test]
    fn config_environment_literals() {
        let mut config = Config::new();
        config.refresh_from(vars(&[
            ("ZARR_ARRAY__ORDER", "F"),
            ("ZARR_ASYNC__CONCURRENCY", "20"),
            ("ZARR_ARRAY__WRITE_EMPTY_CHUNKS", "True"),
            ("ZARR_ASYNC__TIMEOUT", "1.5"),
            ("ZARR_THREADING__MAX_WORKERS", "None"),
            ("ZARR_CODECS__ZSTD", "'my_zstd'"),
            ("ZARR_CODEC_PIPELINE__PATH", "my.pipeline"),
            ("ZARR_ARRAY__V2_DEFAULT_FILTERS__DEFAULT", r#"[{"id": "crc32c"}]"#),
            ("ZARR_", "ignored"),
            ("ZARR_ARRAY__", "ignored"),
            ("OTHER_ARRAY__ORDER", "ignored"),
        ]));
        assert_eq!(config.get("array.order"), Some(&json!("F")));
        assert_eq!(config.get("async.concurrency"), Some(&json!(20)));
        assert_eq!(config.get("array.write_empty_chunks"), Some(&json!(true)));
        assert_eq!(config.get("async.timeout"), Some(&json!(1.5)));
        assert_eq!(config.get("threading.max_workers"), Some(&Value::Null));
        assert_eq!(config.codec_implementation("zstd"), Some("my_zstd"));
        assert_eq!(config.codec_pipeline_path().unwrap(), "my.pipeline");
        assert_eq!(
            config
                .default_filters(DataTypeCategory::Default, ZarrFormat::V2)
                .unwrap()
                .unwrap()[0]
                .id(),
            "crc32c"
        );
        assert_eq!(
            config.get("array.v2_default_filters.variable-length-string"),
            Some(&json!([{"id": "vlen-utf8"}]))
        );

        // Refreshing replaces the environment layer.
        config.refresh_from(vars(&[("ZARR_ASYNC__CONCURRENCY", "2")]));
        assert_eq!(config.get("async.concurrency"), Some(&json!(2)));
        assert_eq!(config.get("array.order"), Some(&json!("C")));
    }

    #[test]
    fn config_layer_precedence() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"array": {{"order": "F"}}, "async.concurrency": 4, "json_indent": 8}}"#
        )
        .unwrap();

        let mut config = Config::new();
        config.load_file(file.path()).unwrap();
        assert_eq!(config.get("array.order"), Some(&json!("F")));
        assert_eq!(config.get("async.concurrency"), Some(&json!(4)));

        config.refresh_from(vars(&[("ZARR_ASYNC__CONCURRENCY", "6")]));
        assert_eq!(config.get("async.concurrency"), Some(&json!(6)));
        assert_eq!(config.get("array.order"), Some(&json!("F")));

        config.set(&json!({"async.concurrency": 8, "array.order": "C"})).unwrap();
        assert_eq!(config.get("async.concurrency"), Some(&json!(8)));
        assert_eq!(config.get("array.order"), Some(&json!("C")));
        assert_eq!(config.json_indent().unwrap(), Some(8));

        // Lower layers still apply after a higher layer is replaced.
        config.refresh_from(Vec::new());
        assert_eq!(config.get("async.concurrency"), Some(&json!(8)));
    }

    #[test]
    fn config_load_file_invalid() {
        let mut config = Config::new();
        assert!(matches!(
            config.load_file("/nonexistent/zmeta.json"),
            Err(ConfigError::Io { .. })
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "array: {{order: F}}").unwrap();
        assert!(matches!(
            config.load_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2]").unwrap();
        assert!(matches!(
            config.load_file(file.path()),
            Err(ConfigError::NotAnObject(_))
        ));
        assert_eq!(config.tree(), Config::new().tree());
    }

    #[test]
    fn config_enable_gpu() {
        let mut config = Config::new();
        config.enable_gpu();
        assert_eq!(config.buffer().unwrap(), "zmeta.buffer.gpu");
        assert_eq!(config.ndbuffer().unwrap(), "zmeta.ndbuffer.gpu");
    }

    #[test]
    fn config_default_codecs() {
        let config = Config::new();
        let int32 = DataType::new(Int32DataType::new(ByteOrder::Little));
        let string = DataType::new(VariableLengthStringDataType);
        assert_eq!(categorize_data_type(&int32), DataTypeCategory::Default);
        assert_eq!(
            categorize_data_type(&string),
            DataTypeCategory::VariableLengthString
        );
        assert_eq!(
            DataTypeCategory::VariableLengthString.to_string(),
            "variable-length-string"
        );

        let compressor = config
            .default_compressor(DataTypeCategory::Default, ZarrFormat::V2)
            .unwrap();
        assert_eq!(
            serde_json::to_value(&compressor).unwrap(),
            json!([{"id": "zstd", "level": 0, "checksum": false}])
        );
        let compressors = config
            .default_compressor(DataTypeCategory::VariableLengthString, ZarrFormat::V3)
            .unwrap();
        assert_eq!(
            compressors[0].to_v3_json(),
            json!({"name": "zstd", "configuration": {"level": 0, "checksum": false}})
        );

        assert_eq!(
            config
                .default_filters(DataTypeCategory::Default, ZarrFormat::V2)
                .unwrap(),
            None
        );
        let filters = config
            .default_filters(DataTypeCategory::VariableLengthString, ZarrFormat::V2)
            .unwrap()
            .unwrap();
        assert_eq!(filters[0].id(), "vlen-utf8");
        assert_eq!(
            config
                .default_filters(DataTypeCategory::Default, ZarrFormat::V3)
                .unwrap(),
            Some(Vec::new())
        );

        assert_eq!(
            config
                .default_serializer(DataTypeCategory::Default)
                .unwrap()
                .to_v3_json(),
            json!({"name": "bytes", "configuration": {"endian": "little"}})
        );
        assert_eq!(
            config
                .default_serializer(DataTypeCategory::VariableLengthString)
                .unwrap()
                .id(),
            "vlen-utf8"
        );

        let mut config = Config::new();
        config
            .set(&json!({"array.v2_default_compressor.default": null}))
            .unwrap();
        assert!(
            config
                .default_compressor(DataTypeCategory::Default, ZarrFormat::V2)
                .unwrap()
                .is_empty()
        );
    }
}
