use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

use derive_more::Deref;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use zmeta_plugin::ZarrFormat;

use crate::{DataTypeRegistry, NativeDType, Scalar};

mod boolean;
mod complex;
mod fixed_length_ascii;
mod fixed_length_bytes;
mod fixed_length_utf32;
mod float;
mod int;
mod macros;
mod numpy_datetime64;
mod string;
mod structured;

pub use boolean::BoolDataType;
pub use complex::{Complex64DataType, Complex128DataType};
pub use fixed_length_ascii::FixedLengthAsciiDataType;
pub use fixed_length_bytes::FixedLengthBytesDataType;
pub use fixed_length_utf32::FixedLengthUtf32DataType;
pub use float::{Float16DataType, Float32DataType, Float64DataType};
pub use int::{
    Int8DataType, Int16DataType, Int32DataType, Int64DataType, UInt8DataType, UInt16DataType,
    UInt32DataType, UInt64DataType,
};
pub use numpy_datetime64::NumpyDateTime64DataType;
pub use string::VariableLengthStringDataType;
pub use structured::StructuredDataType;

/// The size of a data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataTypeSize {
    /// Fixed size (in bytes).
    Fixed(usize),
    /// Variable sized.
    Variable,
}

/// The kind of a data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataTypeKind {
    /// A boolean.
    Boolean,
    /// A signed or unsigned integer.
    Integer,
    /// A floating point number.
    Float,
    /// A complex number.
    Complex,
    /// A fixed length byte string or opaque byte sequence.
    Bytes,
    /// A fixed length string.
    String,
    /// A structured record.
    Structured,
    /// A datetime.
    DateTime,
    /// A variable length object (e.g. a variable length string).
    Object,
}

/// A data type validation error.
///
/// The input is not handled by the data type wrapper.
#[derive(Clone, Debug, Error)]
pub enum DataTypeValidationError {
    /// Native data type mismatch.
    #[error("native data type {native} is not handled by data type {identifier}")]
    Native {
        /// The data type identifier.
        identifier: &'static str,
        /// The native data type.
        native: NativeDType,
    },
    /// JSON data type mismatch.
    #[error("zarr format {version} data type metadata {json} is not handled by data type {identifier}")]
    Json {
        /// The data type identifier.
        identifier: &'static str,
        /// The unrecognised data type metadata.
        json: Value,
        /// The Zarr format.
        version: ZarrFormat,
    },
}

impl DataTypeValidationError {
    /// Create a new native data type mismatch error.
    #[must_use]
    pub fn native(identifier: &'static str, native: &NativeDType) -> Self {
        Self::Native {
            identifier,
            native: native.clone(),
        }
    }

    /// Create a new JSON data type mismatch error.
    #[must_use]
    pub fn json(identifier: &'static str, json: &Value, version: ZarrFormat) -> Self {
        Self::Json {
            identifier,
            json: json.clone(),
            version,
        }
    }
}

/// A scalar value error.
///
/// The value is not representable in the data type.
#[derive(Clone, Debug, Error)]
#[error("{value} is not a valid value of data type {data_type}")]
pub struct ScalarError {
    data_type: String,
    value: String,
}

impl ScalarError {
    /// Create a new scalar value error.
    pub fn new(data_type: impl Into<String>, value: &impl core::fmt::Display) -> Self {
        Self {
            data_type: data_type.into(),
            value: value.to_string(),
        }
    }

    /// The data type the value was checked against.
    #[must_use]
    pub fn data_type(&self) -> &str {
        &self.data_type
    }
}

/// Parse the configuration of Zarr V3 data type metadata of the form `{"name": name, "configuration": {..}}`.
pub(crate) fn configuration_from_json<T: DeserializeOwned>(json: &Value, name: &str) -> Option<T> {
    let object = json.as_object()?;
    if object.len() != 2 || object.get("name")?.as_str()? != name {
        return None;
    }
    T::deserialize(object.get("configuration")?).ok()
}

pub(crate) fn invalid_bytes(data_type: &str, bytes: &[u8]) -> ScalarError {
    ScalarError::new(data_type, &format!("{} bytes", bytes.len()))
}

/// Traits for a data type wrapper.
///
/// A data type wrapper bridges a [`NativeDType`] and its Zarr V2 and V3 JSON forms,
/// and encodes [`Scalar`] values of the data type to and from JSON.
///
/// Implementations are immutable values.
/// Equality of [`DataType`]s is structural: the same wrapper type with the same native data type.
pub trait DataTypeTraits: Debug + Send + Sync + Any {
    /// The identifier of the data type (the name it is registered under).
    fn identifier(&self) -> &'static str;

    /// The name of the data type for the Zarr format `version`.
    ///
    /// This is the V2 type string or the V3 data type name.
    fn name(&self, version: ZarrFormat) -> String;

    /// The native data type.
    fn to_native(&self) -> NativeDType;

    /// The data type metadata for the Zarr format `version`.
    ///
    /// Zarr V3 data type metadata does not carry a byte order.
    /// The V3 metadata of a big-endian wrapper is that of its little-endian counterpart,
    /// so reading it back with [`DataTypeWrapper::from_json`] yields the little-endian wrapper.
    fn to_json(&self, version: ZarrFormat) -> Value;

    /// The kind of the data type.
    fn kind(&self) -> DataTypeKind;

    /// The size of the data type.
    fn size(&self) -> DataTypeSize;

    /// The default value: zero for numbers, empty for strings, a zero-filled record, or not-a-time.
    fn default_value(&self) -> Scalar;

    /// The value of an element with all bytes zero.
    fn zero_value(&self) -> Scalar {
        match self.size() {
            DataTypeSize::Fixed(size) => self
                .scalar_from_bytes(&vec![0; size])
                .unwrap_or_else(|_| self.default_value()),
            DataTypeSize::Variable => self.default_value(),
        }
    }

    /// Cast a value to the canonical scalar of this data type.
    ///
    /// # Errors
    /// Returns [`ScalarError`] if `value` is not representable in this data type.
    fn cast_value(&self, value: &Scalar) -> Result<Scalar, ScalarError>;

    /// Encode a value as JSON for the Zarr format `version`.
    ///
    /// # Errors
    /// Returns [`ScalarError`] if `value` is not representable in this data type.
    fn to_json_value(&self, value: &Scalar, version: ZarrFormat) -> Result<Value, ScalarError>;

    /// Decode a value from JSON for the Zarr format `version`.
    ///
    /// # Errors
    /// Returns [`ScalarError`] if `json` is not a valid encoding of a value of this data type.
    fn from_json_value(&self, json: &Value, version: ZarrFormat) -> Result<Scalar, ScalarError>;

    /// Encode a value as its packed element bytes.
    ///
    /// # Errors
    /// Returns [`ScalarError`] if `value` is not representable in this data type or the data type is variable sized.
    fn scalar_to_bytes(&self, value: &Scalar) -> Result<Vec<u8>, ScalarError>;

    /// Decode a value from its packed element bytes.
    ///
    /// # Errors
    /// Returns [`ScalarError`] if `bytes` has the wrong length or the data type is variable sized.
    fn scalar_from_bytes(&self, bytes: &[u8]) -> Result<Scalar, ScalarError>;

    /// Return this data type as [`Any`].
    fn as_any(&self) -> &dyn Any;
}

/// A data type wrapper that can be created from a native data type or JSON metadata.
///
/// Every wrapper registered with a [`DataTypeRegistry`](crate::DataTypeRegistry) implements this trait.
pub trait DataTypeWrapper: DataTypeTraits + Sized {
    /// The identifier of the data type, which is also its Zarr V3 name.
    const IDENTIFIER: &'static str;

    /// Create the data type from a native data type.
    ///
    /// # Errors
    /// Returns [`DataTypeValidationError`] if `native` is not exactly the native data type handled by this wrapper.
    fn from_native(native: &NativeDType) -> Result<Self, DataTypeValidationError>;

    /// Create the data type from data type metadata.
    ///
    /// # Errors
    /// Returns [`DataTypeValidationError`] if `json` is not data type metadata handled by this wrapper.
    fn from_json(json: &Value, version: ZarrFormat) -> Result<Self, DataTypeValidationError>;

    /// Create the data type from a native data type, resolving nested data types with `registry`.
    ///
    /// Defaults to [`DataTypeWrapper::from_native`].
    ///
    /// # Errors
    /// Returns [`DataTypeValidationError`] if `native` is not handled by this wrapper or a nested data type does not resolve.
    fn from_native_with(
        native: &NativeDType,
        _registry: &DataTypeRegistry,
    ) -> Result<Self, DataTypeValidationError> {
        Self::from_native(native)
    }

    /// Create the data type from data type metadata, resolving nested data types with `registry`.
    ///
    /// Defaults to [`DataTypeWrapper::from_json`].
    ///
    /// # Errors
    /// Returns [`DataTypeValidationError`] if `json` is not handled by this wrapper or a nested data type does not resolve.
    fn from_json_with(
        json: &Value,
        version: ZarrFormat,
        _registry: &DataTypeRegistry,
    ) -> Result<Self, DataTypeValidationError> {
        Self::from_json(json, version)
    }
}

/// A data type implementing [`DataTypeTraits`].
#[derive(Debug, Clone, Deref)]
pub struct DataType(Arc<dyn DataTypeTraits>);

impl DataType {
    /// Create a data type.
    pub fn new<T: DataTypeTraits>(data_type: T) -> Self {
        Self(Arc::new(data_type))
    }

    /// Downcast the data type to a concrete wrapper.
    #[must_use]
    pub fn downcast_ref<T: DataTypeTraits>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    /// Returns true if the data type is the wrapper `T`.
    #[must_use]
    pub fn is<T: DataTypeTraits>(&self) -> bool {
        self.0.as_any().is::<T>()
    }
}

impl<T: DataTypeTraits> From<Arc<T>> for DataType {
    fn from(data_type: Arc<T>) -> Self {
        Self(data_type)
    }
}

impl PartialEq for DataType {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_any().type_id() == other.0.as_any().type_id()
            && self.to_native() == other.to_native()
    }
}

impl Eq for DataType {}

impl core::fmt::Display for DataType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.to_json(ZarrFormat::V3))
    }
}
