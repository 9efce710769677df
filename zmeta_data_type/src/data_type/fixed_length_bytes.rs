//! The `fixed_length_bytes` data type.
//!
//! An opaque byte sequence of a fixed length (`NumPy` `V` kind).
//! Values are encoded in JSON as base64 in both Zarr formats.

use serde::Deserialize;
use serde_json::{Value, json};
use zmeta_plugin::ZarrFormat;

use crate::{
    DataTypeKind, DataTypeSize, DataTypeTraits, DataTypeValidationError, DataTypeWrapper,
    NativeDType, Scalar, ScalarError,
    data_type::{configuration_from_json, invalid_bytes},
    json::{bytes_from_json, bytes_to_json},
};

/// The configuration of a data type with a length in bytes.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct LengthBytesConfiguration {
    pub(super) length_bytes: usize,
}

/// The `fixed_length_bytes` data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedLengthBytesDataType {
    length: usize,
}

impl FixedLengthBytesDataType {
    /// Create a new fixed length bytes data type of `length` bytes.
    #[must_use]
    pub const fn new(length: usize) -> Self {
        Self { length }
    }

    /// The length in bytes.
    #[must_use]
    pub const fn length(&self) -> usize {
        self.length
    }

    fn typed(&self, value: &Scalar) -> Result<Vec<u8>, ScalarError> {
        match value {
            Scalar::Bytes(bytes) if bytes.len() <= self.length => {
                let mut bytes = bytes.clone();
                bytes.resize(self.length, 0);
                Ok(bytes)
            }
            _ => Err(ScalarError::new(Self::IDENTIFIER, value)),
        }
    }
}

impl DataTypeWrapper for FixedLengthBytesDataType {
    const IDENTIFIER: &'static str = "fixed_length_bytes";

    fn from_native(native: &NativeDType) -> Result<Self, DataTypeValidationError> {
        match native {
            NativeDType::Void { length } => Ok(Self::new(*length)),
            _ => Err(DataTypeValidationError::native(Self::IDENTIFIER, native)),
        }
    }

    fn from_json(json: &Value, version: ZarrFormat) -> Result<Self, DataTypeValidationError> {
        let err = || DataTypeValidationError::json(Self::IDENTIFIER, json, version);
        match version {
            ZarrFormat::V2 => {
                let native = json
                    .as_str()
                    .and_then(|typestr| typestr.parse::<NativeDType>().ok())
                    .ok_or_else(err)?;
                Self::from_native(&native).map_err(|_| err())
            }
            ZarrFormat::V3 => {
                configuration_from_json::<LengthBytesConfiguration>(json, Self::IDENTIFIER)
                    .map(|configuration| Self::new(configuration.length_bytes))
                    .ok_or_else(err)
            }
        }
    }
}

impl DataTypeTraits for FixedLengthBytesDataType {
    fn identifier(&self) -> &'static str {
        Self::IDENTIFIER
    }

    fn name(&self, version: ZarrFormat) -> String {
        match version {
            ZarrFormat::V2 => self.to_native().typestr(),
            ZarrFormat::V3 => Self::IDENTIFIER.to_string(),
        }
    }

    fn to_native(&self) -> NativeDType {
        NativeDType::Void {
            length: self.length,
        }
    }

    fn to_json(&self, version: ZarrFormat) -> Value {
        match version {
            ZarrFormat::V2 => Value::String(self.name(version)),
            ZarrFormat::V3 => json!({
                "name": Self::IDENTIFIER,
                "configuration": {"length_bytes": self.length},
            }),
        }
    }

    fn kind(&self) -> DataTypeKind {
        DataTypeKind::Bytes
    }

    fn size(&self) -> DataTypeSize {
        DataTypeSize::Fixed(self.length)
    }

    fn default_value(&self) -> Scalar {
        Scalar::Bytes(vec![0; self.length])
    }

    fn cast_value(&self, value: &Scalar) -> Result<Scalar, ScalarError> {
        self.typed(value).map(Scalar::Bytes)
    }

    fn to_json_value(&self, value: &Scalar, _version: ZarrFormat) -> Result<Value, ScalarError> {
        Ok(bytes_to_json(&self.typed(value)?))
    }

    fn from_json_value(&self, json: &Value, _version: ZarrFormat) -> Result<Scalar, ScalarError> {
        let bytes = bytes_from_json(json).ok_or_else(|| ScalarError::new(Self::IDENTIFIER, json))?;
        self.cast_value(&Scalar::Bytes(bytes))
            .map_err(|_| ScalarError::new(Self::IDENTIFIER, json))
    }

    fn scalar_to_bytes(&self, value: &Scalar) -> Result<Vec<u8>, ScalarError> {
        self.typed(value)
    }

    fn scalar_from_bytes(&self, bytes: &[u8]) -> Result<Scalar, ScalarError> {
        if bytes.len() == self.length {
            Ok(Scalar::Bytes(bytes.to_vec()))
        } else {
            Err(invalid_bytes(Self::IDENTIFIER, bytes))
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
