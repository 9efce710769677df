//! The `numpy.fixed_length_ascii` data type.
//!
//! A null-padded byte string of a fixed length (`NumPy` `S` kind).
//! Values drop their trailing null bytes, so `b"ab\0\0"` and `b"ab"` are the same value.

use serde_json::{Value, json};
use zmeta_plugin::ZarrFormat;

use super::fixed_length_bytes::LengthBytesConfiguration;
use crate::{
    DataTypeKind, DataTypeSize, DataTypeTraits, DataTypeValidationError, DataTypeWrapper,
    NativeDType, Scalar, ScalarError,
    data_type::{configuration_from_json, invalid_bytes},
    json::{bytes_from_json, bytes_to_json},
};

/// The `numpy.fixed_length_ascii` data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedLengthAsciiDataType {
    length: usize,
}

fn trim_nulls(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
    &bytes[..end]
}

impl FixedLengthAsciiDataType {
    /// Create a new fixed length ASCII data type of `length` bytes.
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
        let bytes = match value {
            Scalar::Bytes(bytes) => trim_nulls(bytes),
            Scalar::String(string) if string.is_ascii() => trim_nulls(string.as_bytes()),
            _ => return Err(ScalarError::new(Self::IDENTIFIER, value)),
        };
        if bytes.len() <= self.length {
            Ok(bytes.to_vec())
        } else {
            Err(ScalarError::new(Self::IDENTIFIER, value))
        }
    }
}

impl DataTypeWrapper for FixedLengthAsciiDataType {
    const IDENTIFIER: &'static str = "numpy.fixed_length_ascii";

    fn from_native(native: &NativeDType) -> Result<Self, DataTypeValidationError> {
        match native {
            NativeDType::Bytes { length } => Ok(Self::new(*length)),
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

impl DataTypeTraits for FixedLengthAsciiDataType {
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
        NativeDType::Bytes {
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
        Scalar::Bytes(Vec::new())
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
        let mut bytes = self.typed(value)?;
        bytes.resize(self.length, 0);
        Ok(bytes)
    }

    fn scalar_from_bytes(&self, bytes: &[u8]) -> Result<Scalar, ScalarError> {
        if bytes.len() == self.length {
            Ok(Scalar::Bytes(trim_nulls(bytes).to_vec()))
        } else {
            Err(invalid_bytes(Self::IDENTIFIER, bytes))
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
