//! The `string` data type.
//!
//! A variable length UTF-8 string, stored natively as an object (`|O`).

use serde_json::Value;
use zmeta_plugin::ZarrFormat;

use crate::{
    DataTypeKind, DataTypeSize, DataTypeTraits, DataTypeValidationError, DataTypeWrapper,
    NativeDType, Scalar, ScalarError,
};

/// The `string` data type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct VariableLengthStringDataType;

impl DataTypeWrapper for VariableLengthStringDataType {
    const IDENTIFIER: &'static str = "string";

    fn from_native(native: &NativeDType) -> Result<Self, DataTypeValidationError> {
        if *native == NativeDType::Object {
            Ok(Self)
        } else {
            Err(DataTypeValidationError::native(Self::IDENTIFIER, native))
        }
    }

    fn from_json(json: &Value, version: ZarrFormat) -> Result<Self, DataTypeValidationError> {
        match (version, json.as_str()) {
            (ZarrFormat::V2, Some("|O")) | (ZarrFormat::V3, Some("string")) => Ok(Self),
            _ => Err(DataTypeValidationError::json(Self::IDENTIFIER, json, version)),
        }
    }
}

impl DataTypeTraits for VariableLengthStringDataType {
    fn identifier(&self) -> &'static str {
        Self::IDENTIFIER
    }

    fn name(&self, version: ZarrFormat) -> String {
        match version {
            ZarrFormat::V2 => "|O".to_string(),
            ZarrFormat::V3 => Self::IDENTIFIER.to_string(),
        }
    }

    fn to_native(&self) -> NativeDType {
        NativeDType::Object
    }

    fn to_json(&self, version: ZarrFormat) -> Value {
        Value::String(self.name(version))
    }

    fn kind(&self) -> DataTypeKind {
        DataTypeKind::Object
    }

    fn size(&self) -> DataTypeSize {
        DataTypeSize::Variable
    }

    fn default_value(&self) -> Scalar {
        Scalar::String(String::new())
    }

    /// Strings are kept as is, and any other value is converted to its string form.
    fn cast_value(&self, value: &Scalar) -> Result<Scalar, ScalarError> {
        Ok(match value {
            Scalar::String(_) => value.clone(),
            Scalar::Bytes(bytes) => Scalar::String(
                String::from_utf8(bytes.clone())
                    .map_err(|_| ScalarError::new(Self::IDENTIFIER, value))?,
            ),
            _ => Scalar::String(value.to_string()),
        })
    }

    fn to_json_value(&self, value: &Scalar, _version: ZarrFormat) -> Result<Value, ScalarError> {
        match self.cast_value(value)? {
            Scalar::String(string) => Ok(Value::String(string)),
            _ => Err(ScalarError::new(Self::IDENTIFIER, value)),
        }
    }

    fn from_json_value(&self, json: &Value, _version: ZarrFormat) -> Result<Scalar, ScalarError> {
        Ok(Scalar::String(match json {
            Value::String(string) => string.clone(),
            json => json.to_string(),
        }))
    }

    fn scalar_to_bytes(&self, value: &Scalar) -> Result<Vec<u8>, ScalarError> {
        Err(ScalarError::new(Self::IDENTIFIER, value))
    }

    fn scalar_from_bytes(&self, bytes: &[u8]) -> Result<Scalar, ScalarError> {
        Err(ScalarError::new(
            Self::IDENTIFIER,
            &format!("{} bytes of a variable length string", bytes.len()),
        ))
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
