//! The `bool` data type.

use serde_json::Value;
use zmeta_plugin::ZarrFormat;

use crate::{
    DataTypeKind, DataTypeSize, DataTypeTraits, DataTypeValidationError, DataTypeWrapper,
    NativeDType, Scalar, ScalarError, data_type::invalid_bytes,
};

/// The `bool` data type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BoolDataType;

impl BoolDataType {
    fn typed(value: &Scalar) -> Result<bool, ScalarError> {
        match value {
            Scalar::Bool(b) => Ok(*b),
            Scalar::Int(_) | Scalar::UInt(_) | Scalar::Float(_) => Ok(!value.is_zero()),
            _ => Err(ScalarError::new(Self::IDENTIFIER, value)),
        }
    }
}

impl DataTypeWrapper for BoolDataType {
    const IDENTIFIER: &'static str = "bool";

    fn from_native(native: &NativeDType) -> Result<Self, DataTypeValidationError> {
        if *native == NativeDType::Bool {
            Ok(Self)
        } else {
            Err(DataTypeValidationError::native(Self::IDENTIFIER, native))
        }
    }

    fn from_json(json: &Value, version: ZarrFormat) -> Result<Self, DataTypeValidationError> {
        match (version, json.as_str()) {
            (ZarrFormat::V2, Some("|b1")) | (ZarrFormat::V3, Some("bool")) => Ok(Self),
            _ => Err(DataTypeValidationError::json(Self::IDENTIFIER, json, version)),
        }
    }
}

impl DataTypeTraits for BoolDataType {
    fn identifier(&self) -> &'static str {
        Self::IDENTIFIER
    }

    fn name(&self, version: ZarrFormat) -> String {
        match version {
            ZarrFormat::V2 => "|b1".to_string(),
            ZarrFormat::V3 => Self::IDENTIFIER.to_string(),
        }
    }

    fn to_native(&self) -> NativeDType {
        NativeDType::Bool
    }

    fn to_json(&self, version: ZarrFormat) -> Value {
        Value::String(self.name(version))
    }

    fn kind(&self) -> DataTypeKind {
        DataTypeKind::Boolean
    }

    fn size(&self) -> DataTypeSize {
        DataTypeSize::Fixed(1)
    }

    fn default_value(&self) -> Scalar {
        Scalar::Bool(false)
    }

    fn cast_value(&self, value: &Scalar) -> Result<Scalar, ScalarError> {
        Self::typed(value).map(Scalar::Bool)
    }

    fn to_json_value(&self, value: &Scalar, _version: ZarrFormat) -> Result<Value, ScalarError> {
        Self::typed(value).map(Value::Bool)
    }

    fn from_json_value(&self, json: &Value, _version: ZarrFormat) -> Result<Scalar, ScalarError> {
        json.as_bool()
            .map(Scalar::Bool)
            .ok_or_else(|| ScalarError::new(Self::IDENTIFIER, json))
    }

    fn scalar_to_bytes(&self, value: &Scalar) -> Result<Vec<u8>, ScalarError> {
        Ok(vec![u8::from(Self::typed(value)?)])
    }

    fn scalar_from_bytes(&self, bytes: &[u8]) -> Result<Scalar, ScalarError> {
        match bytes {
            [b] => Ok(Scalar::Bool(*b != 0)),
            _ => Err(invalid_bytes(Self::IDENTIFIER, bytes)),
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
