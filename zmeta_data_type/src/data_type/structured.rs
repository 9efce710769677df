//! The `structured` data type.
//!
//! A record of named fields, each with its own data type.
//! Field data types are resolved through the registry matching the record,
//! or the process-wide registry when the wrapper is created directly.

use serde::Deserialize;
use serde_json::{Map, Value, json};
use zmeta_plugin::ZarrFormat;

use crate::{
    DataType, DataTypeKind, DataTypeRegistry, DataTypeSize, DataTypeTraits,
    DataTypeValidationError, DataTypeWrapper, NativeDType, Scalar, ScalarError,
    data_type::{configuration_from_json, invalid_bytes},
    data_type_registry,
    json::bytes_from_json,
};

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StructuredConfiguration {
    fields: Vec<(String, Value)>,
}

/// The `structured` data type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredDataType {
    fields: Vec<(String, DataType)>,
}

impl StructuredDataType {
    /// Create a new structured data type from its fields, in declaration order.
    #[must_use]
    pub fn new(fields: Vec<(String, DataType)>) -> Self {
        Self { fields }
    }

    /// The fields of the data type.
    #[must_use]
    pub fn fields(&self) -> &[(String, DataType)] {
        &self.fields
    }

    /// The size in bytes of each field, or [`None`] if a field is variable sized.
    fn field_sizes(&self) -> Option<Vec<usize>> {
        self.fields
            .iter()
            .map(|(_, field)| match field.size() {
                DataTypeSize::Fixed(size) => Some(size),
                DataTypeSize::Variable => None,
            })
            .collect()
    }

    fn cast_fields<'a>(
        &self,
        values: impl ExactSizeIterator<Item = &'a Scalar>,
    ) -> Result<Scalar, ScalarError> {
        if values.len() != self.fields.len() {
            return Err(ScalarError::new(
                Self::IDENTIFIER,
                &format!("a record of {} fields", values.len()),
            ));
        }
        self.fields
            .iter()
            .zip(values)
            .map(|((name, field), value)| Ok((name.clone(), field.cast_value(value)?)))
            .collect::<Result<Vec<_>, ScalarError>>()
            .map(Scalar::Struct)
    }

    fn typed<'a>(&self, value: &'a Scalar) -> Result<Vec<(&'a str, &'a Scalar)>, ScalarError> {
        match value {
            Scalar::Struct(values)
                if values.len() == self.fields.len()
                    && values
                        .iter()
                        .zip(&self.fields)
                        .all(|((name, _), (field_name, _))| name == field_name) =>
            {
                Ok(values
                    .iter()
                    .map(|(name, value)| (name.as_str(), value))
                    .collect())
            }
            _ => Err(ScalarError::new(Self::IDENTIFIER, value)),
        }
    }
}

impl DataTypeWrapper for StructuredDataType {
    const IDENTIFIER: &'static str = "structured";

    fn from_native(native: &NativeDType) -> Result<Self, DataTypeValidationError> {
        Self::from_native_with(native, data_type_registry())
    }

    fn from_json(json: &Value, version: ZarrFormat) -> Result<Self, DataTypeValidationError> {
        Self::from_json_with(json, version, data_type_registry())
    }

    fn from_native_with(
        native: &NativeDType,
        registry: &DataTypeRegistry,
    ) -> Result<Self, DataTypeValidationError> {
        let NativeDType::Structured(fields) = native else {
            return Err(DataTypeValidationError::native(Self::IDENTIFIER, native));
        };
        let fields = fields
            .iter()
            .map(|(name, field)| {
                registry
                    .match_dtype(field)
                    .map(|field| (name.clone(), field))
                    .map_err(|_| DataTypeValidationError::native(Self::IDENTIFIER, native))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(fields))
    }

    fn from_json_with(
        json: &Value,
        version: ZarrFormat,
        registry: &DataTypeRegistry,
    ) -> Result<Self, DataTypeValidationError> {
        let err = || DataTypeValidationError::json(Self::IDENTIFIER, json, version);
        match version {
            ZarrFormat::V2 => {
                if !json.is_array() {
                    return Err(err());
                }
                let native = NativeDType::from_json(json).map_err(|_| err())?;
                Self::from_native_with(&native, registry).map_err(|_| err())
            }
            ZarrFormat::V3 => {
                let configuration =
                    configuration_from_json::<StructuredConfiguration>(json, Self::IDENTIFIER)
                        .ok_or_else(err)?;
                if configuration.fields.is_empty() {
                    return Err(err());
                }
                let fields = configuration
                    .fields
                    .into_iter()
                    .map(|(name, field)| {
                        registry
                            .match_json(&field, ZarrFormat::V3)
                            .map(|field| (name, field))
                            .map_err(|_| err())
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::new(fields))
            }
        }
    }
}

impl DataTypeTraits for StructuredDataType {
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
        NativeDType::Structured(
            self.fields
                .iter()
                .map(|(name, field)| (name.clone(), field.to_native()))
                .collect(),
        )
    }

    fn to_json(&self, version: ZarrFormat) -> Value {
        match version {
            ZarrFormat::V2 => self.to_native().to_json(),
            ZarrFormat::V3 => {
                let fields: Vec<Value> = self
                    .fields
                    .iter()
                    .map(|(name, field)| json!([name, field.to_json(ZarrFormat::V3)]))
                    .collect();
                json!({
                    "name": Self::IDENTIFIER,
                    "configuration": {"fields": fields},
                })
            }
        }
    }

    fn kind(&self) -> DataTypeKind {
        DataTypeKind::Structured
    }

    fn size(&self) -> DataTypeSize {
        self.field_sizes()
            .map_or(DataTypeSize::Variable, |sizes| {
                DataTypeSize::Fixed(sizes.into_iter().sum())
            })
    }

    fn default_value(&self) -> Scalar {
        Scalar::Struct(
            self.fields
                .iter()
                .map(|(name, field)| (name.clone(), field.zero_value()))
                .collect(),
        )
    }

    /// Records are cast field by field, and packed record bytes are decoded.
    fn cast_value(&self, value: &Scalar) -> Result<Scalar, ScalarError> {
        match value {
            Scalar::Struct(_) => {
                let values = self.typed(value)?;
                self.cast_fields(values.iter().map(|(_, value)| *value))
            }
            Scalar::Bytes(bytes) => self.scalar_from_bytes(bytes),
            _ => Err(ScalarError::new(Self::IDENTIFIER, value)),
        }
    }

    fn to_json_value(&self, value: &Scalar, version: ZarrFormat) -> Result<Value, ScalarError> {
        let values = self.typed(value)?;
        let mut object = Map::with_capacity(values.len());
        for ((name, value), (_, field)) in values.into_iter().zip(&self.fields) {
            object.insert(name.to_string(), field.to_json_value(value, version)?);
        }
        Ok(Value::Object(object))
    }

    /// Accepts an object keyed by field name, an array of field values, or base64 encoded packed record bytes.
    fn from_json_value(&self, json: &Value, version: ZarrFormat) -> Result<Scalar, ScalarError> {
        let err = || ScalarError::new(Self::IDENTIFIER, json);
        let values: Vec<&Value> = match json {
            Value::Object(object) => {
                if object.len() != self.fields.len() {
                    return Err(err());
                }
                self.fields
                    .iter()
                    .map(|(name, _)| object.get(name).ok_or_else(err))
                    .collect::<Result<_, _>>()?
            }
            Value::Array(values) if values.len() == self.fields.len() => values.iter().collect(),
            Value::String(_) => {
                let bytes = bytes_from_json(json).ok_or_else(err)?;
                return self.scalar_from_bytes(&bytes).map_err(|_| err());
            }
            _ => return Err(err()),
        };
        self.fields
            .iter()
            .zip(values)
            .map(|((name, field), value)| Ok((name.clone(), field.from_json_value(value, version)?)))
            .collect::<Result<Vec<_>, ScalarError>>()
            .map(Scalar::Struct)
    }

    fn scalar_to_bytes(&self, value: &Scalar) -> Result<Vec<u8>, ScalarError> {
        let values = self.typed(value)?;
        let mut bytes = Vec::new();
        for ((_, value), (_, field)) in values.into_iter().zip(&self.fields) {
            bytes.extend(field.scalar_to_bytes(value)?);
        }
        Ok(bytes)
    }

    fn scalar_from_bytes(&self, bytes: &[u8]) -> Result<Scalar, ScalarError> {
        let err = || invalid_bytes(Self::IDENTIFIER, bytes);
        let sizes = self.field_sizes().ok_or_else(err)?;
        if bytes.len() != sizes.iter().sum::<usize>() {
            return Err(err());
        }
        let mut offset = 0;
        let mut values = Vec::with_capacity(self.fields.len());
        for ((name, field), size) in self.fields.iter().zip(sizes) {
            values.push((
                name.clone(),
                field.scalar_from_bytes(&bytes[offset..offset + size])?,
            ));
            offset += size;
        }
        Ok(Scalar::Struct(values))
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ByteOrder, FixedLengthAsciiDataType, Int32DataType, UInt8DataType, json::bytes_to_json,
    };

    fn record() -> StructuredDataType {
        StructuredDataType::new(vec![
            (
                "a".to_string(),
                DataType::new(Int32DataType::new(ByteOrder::Little)),
            ),
            ("b".to_string(), DataType::new(FixedLengthAsciiDataType::new(2))),
        ])
    }

    #[test]
    fn structured_metadata() {
        let dtype = record();
        let v2 = json!([["a", "<i4"], ["b", "|S2"]]);
        assert_eq!(dtype.to_json(ZarrFormat::V2), v2);
        assert_eq!(dtype.name(ZarrFormat::V2), "|V6");
        assert_eq!(dtype.size(), DataTypeSize::Fixed(6));
        assert_eq!(StructuredDataType::from_json(&v2, ZarrFormat::V2).unwrap(), dtype);

        let v3 = dtype.to_json(ZarrFormat::V3);
        assert_eq!(
            v3,
            json!({
                "name": "structured",
                "configuration": {"fields": [
                    ["a", "int32"],
                    ["b", {"name": "numpy.fixed_length_ascii", "configuration": {"length_bytes": 2}}]
                ]}
            })
        );
        assert_eq!(StructuredDataType::from_json(&v3, ZarrFormat::V3).unwrap(), dtype);
        assert!(StructuredDataType::from_json(&json!("|V6"), ZarrFormat::V2).is_err());
    }

    #[test]
    fn structured_values() {
        let dtype = record();
        let value = Scalar::Struct(vec![
            ("a".to_string(), Scalar::Int(1)),
            ("b".to_string(), Scalar::from(b"hi".as_slice())),
        ]);
        let json = dtype.to_json_value(&value, ZarrFormat::V2).unwrap();
        assert_eq!(json, json!({"a": 1, "b": "aGk="}));
        assert_eq!(dtype.from_json_value(&json, ZarrFormat::V2).unwrap(), value);
        assert_eq!(
            dtype.from_json_value(&json!([1, "aGk="]), ZarrFormat::V3).unwrap(),
            value
        );

        let bytes = dtype.scalar_to_bytes(&value).unwrap();
        assert_eq!(bytes, [1, 0, 0, 0, b'h', b'i']);
        let base64 = bytes_to_json(&bytes);
        assert_eq!(dtype.from_json_value(&base64, ZarrFormat::V2).unwrap(), value);
        assert_eq!(dtype.cast_value(&Scalar::Bytes(bytes)).unwrap(), value);

        assert_eq!(
            dtype.default_value(),
            Scalar::Struct(vec![
                ("a".to_string(), Scalar::Int(0)),
                ("b".to_string(), Scalar::Bytes(Vec::new())),
            ])
        );
        assert!(dtype.from_json_value(&json!({"a": 1}), ZarrFormat::V2).is_err());
        assert!(dtype.cast_value(&Scalar::Int(0)).is_err());
    }

    #[test]
    fn structured_nested() {
        let inner = StructuredDataType::new(vec![(
            "x".to_string(),
            DataType::new(UInt8DataType::default()),
        )]);
        let dtype = StructuredDataType::new(vec![("inner".to_string(), DataType::new(inner))]);
        let native = dtype.to_native();
        assert_eq!(native.item_size(), 1);
        assert_eq!(StructuredDataType::from_native(&native).unwrap(), dtype);
    }
}
