//! The `fixed_length_utf32` data type.
//!
//! A null-padded UCS4 string of a fixed number of code points (`NumPy` `U` kind).

use serde_json::{Value, json};
use zmeta_plugin::ZarrFormat;

use super::fixed_length_bytes::LengthBytesConfiguration;
use crate::{
    ByteOrder, DataTypeKind, DataTypeSize, DataTypeTraits, DataTypeValidationError,
    DataTypeWrapper, NativeDType, Scalar, ScalarError,
    data_type::{configuration_from_json, invalid_bytes},
};

/// The `fixed_length_utf32` data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedLengthUtf32DataType {
    length: usize,
    byte_order: ByteOrder,
}

impl FixedLengthUtf32DataType {
    /// Create a new fixed length UTF-32 data type of `length` code points.
    ///
    /// [`ByteOrder::NotApplicable`] resolves to the native byte order.
    #[must_use]
    pub const fn new(length: usize, byte_order: ByteOrder) -> Self {
        Self {
            length,
            byte_order: byte_order.for_size(4),
        }
    }

    /// The length in code points.
    #[must_use]
    pub const fn length(&self) -> usize {
        self.length
    }

    /// The byte order of the data type.
    #[must_use]
    pub const fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    fn typed<'a>(&self, value: &'a Scalar) -> Result<&'a str, ScalarError> {
        match value {
            Scalar::String(string) => {
                let string = string.trim_end_matches('\0');
                if string.chars().count() <= self.length {
                    Ok(string)
                } else {
                    Err(ScalarError::new(Self::IDENTIFIER, value))
                }
            }
            _ => Err(ScalarError::new(Self::IDENTIFIER, value)),
        }
    }
}

impl DataTypeWrapper for FixedLengthUtf32DataType {
    const IDENTIFIER: &'static str = "fixed_length_utf32";

    fn from_native(native: &NativeDType) -> Result<Self, DataTypeValidationError> {
        match native {
            NativeDType::Unicode { length, byte_order } if *byte_order == byte_order.for_size(4) => {
                Ok(Self::new(*length, *byte_order))
            }
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
                let configuration =
                    configuration_from_json::<LengthBytesConfiguration>(json, Self::IDENTIFIER)
                        .ok_or_else(err)?;
                if configuration.length_bytes % 4 == 0 {
                    Ok(Self::new(configuration.length_bytes / 4, ByteOrder::Little))
                } else {
                    Err(err())
                }
            }
        }
    }
}

impl DataTypeTraits for FixedLengthUtf32DataType {
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
        NativeDType::Unicode {
            length: self.length,
            byte_order: self.byte_order,
        }
    }

    fn to_json(&self, version: ZarrFormat) -> Value {
        match version {
            ZarrFormat::V2 => Value::String(self.name(version)),
            ZarrFormat::V3 => json!({
                "name": Self::IDENTIFIER,
                "configuration": {"length_bytes": self.length * 4},
            }),
        }
    }

    fn kind(&self) -> DataTypeKind {
        DataTypeKind::String
    }

    fn size(&self) -> DataTypeSize {
        DataTypeSize::Fixed(self.length * 4)
    }

    fn default_value(&self) -> Scalar {
        Scalar::String(String::new())
    }

    fn cast_value(&self, value: &Scalar) -> Result<Scalar, ScalarError> {
        self.typed(value).map(Scalar::from)
    }

    fn to_json_value(&self, value: &Scalar, _version: ZarrFormat) -> Result<Value, ScalarError> {
        self.typed(value).map(Value::from)
    }

    fn from_json_value(&self, json: &Value, _version: ZarrFormat) -> Result<Scalar, ScalarError> {
        let string = json
            .as_str()
            .ok_or_else(|| ScalarError::new(Self::IDENTIFIER, json))?;
        self.cast_value(&Scalar::from(string))
    }

    fn scalar_to_bytes(&self, value: &Scalar) -> Result<Vec<u8>, ScalarError> {
        let string = self.typed(value)?;
        let mut bytes = Vec::with_capacity(self.length * 4);
        for c in string.chars() {
            let c = u32::from(c);
            bytes.extend_from_slice(&match self.byte_order {
                ByteOrder::Big => c.to_be_bytes(),
                ByteOrder::Little | ByteOrder::NotApplicable => c.to_le_bytes(),
            });
        }
        bytes.resize(self.length * 4, 0);
        Ok(bytes)
    }

    fn scalar_from_bytes(&self, bytes: &[u8]) -> Result<Scalar, ScalarError> {
        let err = || invalid_bytes(Self::IDENTIFIER, bytes);
        if bytes.len() != self.length * 4 {
            return Err(err());
        }
        let string = bytes
            .chunks_exact(4)
            .map(|c| {
                let c = [c[0], c[1], c[2], c[3]];
                let c = match self.byte_order {
                    ByteOrder::Big => u32::from_be_bytes(c),
                    ByteOrder::Little | ByteOrder::NotApplicable => u32::from_le_bytes(c),
                };
                char::from_u32(c).ok_or_else(err)
            })
            .collect::<Result<String, _>>()?;
        Ok(Scalar::String(string.trim_end_matches('\0').to_string()))
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
