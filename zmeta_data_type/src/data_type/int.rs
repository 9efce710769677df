//! Integer data types (`int8` to `int64`, `uint8` to `uint64`).

use serde_json::Value;
use zmeta_plugin::ZarrFormat;

use super::macros::{data_type_traits_common, numeric_data_type};
use crate::{ByteOrder, DataTypeTraits, Scalar, ScalarError, data_type::invalid_bytes};

macro_rules! integer_data_type {
    ($doc:literal, $name:ident, $identifier:literal, $native:ident, $size:literal, $t:ty, $variant:ident, $wide:ty) => {
        numeric_data_type!($doc, $name, $identifier, $native, $size);

        impl $name {
            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_precision_loss,
                clippy::float_cmp,
                clippy::unused_self
            )]
            fn typed(&self, value: &Scalar) -> Result<$t, ScalarError> {
                let err = || ScalarError::new($identifier, value);
                match value {
                    Scalar::Bool(b) => Ok(<$t>::from(*b)),
                    Scalar::Int(i) => <$t>::try_from(*i).map_err(|_| err()),
                    Scalar::UInt(u) => <$t>::try_from(*u).map_err(|_| err()),
                    // `MAX as f64` rounds up to 2^63 and 2^64 for the 64-bit integers.
                    Scalar::Float(f)
                        if f.fract() == 0.0
                            && *f >= <$t>::MIN as f64
                            && *f < (<$t>::MAX as f64 + 1.0) =>
                    {
                        Ok(*f as $t)
                    }
                    _ => Err(err()),
                }
            }
        }

        impl DataTypeTraits for $name {
            data_type_traits_common!(Integer, $size);

            fn default_value(&self) -> Scalar {
                Scalar::$variant(0)
            }

            fn cast_value(&self, value: &Scalar) -> Result<Scalar, ScalarError> {
                Ok(Scalar::$variant(<$wide>::from(self.typed(value)?)))
            }

            fn to_json_value(&self, value: &Scalar, _version: ZarrFormat) -> Result<Value, ScalarError> {
                Ok(Value::from(self.typed(value)?))
            }

            fn from_json_value(&self, json: &Value, _version: ZarrFormat) -> Result<Scalar, ScalarError> {
                let value = if let Some(i) = json.as_i64() {
                    Scalar::Int(i)
                } else if let Some(u) = json.as_u64() {
                    Scalar::UInt(u)
                } else {
                    return Err(ScalarError::new($identifier, json));
                };
                self.cast_value(&value)
                    .map_err(|_| ScalarError::new($identifier, json))
            }

            fn scalar_to_bytes(&self, value: &Scalar) -> Result<Vec<u8>, ScalarError> {
                let value = self.typed(value)?;
                Ok(match self.byte_order {
                    ByteOrder::Big => value.to_be_bytes().to_vec(),
                    ByteOrder::Little | ByteOrder::NotApplicable => value.to_le_bytes().to_vec(),
                })
            }

            fn scalar_from_bytes(&self, bytes: &[u8]) -> Result<Scalar, ScalarError> {
                let bytes: [u8; $size] = bytes
                    .try_into()
                    .map_err(|_| invalid_bytes($identifier, bytes))?;
                let value = match self.byte_order {
                    ByteOrder::Big => <$t>::from_be_bytes(bytes),
                    ByteOrder::Little | ByteOrder::NotApplicable => <$t>::from_le_bytes(bytes),
                };
                Ok(Scalar::$variant(<$wide>::from(value)))
            }
        }
    };
}

integer_data_type!("The `int8` data type.", Int8DataType, "int8", Int, 1, i8, Int, i64);
integer_data_type!("The `int16` data type.", Int16DataType, "int16", Int, 2, i16, Int, i64);
integer_data_type!("The `int32` data type.", Int32DataType, "int32", Int, 4, i32, Int, i64);
integer_data_type!("The `int64` data type.", Int64DataType, "int64", Int, 8, i64, Int, i64);
integer_data_type!("The `uint8` data type.", UInt8DataType, "uint8", UInt, 1, u8, UInt, u64);
integer_data_type!("The `uint16` data type.", UInt16DataType, "uint16", UInt, 2, u16, UInt, u64);
integer_data_type!("The `uint32` data type.", UInt32DataType, "uint32", UInt, 4, u32, UInt, u64);
integer_data_type!("The `uint64` data type.", UInt64DataType, "uint64", UInt, 8, u64, UInt, u64);
