//! Float data types (`float16`, `float32`, `float64`).

use half::f16;
use serde_json::Value;
use zmeta_plugin::ZarrFormat;

use super::macros::{data_type_traits_common, numeric_data_type};
use crate::{
    ByteOrder, DataTypeTraits, Scalar, ScalarError,
    data_type::invalid_bytes,
    json::{float_from_json, float_to_json},
};

/// Conversion of a float element to and from [`f64`].
pub(super) trait FloatElement: Copy {
    fn from_f64(value: f64) -> Self;

    fn to_f64(self) -> f64;
}

impl FloatElement for f16 {
    fn from_f64(value: f64) -> Self {
        f16::from_f64(value)
    }

    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

impl FloatElement for f32 {
    #[allow(clippy::cast_possible_truncation)]
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

impl FloatElement for f64 {
    fn from_f64(value: f64) -> Self {
        value
    }

    fn to_f64(self) -> f64 {
        self
    }
}

macro_rules! float_data_type {
    ($doc:literal, $name:ident, $identifier:literal, $size:literal, $t:ty) => {
        numeric_data_type!($doc, $name, $identifier, Float, $size);

        impl $name {
            #[allow(clippy::unused_self)]
            fn typed(&self, value: &Scalar) -> Result<$t, ScalarError> {
                value
                    .as_f64()
                    .map(<$t as FloatElement>::from_f64)
                    .ok_or_else(|| ScalarError::new($identifier, value))
            }
        }

        impl DataTypeTraits for $name {
            data_type_traits_common!(Float, $size);

            fn default_value(&self) -> Scalar {
                Scalar::Float(0.0)
            }

            fn cast_value(&self, value: &Scalar) -> Result<Scalar, ScalarError> {
                Ok(Scalar::Float(FloatElement::to_f64(self.typed(value)?)))
            }

            fn to_json_value(&self, value: &Scalar, _version: ZarrFormat) -> Result<Value, ScalarError> {
                Ok(float_to_json(FloatElement::to_f64(self.typed(value)?)))
            }

            fn from_json_value(&self, json: &Value, _version: ZarrFormat) -> Result<Scalar, ScalarError> {
                let value = float_from_json(json, $size)
                    .ok_or_else(|| ScalarError::new($identifier, json))?;
                self.cast_value(&Scalar::Float(value))
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
                Ok(Scalar::Float(FloatElement::to_f64(value)))
            }
        }
    };
}

float_data_type!("The `float16` data type.", Float16DataType, "float16", 2, f16);
float_data_type!("The `float32` data type.", Float32DataType, "float32", 4, f32);
float_data_type!("The `float64` data type.", Float64DataType, "float64", 8, f64);
