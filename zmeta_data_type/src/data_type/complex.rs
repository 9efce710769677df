//! Complex data types (`complex64`, `complex128`).
//!
//! Values are encoded as a two element `[real, imaginary]` JSON array, with each component encoded like a float.

use num::complex::Complex64;
use serde_json::Value;
use zmeta_plugin::ZarrFormat;

use super::float::FloatElement;
use super::macros::{data_type_traits_common, numeric_data_type};
use crate::{
    ByteOrder, DataTypeTraits, Scalar, ScalarError,
    data_type::invalid_bytes,
    json::{float_from_json, float_to_json},
};

macro_rules! complex_data_type {
    ($doc:literal, $name:ident, $identifier:literal, $size:literal, $component_size:literal, $t:ty) => {
        numeric_data_type!($doc, $name, $identifier, Complex, $size);

        impl $name {
            #[allow(clippy::unused_self)]
            fn typed(&self, value: &Scalar) -> Result<($t, $t), ScalarError> {
                let (re, im) = match value {
                    Scalar::Complex(c) => (c.re, c.im),
                    value => (
                        value
                            .as_f64()
                            .ok_or_else(|| ScalarError::new($identifier, value))?,
                        0.0,
                    ),
                };
                Ok((<$t>::from_f64(re), <$t>::from_f64(im)))
            }

            fn component_to_bytes(&self, component: $t) -> [u8; $component_size] {
                match self.byte_order {
                    ByteOrder::Big => component.to_be_bytes(),
                    ByteOrder::Little | ByteOrder::NotApplicable => component.to_le_bytes(),
                }
            }

            fn component_from_bytes(&self, bytes: [u8; $component_size]) -> $t {
                match self.byte_order {
                    ByteOrder::Big => <$t>::from_be_bytes(bytes),
                    ByteOrder::Little | ByteOrder::NotApplicable => <$t>::from_le_bytes(bytes),
                }
            }
        }

        impl DataTypeTraits for $name {
            data_type_traits_common!(Complex, $size);

            fn default_value(&self) -> Scalar {
                Scalar::Complex(Complex64::new(0.0, 0.0))
            }

            fn cast_value(&self, value: &Scalar) -> Result<Scalar, ScalarError> {
                let (re, im) = self.typed(value)?;
                Ok(Scalar::Complex(Complex64::new(re.to_f64(), im.to_f64())))
            }

            fn to_json_value(&self, value: &Scalar, _version: ZarrFormat) -> Result<Value, ScalarError> {
                let (re, im) = self.typed(value)?;
                Ok(Value::Array(vec![
                    float_to_json(re.to_f64()),
                    float_to_json(im.to_f64()),
                ]))
            }

            fn from_json_value(&self, json: &Value, _version: ZarrFormat) -> Result<Scalar, ScalarError> {
                let err = || ScalarError::new($identifier, json);
                let Some([re, im]) = json.as_array().map(Vec::as_slice) else {
                    return Err(err());
                };
                let re = float_from_json(re, $component_size).ok_or_else(err)?;
                let im = float_from_json(im, $component_size).ok_or_else(err)?;
                self.cast_value(&Scalar::Complex(Complex64::new(re, im)))
            }

            fn scalar_to_bytes(&self, value: &Scalar) -> Result<Vec<u8>, ScalarError> {
                let (re, im) = self.typed(value)?;
                let mut bytes = Vec::with_capacity($size);
                bytes.extend_from_slice(&self.component_to_bytes(re));
                bytes.extend_from_slice(&self.component_to_bytes(im));
                Ok(bytes)
            }

            fn scalar_from_bytes(&self, bytes: &[u8]) -> Result<Scalar, ScalarError> {
                let err = || invalid_bytes($identifier, bytes);
                if bytes.len() != $size {
                    return Err(err());
                }
                let (re, im) = bytes.split_at($component_size);
                let re = self.component_from_bytes(re.try_into().map_err(|_| err())?);
                let im = self.component_from_bytes(im.try_into().map_err(|_| err())?);
                Ok(Scalar::Complex(Complex64::new(re.to_f64(), im.to_f64())))
            }
        }
    };
}

complex_data_type!("The `complex64` data type.", Complex64DataType, "complex64", 8, 4, f32);
complex_data_type!("The `complex128` data type.", Complex128DataType, "complex128", 16, 8, f64);
