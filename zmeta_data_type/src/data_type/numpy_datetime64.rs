//! The `numpy.datetime64` data type.

use std::num::NonZeroU32;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use zmeta_plugin::ZarrFormat;

use crate::{
    ByteOrder, DataTypeKind, DataTypeSize, DataTypeTraits, DataTypeValidationError,
    DataTypeWrapper, NativeDType, NumpyTimeConversionError, NumpyTimeUnit, Scalar, ScalarError,
    data_type::{configuration_from_json, invalid_bytes},
};

/// The `numpy.datetime64` data type configuration.
#[derive(Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Debug)]
#[serde(deny_unknown_fields)]
struct NumpyDateTime64Configuration {
    unit: NumpyTimeUnit,
    scale_factor: NonZeroU32,
}

/// The `numpy.datetime64` data type.
///
/// Values are [`Scalar::DateTime64`] offsets from the Unix epoch in `scale_factor` multiples of `unit`.
/// Not-a-time ([`Scalar::NAT`]) is encoded as `null` in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NumpyDateTime64DataType {
    unit: NumpyTimeUnit,
    scale_factor: NonZeroU32,
    byte_order: ByteOrder,
}

impl Default for NumpyDateTime64DataType {
    fn default() -> Self {
        Self::new(NumpyTimeUnit::Generic, NonZeroU32::MIN, ByteOrder::Little)
    }
}

impl NumpyDateTime64DataType {
    /// Create a new `numpy.datetime64` data type.
    ///
    /// [`ByteOrder::NotApplicable`] resolves to the native byte order.
    #[must_use]
    pub const fn new(unit: NumpyTimeUnit, scale_factor: NonZeroU32, byte_order: ByteOrder) -> Self {
        Self {
            unit,
            scale_factor,
            byte_order: byte_order.for_size(8),
        }
    }

    /// The `NumPy` temporal unit.
    #[must_use]
    pub const fn unit(&self) -> NumpyTimeUnit {
        self.unit
    }

    /// The `NumPy` temporal scale factor.
    #[must_use]
    pub const fn scale_factor(&self) -> NonZeroU32 {
        self.scale_factor
    }

    /// The byte order of the data type.
    #[must_use]
    pub const fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Convert a UTC datetime to a value of this data type.
    ///
    /// # Errors
    /// Returns [`NumpyTimeConversionError`] if the unit has no fixed length or the offset overflows.
    pub fn scalar_from_datetime(
        &self,
        datetime: &NaiveDateTime,
    ) -> Result<Scalar, NumpyTimeConversionError> {
        self.unit
            .datetime_to_offset(self.scale_factor.get(), datetime)
            .map(Scalar::DateTime64)
    }

    /// Convert a value of this data type to a UTC datetime.
    ///
    /// Returns [`None`] for not-a-time, values that are not datetimes, units without a fixed length, or out of range datetimes.
    #[must_use]
    pub fn datetime_from_scalar(&self, value: &Scalar) -> Option<NaiveDateTime> {
        match value {
            Scalar::DateTime64(offset) if !value.is_nat() => self
                .unit
                .offset_to_datetime(self.scale_factor.get(), *offset),
            _ => None,
        }
    }

    fn parse_datetime(&self, string: &str) -> Option<Scalar> {
        if string == "NaT" {
            return Some(Scalar::NAT);
        }
        let datetime = string.parse::<NaiveDateTime>().ok().or_else(|| {
            string
                .parse::<NaiveDate>()
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })?;
        self.scalar_from_datetime(&datetime).ok()
    }

    fn typed(&self, value: &Scalar) -> Result<i64, ScalarError> {
        let err = || ScalarError::new(Self::IDENTIFIER, value);
        match value {
            Scalar::DateTime64(offset) => Ok(*offset),
            Scalar::Int(offset) => Ok(*offset),
            Scalar::UInt(offset) => i64::try_from(*offset).map_err(|_| err()),
            Scalar::String(string) => match self.parse_datetime(string) {
                Some(Scalar::DateTime64(offset)) => Ok(offset),
                _ => Err(err()),
            },
            _ => Err(err()),
        }
    }
}

impl DataTypeWrapper for NumpyDateTime64DataType {
    const IDENTIFIER: &'static str = "numpy.datetime64";

    fn from_native(native: &NativeDType) -> Result<Self, DataTypeValidationError> {
        match native {
            NativeDType::DateTime64 {
                unit,
                scale_factor,
                byte_order,
            } if *byte_order == byte_order.for_size(8) => {
                Ok(Self::new(*unit, *scale_factor, *byte_order))
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
                    configuration_from_json::<NumpyDateTime64Configuration>(json, Self::IDENTIFIER)
                        .ok_or_else(err)?;
                Ok(Self::new(
                    configuration.unit,
                    configuration.scale_factor,
                    ByteOrder::Little,
                ))
            }
        }
    }
}

impl DataTypeTraits for NumpyDateTime64DataType {
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
        NativeDType::DateTime64 {
            unit: self.unit,
            scale_factor: self.scale_factor,
            byte_order: self.byte_order,
        }
    }

    fn to_json(&self, version: ZarrFormat) -> Value {
        match version {
            ZarrFormat::V2 => Value::String(self.name(version)),
            ZarrFormat::V3 => json!({
                "name": Self::IDENTIFIER,
                "configuration": NumpyDateTime64Configuration {
                    unit: self.unit,
                    scale_factor: self.scale_factor,
                },
            }),
        }
    }

    fn kind(&self) -> DataTypeKind {
        DataTypeKind::DateTime
    }

    fn size(&self) -> DataTypeSize {
        DataTypeSize::Fixed(8)
    }

    fn default_value(&self) -> Scalar {
        Scalar::NAT
    }

    fn cast_value(&self, value: &Scalar) -> Result<Scalar, ScalarError> {
        self.typed(value).map(Scalar::DateTime64)
    }

    fn to_json_value(&self, value: &Scalar, _version: ZarrFormat) -> Result<Value, ScalarError> {
        match self.typed(value)? {
            i64::MIN => Ok(Value::Null),
            offset => Ok(Value::from(offset)),
        }
    }

    fn from_json_value(&self, json: &Value, _version: ZarrFormat) -> Result<Scalar, ScalarError> {
        match json {
            Value::Null => Ok(Scalar::NAT),
            Value::String(string) if string == "NaT" => Ok(Scalar::NAT),
            json => json
                .as_i64()
                .map(Scalar::DateTime64)
                .ok_or_else(|| ScalarError::new(Self::IDENTIFIER, json)),
        }
    }

    fn scalar_to_bytes(&self, value: &Scalar) -> Result<Vec<u8>, ScalarError> {
        let offset = self.typed(value)?;
        Ok(match self.byte_order {
            ByteOrder::Big => offset.to_be_bytes().to_vec(),
            ByteOrder::Little | ByteOrder::NotApplicable => offset.to_le_bytes().to_vec(),
        })
    }

    fn scalar_from_bytes(&self, bytes: &[u8]) -> Result<Scalar, ScalarError> {
        let bytes: [u8; 8] = bytes
            .try_into()
            .map_err(|_| invalid_bytes(Self::IDENTIFIER, bytes))?;
        Ok(Scalar::DateTime64(match self.byte_order {
            ByteOrder::Big => i64::from_be_bytes(bytes),
            ByteOrder::Little | ByteOrder::NotApplicable => i64::from_le_bytes(bytes),
        }))
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seconds() -> NumpyDateTime64DataType {
        NumpyDateTime64DataType::new(NumpyTimeUnit::Second, NonZeroU32::MIN, ByteOrder::Little)
    }

    #[test]
    fn numpy_datetime64_metadata() {
        let dtype = seconds();
        assert_eq!(dtype.to_json(ZarrFormat::V2), json!("<M8[s]"));
        assert_eq!(
            dtype.to_json(ZarrFormat::V3),
            json!({"name": "numpy.datetime64", "configuration": {"unit": "s", "scale_factor": 1}})
        );
        for version in ZarrFormat::all() {
            assert_eq!(
                NumpyDateTime64DataType::from_json(&dtype.to_json(version), version).unwrap(),
                dtype
            );
        }
        let dtype = NumpyDateTime64DataType::from_json(&json!("<M8[10ms]"), ZarrFormat::V2).unwrap();
        assert_eq!(dtype.unit(), NumpyTimeUnit::Millisecond);
        assert_eq!(dtype.scale_factor().get(), 10);
        assert!(
            NumpyDateTime64DataType::from_json(
                &json!({"name": "numpy.datetime64", "configuration": {"unit": "s", "scale_factor": 0}}),
                ZarrFormat::V3
            )
            .is_err()
        );
    }

    #[test]
    fn numpy_datetime64_values() {
        let dtype = seconds();
        assert_eq!(dtype.default_value(), Scalar::NAT);
        assert_eq!(dtype.zero_value(), Scalar::DateTime64(0));
        for version in ZarrFormat::all() {
            assert_eq!(dtype.to_json_value(&Scalar::NAT, version).unwrap(), Value::Null);
            assert_eq!(dtype.from_json_value(&Value::Null, version).unwrap(), Scalar::NAT);
            assert_eq!(dtype.from_json_value(&json!("NaT"), version).unwrap(), Scalar::NAT);
        }
        assert_eq!(
            dtype.cast_value(&Scalar::from("2021-01-01")).unwrap(),
            Scalar::DateTime64(1_609_459_200)
        );
        assert!(dtype.cast_value(&Scalar::from("yesterday")).is_err());
        assert!(dtype.cast_value(&Scalar::Float(1.0)).is_err());

        let datetime = NaiveDate::from_ymd_opt(2021, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 1)
            .unwrap();
        let value = dtype.scalar_from_datetime(&datetime).unwrap();
        assert_eq!(value, Scalar::DateTime64(1_609_459_201));
        assert_eq!(dtype.datetime_from_scalar(&value), Some(datetime));
        assert_eq!(dtype.datetime_from_scalar(&Scalar::NAT), None);
    }
}
