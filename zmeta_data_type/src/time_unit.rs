//! `NumPy` temporal units.

use chrono::{DateTime, NaiveDateTime};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A `NumPy` temporal unit.
///
/// See <https://numpy.org/doc/stable/reference/arrays.datetime.html#datetime-units>.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumpyTimeUnit {
    /// Generic time unit.
    #[serde(rename = "generic")]
    #[display("generic")]
    Generic,
    /// Year.
    #[serde(rename = "Y")]
    #[display("Y")]
    Year,
    /// Month.
    #[serde(rename = "M")]
    #[display("M")]
    Month,
    /// Week.
    #[serde(rename = "W")]
    #[display("W")]
    Week,
    /// Day.
    #[serde(rename = "D")]
    #[display("D")]
    Day,
    /// Hour.
    #[serde(rename = "h")]
    #[display("h")]
    Hour,
    /// Minute.
    #[serde(rename = "m")]
    #[display("m")]
    Minute,
    /// Second.
    #[serde(rename = "s")]
    #[display("s")]
    Second,
    /// Millisecond.
    #[serde(rename = "ms")]
    #[display("ms")]
    Millisecond,
    /// Microsecond.
    #[serde(rename = "us", alias = "μs")]
    #[display("us")]
    Microsecond,
    /// Nanosecond.
    #[serde(rename = "ns")]
    #[display("ns")]
    Nanosecond,
    /// Picosecond.
    #[serde(rename = "ps")]
    #[display("ps")]
    Picosecond,
    /// Femtosecond.
    #[serde(rename = "fs")]
    #[display("fs")]
    Femtosecond,
    /// Attosecond.
    #[serde(rename = "as")]
    #[display("as")]
    Attosecond,
}

/// An unknown `NumPy` time unit error.
#[derive(Clone, Debug, Error)]
#[error("unknown numpy time unit {_0}")]
pub struct NumpyTimeUnitParseError(String);

/// A datetime conversion error.
#[derive(Clone, Debug, Error)]
#[error("datetime cannot be represented with unit {unit} and scale factor {scale_factor}")]
pub struct NumpyTimeConversionError {
    unit: NumpyTimeUnit,
    scale_factor: u32,
}

impl core::str::FromStr for NumpyTimeUnit {
    type Err = NumpyTimeUnitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "" | "generic" => Self::Generic,
            "Y" => Self::Year,
            "M" => Self::Month,
            "W" => Self::Week,
            "D" => Self::Day,
            "h" => Self::Hour,
            "m" => Self::Minute,
            "s" => Self::Second,
            "ms" => Self::Millisecond,
            "us" | "μs" => Self::Microsecond,
            "ns" => Self::Nanosecond,
            "ps" => Self::Picosecond,
            "fs" => Self::Femtosecond,
            "as" => Self::Attosecond,
            _ => return Err(NumpyTimeUnitParseError(s.to_string())),
        })
    }
}

impl NumpyTimeUnit {
    /// The number of seconds in one unit, for units of at least a second that have a fixed length.
    const fn seconds(self) -> Option<i64> {
        match self {
            Self::Week => Some(604_800),
            Self::Day => Some(86_400),
            Self::Hour => Some(3_600),
            Self::Minute => Some(60),
            Self::Second => Some(1),
            _ => None,
        }
    }

    /// Convert `datetime` (interpreted as UTC) to an offset from the Unix epoch in `scale_factor` multiples of this unit.
    ///
    /// The offset is floored to a whole multiple of the unit.
    ///
    /// # Errors
    /// Returns [`NumpyTimeConversionError`] for calendar units (`Y`, `M`), sub-nanosecond units, the generic unit,
    /// or if the offset overflows.
    pub fn datetime_to_offset(
        self,
        scale_factor: u32,
        datetime: &NaiveDateTime,
    ) -> Result<i64, NumpyTimeConversionError> {
        let err = || NumpyTimeConversionError {
            unit: self,
            scale_factor,
        };
        let datetime = datetime.and_utc();
        let offset = match self {
            Self::Millisecond => datetime.timestamp_millis(),
            Self::Microsecond => datetime.timestamp_micros(),
            Self::Nanosecond => datetime.timestamp_nanos_opt().ok_or_else(err)?,
            unit => datetime
                .timestamp()
                .div_euclid(unit.seconds().ok_or_else(err)?),
        };
        if scale_factor == 0 {
            return Err(err());
        }
        Ok(offset.div_euclid(i64::from(scale_factor)))
    }

    /// Convert an offset from the Unix epoch in `scale_factor` multiples of this unit to a UTC datetime.
    ///
    /// Returns [`None`] if the unit has no fixed length or the datetime is out of range.
    #[must_use]
    pub fn offset_to_datetime(self, scale_factor: u32, offset: i64) -> Option<NaiveDateTime> {
        let offset = offset.checked_mul(i64::from(scale_factor))?;
        let datetime = match self {
            Self::Millisecond => DateTime::from_timestamp_millis(offset)?,
            Self::Microsecond => DateTime::from_timestamp_micros(offset)?,
            Self::Nanosecond => DateTime::from_timestamp_nanos(offset),
            unit => DateTime::from_timestamp(offset.checked_mul(unit.seconds()?)?, 0)?,
        };
        Some(datetime.naive_utc())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn numpy_time_unit_str() {
        assert_eq!("us".parse::<NumpyTimeUnit>().unwrap(), NumpyTimeUnit::Microsecond);
        assert_eq!("μs".parse::<NumpyTimeUnit>().unwrap(), NumpyTimeUnit::Microsecond);
        assert_eq!(NumpyTimeUnit::Microsecond.to_string(), "us");
        assert_eq!(
            serde_json::to_string(&NumpyTimeUnit::Generic).unwrap(),
            r#""generic""#
        );
        assert_eq!(
            serde_json::from_str::<NumpyTimeUnit>(r#""μs""#).unwrap(),
            NumpyTimeUnit::Microsecond
        );
        assert!("fortnight".parse::<NumpyTimeUnit>().is_err());
    }

    #[test]
    fn numpy_time_unit_offsets() {
        let datetime = NaiveDate::from_ymd_opt(2021, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let second = NumpyTimeUnit::Second;
        assert_eq!(second.datetime_to_offset(1, &datetime).unwrap(), 1_609_459_200);
        assert_eq!(second.offset_to_datetime(1, 1_609_459_200), Some(datetime));
        assert_eq!(
            NumpyTimeUnit::Day.datetime_to_offset(1, &datetime).unwrap(),
            18_628
        );
        assert_eq!(
            NumpyTimeUnit::Millisecond
                .datetime_to_offset(10, &datetime)
                .unwrap(),
            160_945_920_000
        );
        assert_eq!(
            NumpyTimeUnit::Millisecond.offset_to_datetime(10, 160_945_920_000),
            Some(datetime)
        );
        assert!(NumpyTimeUnit::Month.datetime_to_offset(1, &datetime).is_err());
        assert!(NumpyTimeUnit::Year.offset_to_datetime(1, 51).is_none());
    }
}
