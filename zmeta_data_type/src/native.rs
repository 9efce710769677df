//! The native (host) data type descriptor.
//!
//! [`NativeDType`] models the `NumPy` dtypes that Zarr V2 array metadata stores in its `dtype` field.
//! Simple dtypes render as a type string (e.g. `<i4`, `|S4`, `<M8[s]`), and structured dtypes as a list of `[name, dtype]` pairs.

use std::num::NonZeroU32;

use serde_json::Value;
use thiserror::Error;

use crate::NumpyTimeUnit;

/// The byte order of a native data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// Little endian (`<`).
    Little,
    /// Big endian (`>`).
    Big,
    /// Byte order is not applicable (`|`).
    NotApplicable,
}

impl ByteOrder {
    /// The byte order of the target platform.
    #[must_use]
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            Self::Big
        } else {
            Self::Little
        }
    }

    /// The type string character for this byte order.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Little => '<',
            Self::Big => '>',
            Self::NotApplicable => '|',
        }
    }

    /// Resolve the byte order of an element of `size` bytes.
    ///
    /// Single byte elements have no byte order, and multi-byte elements without an explicit byte order use the native byte order.
    #[must_use]
    pub const fn for_size(self, size: usize) -> Self {
        match (size, self) {
            (0 | 1, _) => Self::NotApplicable,
            (_, Self::NotApplicable) => Self::native(),
            (_, byte_order) => byte_order,
        }
    }
}

/// A native data type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NativeDType {
    /// A boolean (`|b1`).
    Bool,
    /// A signed integer (`i`).
    Int {
        /// The size in bytes.
        size: usize,
        /// The byte order.
        byte_order: ByteOrder,
    },
    /// An unsigned integer (`u`).
    UInt {
        /// The size in bytes.
        size: usize,
        /// The byte order.
        byte_order: ByteOrder,
    },
    /// An IEEE 754 floating point number (`f`).
    Float {
        /// The size in bytes.
        size: usize,
        /// The byte order.
        byte_order: ByteOrder,
    },
    /// A complex number (`c`).
    Complex {
        /// The size in bytes of the real and imaginary components together.
        size: usize,
        /// The byte order.
        byte_order: ByteOrder,
    },
    /// A fixed length byte string (`S`).
    Bytes {
        /// The length in bytes.
        length: usize,
    },
    /// A fixed length UCS4 string (`U`).
    Unicode {
        /// The length in code points.
        length: usize,
        /// The byte order.
        byte_order: ByteOrder,
    },
    /// A fixed length opaque byte sequence (`V`).
    Void {
        /// The length in bytes.
        length: usize,
    },
    /// A Python object (`O`).
    Object,
    /// A datetime (`M8`).
    DateTime64 {
        /// The time unit.
        unit: NumpyTimeUnit,
        /// The multiple of the time unit.
        scale_factor: NonZeroU32,
        /// The byte order.
        byte_order: ByteOrder,
    },
    /// A structured (compound) data type, with fields in declaration order.
    Structured(Vec<(String, NativeDType)>),
}

/// An invalid native data type error.
#[derive(Clone, Debug, Error)]
#[error("invalid native data type {_0}")]
pub struct NativeDTypeParseError(String);

impl NativeDTypeParseError {
    fn new(input: impl core::fmt::Display) -> Self {
        Self(input.to_string())
    }
}

impl NativeDType {
    /// Create a signed integer data type with the byte order resolved for its size.
    #[must_use]
    pub const fn int(size: usize, byte_order: ByteOrder) -> Self {
        Self::Int {
            size,
            byte_order: byte_order.for_size(size),
        }
    }

    /// Create an unsigned integer data type with the byte order resolved for its size.
    #[must_use]
    pub const fn uint(size: usize, byte_order: ByteOrder) -> Self {
        Self::UInt {
            size,
            byte_order: byte_order.for_size(size),
        }
    }

    /// Create a float data type with the byte order resolved for its size.
    #[must_use]
    pub const fn float(size: usize, byte_order: ByteOrder) -> Self {
        Self::Float {
            size,
            byte_order: byte_order.for_size(size),
        }
    }

    /// Create a complex data type with the byte order resolved for its size.
    #[must_use]
    pub const fn complex(size: usize, byte_order: ByteOrder) -> Self {
        Self::Complex {
            size,
            byte_order: byte_order.for_size(size),
        }
    }

    /// The size of an element in bytes.
    #[must_use]
    pub fn item_size(&self) -> usize {
        match self {
            Self::Bool => 1,
            Self::Int { size, .. }
            | Self::UInt { size, .. }
            | Self::Float { size, .. }
            | Self::Complex { size, .. } => *size,
            Self::Bytes { length } | Self::Void { length } => *length,
            Self::Unicode { length, .. } => length * 4,
            Self::Object | Self::DateTime64 { .. } => 8,
            Self::Structured(fields) => fields.iter().map(|(_, field)| field.item_size()).sum(),
        }
    }

    /// The `NumPy` kind character.
    #[must_use]
    pub const fn kind_char(&self) -> char {
        match self {
            Self::Bool => 'b',
            Self::Int { .. } => 'i',
            Self::UInt { .. } => 'u',
            Self::Float { .. } => 'f',
            Self::Complex { .. } => 'c',
            Self::Bytes { .. } => 'S',
            Self::Unicode { .. } => 'U',
            Self::Void { .. } | Self::Structured(_) => 'V',
            Self::Object => 'O',
            Self::DateTime64 { .. } => 'M',
        }
    }

    /// Returns true if the data type is or contains a Python object.
    #[must_use]
    pub fn has_object(&self) -> bool {
        match self {
            Self::Object => true,
            Self::Structured(fields) => fields.iter().any(|(_, field)| field.has_object()),
            _ => false,
        }
    }

    /// The byte order of the data type.
    #[must_use]
    pub fn byte_order(&self) -> ByteOrder {
        match self {
            Self::Int { byte_order, .. }
            | Self::UInt { byte_order, .. }
            | Self::Float { byte_order, .. }
            | Self::Complex { byte_order, .. }
            | Self::Unicode { byte_order, .. }
            | Self::DateTime64 { byte_order, .. } => *byte_order,
            _ => ByteOrder::NotApplicable,
        }
    }

    /// The type string of the data type.
    ///
    /// Structured data types render as `|V{item_size}`.
    #[must_use]
    pub fn typestr(&self) -> String {
        let order = self.byte_order().as_char();
        let kind = self.kind_char();
        match self {
            Self::Bool => "|b1".to_string(),
            Self::Int { size, .. }
            | Self::UInt { size, .. }
            | Self::Float { size, .. }
            | Self::Complex { size, .. } => format!("{order}{kind}{size}"),
            Self::Bytes { length } | Self::Void { length } | Self::Unicode { length, .. } => {
                format!("{order}{kind}{length}")
            }
            Self::Object => "|O".to_string(),
            Self::DateTime64 {
                unit: NumpyTimeUnit::Generic,
                ..
            } => format!("{order}M8"),
            Self::DateTime64 {
                unit, scale_factor, ..
            } => {
                if scale_factor.get() == 1 {
                    format!("{order}M8[{unit}]")
                } else {
                    format!("{order}M8[{scale_factor}{unit}]")
                }
            }
            Self::Structured(_) => format!("|V{}", self.item_size()),
        }
    }

    /// The Zarr V2 `dtype` metadata of the data type.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Structured(fields) => Value::Array(
                fields
                    .iter()
                    .map(|(name, field)| Value::Array(vec![Value::from(name.as_str()), field.to_json()]))
                    .collect(),
            ),
            _ => Value::String(self.typestr()),
        }
    }

    /// Parse Zarr V2 `dtype` metadata.
    ///
    /// # Errors
    /// Returns [`NativeDTypeParseError`] if `json` is not a valid type string or list of `[name, dtype]` pairs.
    pub fn from_json(json: &Value) -> Result<Self, NativeDTypeParseError> {
        match json {
            Value::String(typestr) => typestr.parse(),
            Value::Array(fields) => {
                let fields = fields
                    .iter()
                    .map(|field| match field.as_array().map(Vec::as_slice) {
                        Some([Value::String(name), dtype]) => {
                            Ok((name.clone(), Self::from_json(dtype)?))
                        }
                        _ => Err(NativeDTypeParseError::new(json)),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                if fields.is_empty() {
                    Err(NativeDTypeParseError::new(json))
                } else {
                    Ok(Self::Structured(fields))
                }
            }
            _ => Err(NativeDTypeParseError::new(json)),
        }
    }

    fn from_shorthand(s: &str) -> Option<Self> {
        let native = ByteOrder::native();
        Some(match s {
            "bool" | "?" => Self::Bool,
            "int8" => Self::int(1, native),
            "int16" => Self::int(2, native),
            "int32" => Self::int(4, native),
            "int64" => Self::int(8, native),
            "uint8" => Self::uint(1, native),
            "uint16" => Self::uint(2, native),
            "uint32" => Self::uint(4, native),
            "uint64" => Self::uint(8, native),
            "float16" => Self::float(2, native),
            "float32" => Self::float(4, native),
            "float64" => Self::float(8, native),
            "complex64" => Self::complex(8, native),
            "complex128" => Self::complex(16, native),
            "object" => Self::Object,
            _ => return None,
        })
    }
}

fn parse_datetime64(body: &str, byte_order: ByteOrder) -> Option<NativeDType> {
    let rest = body.strip_prefix('8').unwrap_or(body);
    let (unit, scale_factor) = if rest.is_empty() {
        (NumpyTimeUnit::Generic, NonZeroU32::MIN)
    } else {
        let inner = rest.strip_prefix('[')?.strip_suffix(']')?;
        let digits = inner.find(|c: char| !c.is_ascii_digit()).unwrap_or(inner.len());
        let scale_factor = if digits == 0 {
            NonZeroU32::MIN
        } else {
            inner[..digits].parse().ok()?
        };
        (inner[digits..].parse().ok()?, scale_factor)
    };
    Some(NativeDType::DateTime64 {
        unit,
        scale_factor,
        byte_order: byte_order.for_size(8),
    })
}

impl core::str::FromStr for NativeDType {
    type Err = NativeDTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(dtype) = Self::from_shorthand(s) {
            return Ok(dtype);
        }
        let err = || NativeDTypeParseError::new(s);
        let (byte_order, rest) = match s.chars().next() {
            Some('<') => (ByteOrder::Little, &s[1..]),
            Some('>') => (ByteOrder::Big, &s[1..]),
            Some('|' | '=') => (ByteOrder::NotApplicable, &s[1..]),
            _ => (ByteOrder::NotApplicable, s),
        };
        let mut chars = rest.chars();
        let kind = chars.next().ok_or_else(err)?;
        let body = chars.as_str();
        let size = || body.parse::<usize>().map_err(|_| err());
        let dtype = match kind {
            'b' | '?' if body.is_empty() || body == "1" => Self::Bool,
            'i' | 'u' => {
                let size = size()?;
                if !matches!(size, 1 | 2 | 4 | 8) {
                    return Err(err());
                }
                if kind == 'i' {
                    Self::int(size, byte_order)
                } else {
                    Self::uint(size, byte_order)
                }
            }
            'f' => match size()? {
                size @ (2 | 4 | 8) => Self::float(size, byte_order),
                _ => return Err(err()),
            },
            'c' => match size()? {
                size @ (8 | 16) => Self::complex(size, byte_order),
                _ => return Err(err()),
            },
            'S' => Self::Bytes { length: size()? },
            'V' => Self::Void { length: size()? },
            'U' => Self::Unicode {
                length: size()?,
                byte_order: byte_order.for_size(4),
            },
            'O' if body.is_empty() || body == "8" => Self::Object,
            'M' => parse_datetime64(body, byte_order).ok_or_else(err)?,
            _ => return Err(err()),
        };
        Ok(dtype)
    }
}

impl core::fmt::Display for NativeDType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Structured(_) => write!(f, "{}", self.to_json()),
            _ => write!(f, "{}", self.typestr()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_dtype_typestr() {
        for typestr in [
            "|b1", "|i1", "<i4", ">u8", "<f2", ">c16", "|S4", "|V16", "<U3", "|O", "<M8[s]",
            ">M8[10ms]", "<M8",
        ] {
            let dtype: NativeDType = typestr.parse().unwrap();
            assert_eq!(dtype.typestr(), typestr);
        }
    }

    #[test]
    fn native_dtype_byte_order_resolution() {
        assert_eq!(
            "<i1".parse::<NativeDType>().unwrap(),
            NativeDType::Int {
                size: 1,
                byte_order: ByteOrder::NotApplicable
            }
        );
        assert_eq!(
            "=f8".parse::<NativeDType>().unwrap(),
            NativeDType::float(8, ByteOrder::native())
        );
        assert_eq!(
            "int32".parse::<NativeDType>().unwrap(),
            "i4".parse::<NativeDType>().unwrap()
        );
    }

    #[test]
    fn native_dtype_invalid() {
        for typestr in ["", "<i3", "<f1", "<c4", "|Sx", "<M8[s", "<M8[0s]", "<M8[fortnight]", "x4"] {
            assert!(typestr.parse::<NativeDType>().is_err(), "{typestr}");
        }
    }

    #[test]
    fn native_dtype_structured() {
        let json = serde_json::json!([["a", "<i4"], ["b", [["c", "|S2"]]]]);
        let dtype = NativeDType::from_json(&json).unwrap();
        assert_eq!(dtype.item_size(), 6);
        assert_eq!(dtype.typestr(), "|V6");
        assert_eq!(dtype.kind_char(), 'V');
        assert!(!dtype.has_object());
        assert_eq!(dtype.to_json(), json);
        assert_eq!(dtype.to_string(), r#"[["a","<i4"],["b",[["c","|S2"]]]]"#);

        assert!(NativeDType::from_json(&serde_json::json!([])).is_err());
        assert!(NativeDType::from_json(&serde_json::json!([["a"]])).is_err());
        assert!(NativeDType::from_json(&serde_json::json!(4)).is_err());
    }
}
