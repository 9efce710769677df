use num::complex::{Complex32, Complex64};

/// A scalar value of a data type.
///
/// Scalars are the in-memory form of fill values and other single elements.
/// A data type wrapper converts a scalar to and from its JSON form with [`DataTypeTraits::to_json_value`](crate::DataTypeTraits::to_json_value)
/// and [`DataTypeTraits::from_json_value`](crate::DataTypeTraits::from_json_value).
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// An unsigned integer.
    UInt(u64),
    /// A floating point number.
    Float(f64),
    /// A complex number.
    Complex(Complex64),
    /// A byte string.
    Bytes(Vec<u8>),
    /// A string.
    String(String),
    /// A structured record, with fields in declaration order.
    Struct(Vec<(String, Scalar)>),
    /// A datetime offset from the Unix epoch in the units of its data type. [`Scalar::NAT`] is not-a-time.
    DateTime64(i64),
}

macro_rules! impl_scalar_from {
    ($variant:ident, $($t:ty),+) => {
        $(
            impl From<$t> for Scalar {
                fn from(value: $t) -> Self {
                    Self::$variant(value.into())
                }
            }
        )+
    };
}

impl_scalar_from!(Bool, bool);
impl_scalar_from!(Int, i8, i16, i32, i64);
impl_scalar_from!(UInt, u8, u16, u32, u64);
impl_scalar_from!(Float, f32, f64);
impl_scalar_from!(Complex, Complex64);
impl_scalar_from!(Bytes, Vec<u8>, &[u8]);
impl_scalar_from!(String, String, &str);
impl_scalar_from!(Struct, Vec<(String, Scalar)>);

impl From<Complex32> for Scalar {
    fn from(value: Complex32) -> Self {
        Self::Complex(Complex64::new(f64::from(value.re), f64::from(value.im)))
    }
}

impl Scalar {
    /// The not-a-time datetime.
    pub const NAT: Self = Self::DateTime64(i64::MIN);

    /// Returns true if the scalar is a numeric zero (or `false`).
    ///
    /// Byte strings, strings, records, and datetimes are never zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Bool(b) => !b,
            Self::Int(i) => *i == 0,
            Self::UInt(u) => *u == 0,
            Self::Float(f) => *f == 0.0,
            Self::Complex(c) => c.re == 0.0 && c.im == 0.0,
            Self::Bytes(_) | Self::String(_) | Self::Struct(_) | Self::DateTime64(_) => false,
        }
    }

    /// Returns true if the scalar is the not-a-time datetime.
    #[must_use]
    pub fn is_nat(&self) -> bool {
        matches!(self, Self::DateTime64(i64::MIN))
    }

    /// Returns the value as an [`f64`] if the scalar is real-valued numeric.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Bool(b) => Some(f64::from(u8::from(*b))),
            Self::Int(i) => Some(*i as f64),
            Self::UInt(u) => Some(*u as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the value as a string slice if the scalar is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        if let Self::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    /// Returns the value as a byte slice if the scalar is a byte string.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        if let Self::Bytes(b) = self {
            Some(b)
        } else {
            None
        }
    }
}

impl core::fmt::Display for Scalar {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::UInt(u) => write!(f, "{u}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Complex(c) => write!(f, "({}{:+}j)", c.re, c.im),
            Self::Bytes(b) => write!(f, "b\"{}\"", b.escape_ascii()),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Struct(fields) => {
                write!(f, "(")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                write!(f, ")")
            }
            Self::DateTime64(i64::MIN) => write!(f, "NaT"),
            Self::DateTime64(v) => write!(f, "datetime64({v})"),
        }
    }
}
