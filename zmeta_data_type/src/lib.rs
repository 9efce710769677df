//! Zarr data types for the `zmeta` crates.
//!
//! A data type *wrapper* bridges a native (`NumPy`-style) data type ([`NativeDType`]) and its Zarr V2 and Zarr V3 JSON forms,
//! and encodes [`Scalar`] values such as fill values to and from JSON.
//!
//! Wrappers implement [`DataTypeTraits`] and [`DataTypeWrapper`], and are handled through the type-erased [`DataType`].
//! The [`DataTypeRegistry`] resolves native data types and data type metadata to exactly one wrapper.
//!
//! ```
//! # use zmeta_data_type::{DataType, NativeDType, Scalar};
//! # use zmeta_plugin::ZarrFormat;
//! let native: NativeDType = "<f4".parse()?;
//! let data_type = DataType::from_native(&native)?;
//! assert_eq!(data_type.to_json(ZarrFormat::V3), "float32");
//! assert_eq!(
//!     data_type.to_json_value(&Scalar::Float(f64::NAN), ZarrFormat::V2)?,
//!     "NaN"
//! );
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Licence
//! `zmeta_data_type` is licensed under either of
//!  - the Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> or
//!  - the MIT license <http://opensource.org/licenses/MIT>, at your option.

mod data_type;
pub mod json;
mod native;
mod registry;
mod scalar;
mod time_unit;

pub use data_type::{
    BoolDataType, Complex64DataType, Complex128DataType, DataType, DataTypeKind, DataTypeSize,
    DataTypeTraits, DataTypeValidationError, DataTypeWrapper, FixedLengthAsciiDataType,
    FixedLengthBytesDataType, FixedLengthUtf32DataType, Float16DataType, Float32DataType,
    Float64DataType, Int8DataType, Int16DataType, Int32DataType, Int64DataType,
    NumpyDateTime64DataType, ScalarError, StructuredDataType, UInt8DataType, UInt16DataType,
    UInt32DataType, UInt64DataType, VariableLengthStringDataType,
};
pub use native::{ByteOrder, NativeDType, NativeDTypeParseError};
pub use registry::{
    DataTypeEntryPoint, DataTypeMatchError, DataTypeNotFoundError, DataTypePlugin,
    DataTypeRegistry, clear_discovered_data_types, data_type_registry, discover_data_types,
    get_data_type_from_json, get_data_type_from_native, register_data_type, unregister_data_type,
};
pub use scalar::Scalar;
pub use time_unit::{NumpyTimeConversionError, NumpyTimeUnit, NumpyTimeUnitParseError};
