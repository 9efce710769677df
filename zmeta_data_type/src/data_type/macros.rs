//! Macros for implementing fixed size numeric data type wrappers.

/// Define a fixed size numeric data type wrapper carrying a byte order.
///
/// Generates the struct, its constructors, and its [`DataTypeWrapper`](crate::DataTypeWrapper) implementation.
/// The Zarr V2 name is the type string of the native data type, and the Zarr V3 name is the identifier.
macro_rules! numeric_data_type {
    ($doc:literal, $name:ident, $identifier:literal, $native:ident, $size:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name {
            byte_order: $crate::ByteOrder,
        }

        impl $name {
            /// Create a new data type with the given byte order.
            ///
            /// The byte order is not applicable to single byte data types and [`ByteOrder::NotApplicable`](crate::ByteOrder::NotApplicable)
            /// resolves to the native byte order for multi-byte data types.
            #[must_use]
            pub const fn new(byte_order: $crate::ByteOrder) -> Self {
                Self {
                    byte_order: byte_order.for_size($size),
                }
            }

            /// The byte order of the data type.
            #[must_use]
            pub const fn byte_order(&self) -> $crate::ByteOrder {
                self.byte_order
            }

            fn native(&self) -> $crate::NativeDType {
                $crate::NativeDType::$native {
                    size: $size,
                    byte_order: self.byte_order,
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new($crate::ByteOrder::Little)
            }
        }

        impl $crate::DataTypeWrapper for $name {
            const IDENTIFIER: &'static str = $identifier;

            fn from_native(
                native: &$crate::NativeDType,
            ) -> Result<Self, $crate::DataTypeValidationError> {
                match native {
                    $crate::NativeDType::$native {
                        size: $size,
                        byte_order,
                    } if *byte_order == byte_order.for_size($size) => Ok(Self::new(*byte_order)),
                    _ => Err($crate::DataTypeValidationError::native($identifier, native)),
                }
            }

            fn from_json(
                json: &serde_json::Value,
                version: zmeta_plugin::ZarrFormat,
            ) -> Result<Self, $crate::DataTypeValidationError> {
                let err = || $crate::DataTypeValidationError::json($identifier, json, version);
                match (version, json.as_str()) {
                    (zmeta_plugin::ZarrFormat::V2, Some(typestr)) => {
                        let native = typestr
                            .parse::<$crate::NativeDType>()
                            .map_err(|_| err())?;
                        Self::from_native(&native).map_err(|_| err())
                    }
                    (zmeta_plugin::ZarrFormat::V3, Some($identifier)) => Ok(Self::default()),
                    _ => Err(err()),
                }
            }
        }
    };
}

/// Implement the [`DataTypeTraits`](crate::DataTypeTraits) methods shared by wrappers defined with `numeric_data_type`.
macro_rules! data_type_traits_common {
    ($kind:ident, $size:expr) => {
        fn identifier(&self) -> &'static str {
            <Self as $crate::DataTypeWrapper>::IDENTIFIER
        }

        fn name(&self, version: zmeta_plugin::ZarrFormat) -> String {
            match version {
                zmeta_plugin::ZarrFormat::V2 => self.native().typestr(),
                zmeta_plugin::ZarrFormat::V3 => {
                    <Self as $crate::DataTypeWrapper>::IDENTIFIER.to_string()
                }
            }
        }

        fn to_native(&self) -> $crate::NativeDType {
            self.native()
        }

        fn to_json(&self, version: zmeta_plugin::ZarrFormat) -> serde_json::Value {
            serde_json::Value::String(self.name(version))
        }

        fn kind(&self) -> $crate::DataTypeKind {
            $crate::DataTypeKind::$kind
        }

        fn size(&self) -> $crate::DataTypeSize {
            $crate::DataTypeSize::Fixed($size)
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    };
}

pub(crate) use {data_type_traits_common, numeric_data_type};
