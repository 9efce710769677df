use zmeta_data_type::{DataType, Scalar};

use super::{ArrayShape, MemoryOrder};
use crate::{
    buffer::BufferPrototype,
    config::{Config, ConfigError},
};

/// The runtime configuration of array chunk operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArrayConfig {
    /// The memory layout of decoded chunks.
    pub order: MemoryOrder,
    /// Write chunks that hold only the fill value.
    pub write_empty_chunks: bool,
}

impl ArrayConfig {
    /// Create a new array configuration.
    #[must_use]
    pub const fn new(order: MemoryOrder, write_empty_chunks: bool) -> Self {
        Self {
            order,
            write_empty_chunks,
        }
    }

    /// Read the array configuration from `array.order` and `array.write_empty_chunks`.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if either key is missing or invalid.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            order: config.get_as("array.order")?,
            write_empty_chunks: config.get_as("array.write_empty_chunks")?,
        })
    }
}

/// The specification of one chunk of an array, handed to a codec pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ArraySpec {
    shape: ArrayShape,
    data_type: DataType,
    fill_value: Option<Scalar>,
    config: ArrayConfig,
    prototype: BufferPrototype,
}

impl ArraySpec {
    /// Create a new chunk specification.
    #[must_use]
    pub fn new(
        shape: ArrayShape,
        data_type: DataType,
        fill_value: Option<Scalar>,
        config: ArrayConfig,
        prototype: BufferPrototype,
    ) -> Self {
        Self {
            shape,
            data_type,
            fill_value,
            config,
            prototype,
        }
    }

    /// The chunk shape.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    /// The data type.
    #[must_use]
    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    /// The fill value.
    #[must_use]
    pub fn fill_value(&self) -> Option<&Scalar> {
        self.fill_value.as_ref()
    }

    /// The runtime configuration.
    #[must_use]
    pub const fn config(&self) -> &ArrayConfig {
        &self.config
    }

    /// The buffer prototype.
    #[must_use]
    pub fn prototype(&self) -> &BufferPrototype {
        &self.prototype
    }

    /// The number of dimensions.
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn array_config_from_config() {
        let mut config = Config::new();
        assert_eq!(
            ArrayConfig::from_config(&config).unwrap(),
            ArrayConfig::new(MemoryOrder::C, false)
        );
        config
            .set(&json!({"array": {"order": "F", "write_empty_chunks": true}}))
            .unwrap();
        assert_eq!(
            ArrayConfig::from_config(&config).unwrap(),
            ArrayConfig::new(MemoryOrder::F, true)
        );
        config.set(&json!({"array.order": "Z"})).unwrap();
        assert!(ArrayConfig::from_config(&config).is_err());
    }
}
