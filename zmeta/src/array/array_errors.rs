use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use zmeta_data_type::DataTypeMatchError;
use zmeta_plugin::PluginCreateError;

use super::{ChunkKeySeparatorError, MemoryOrderError};
use crate::config::ConfigError;

/// A Zarr V2 array metadata error.
#[derive(Clone, Debug, Error)]
pub enum ArrayMetadataV2Error {
    /// The shape and chunk shape have different lengths.
    #[error(
        "The `shape` and `chunks` attributes must have the same length. `chunks` has length {chunks}, but `shape` has length {shape}."
    )]
    ShapeMismatch {
        /// The length of the chunk shape.
        chunks: usize,
        /// The length of the shape.
        shape: usize,
    },
    /// A shape is not a sequence of non-negative integers.
    #[error("expected a sequence of non-negative integers, got {_0}")]
    InvalidShape(Value),
    /// The document is not a Zarr V2 document.
    #[error("invalid value for 'zarr_format'. Expected '2'. Got '{_0}'.")]
    InvalidZarrFormat(Value),
    /// A required key is missing.
    #[error("the array metadata document has no {_0:?} key")]
    MissingKey(&'static str),
    /// The stored data type is not a data type descriptor.
    #[error("invalid data type {_0}")]
    InvalidDataType(String),
    /// The stored data type does not resolve to one data type wrapper.
    #[error(transparent)]
    DataType(#[from] DataTypeMatchError),
    /// Invalid memory order.
    #[error(transparent)]
    InvalidOrder(#[from] MemoryOrderError),
    /// Invalid dimension separator.
    #[error(transparent)]
    InvalidSeparator(#[from] ChunkKeySeparatorError),
    /// The fill value is not valid for the data type.
    #[error("Fill_value {fill_value} is not valid for dtype {data_type}.")]
    FillValue {
        /// The fill value.
        fill_value: String,
        /// The data type name.
        data_type: String,
    },
    /// A codec configuration is not valid codec metadata.
    #[error("invalid codec configuration {_0}")]
    InvalidCodec(Value),
    /// A codec could not be created.
    #[error(transparent)]
    Codec(#[from] PluginCreateError),
    /// The filters are neither a list of codec configurations nor null.
    #[error("expected a list of codec configurations or null for filters, got {_0}")]
    InvalidFilters(Value),
    /// The attributes are not an object.
    #[error("expected an object for attributes, got {_0}")]
    InvalidAttributes(Value),
    /// A configuration value is missing or invalid.
    #[error(transparent)]
    Config(Arc<ConfigError>),
    /// The document is not valid JSON.
    #[error("invalid array metadata JSON: {_0}")]
    Json(String),
}

impl From<ConfigError> for ArrayMetadataV2Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(Arc::new(err))
    }
}
