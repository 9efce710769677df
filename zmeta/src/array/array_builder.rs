use serde_json::{Map, Value};
use zmeta_data_type::{DataType, Scalar};
use zmeta_plugin::ZarrFormat;

use super::{
    ArrayMetadataV2, ArrayMetadataV2Error, ArrayShape, ChunkKeySeparator, CodecInput, MemoryOrder,
};
use crate::config::{categorize_data_type, global_config};

/// A builder of [`ArrayMetadataV2`].
///
/// Unspecified codecs and memory order are taken from the global configuration when the metadata is built:
/// `array.order`, and the `array.v2_default_compressor` and `array.v2_default_filters` of the data type category.
///
/// ```
/// # use zmeta::array::{ArrayMetadataV2Builder, ChunkKeySeparator};
/// # use zmeta::data_type::{DataType, NativeDType, Scalar};
/// let data_type = DataType::from_native(&"|u1".parse::<NativeDType>()?)?;
/// let metadata = ArrayMetadataV2Builder::new(vec![256, 256], vec![64, 64], data_type)
///     .fill_value(Some(Scalar::UInt(255)))
///     .dimension_separator(ChunkKeySeparator::Slash)
///     .build()?;
/// assert_eq!(metadata.to_dict()["compressor"]["id"], "zstd");
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct ArrayMetadataV2Builder {
    shape: ArrayShape,
    chunks: ArrayShape,
    data_type: DataType,
    fill_value: Option<Option<Scalar>>,
    order: Option<MemoryOrder>,
    dimension_separator: ChunkKeySeparator,
    compressor: Option<Option<CodecInput>>,
    filters: Option<Option<Vec<CodecInput>>>,
    attributes: Map<String, Value>,
}

impl ArrayMetadataV2Builder {
    /// Create a new Zarr V2 array metadata builder.
    #[must_use]
    pub fn new(shape: ArrayShape, chunks: ArrayShape, data_type: DataType) -> Self {
        Self {
            shape,
            chunks,
            data_type,
            fill_value: None,
            order: None,
            dimension_separator: ChunkKeySeparator::Dot,
            compressor: None,
            filters: None,
            attributes: Map::new(),
        }
    }

    /// Set the shape.
    pub fn shape(&mut self, shape: ArrayShape) -> &mut Self {
        self.shape = shape;
        self
    }

    /// Set the chunk shape.
    pub fn chunks(&mut self, chunks: ArrayShape) -> &mut Self {
        self.chunks = chunks;
        self
    }

    /// Set the data type.
    pub fn data_type(&mut self, data_type: DataType) -> &mut Self {
        self.data_type = data_type;
        self
    }

    /// Set the fill value. [`None`] stores a null fill value.
    ///
    /// If left unmodified, the fill value is the zero value of the data type.
    pub fn fill_value(&mut self, fill_value: Option<Scalar>) -> &mut Self {
        self.fill_value = Some(fill_value);
        self
    }

    /// Set the memory order of chunks.
    ///
    /// If left unmodified, the memory order is `array.order` from the global configuration.
    pub fn order(&mut self, order: MemoryOrder) -> &mut Self {
        self.order = Some(order);
        self
    }

    /// Set the chunk key separator.
    ///
    /// If left unmodified, the chunk key separator is `.`.
    pub fn dimension_separator(&mut self, dimension_separator: ChunkKeySeparator) -> &mut Self {
        self.dimension_separator = dimension_separator;
        self
    }

    /// Set the compressor. [`None`] stores no compressor.
    ///
    /// If left unmodified, the compressor is the default compressor of the data type category from the global configuration.
    pub fn compressor(&mut self, compressor: Option<CodecInput>) -> &mut Self {
        self.compressor = Some(compressor);
        self
    }

    /// Set the filters. [`None`] stores no filters.
    ///
    /// If left unmodified, the filters are the default filters of the data type category from the global configuration.
    pub fn filters(&mut self, filters: Option<Vec<CodecInput>>) -> &mut Self {
        self.filters = Some(filters);
        self
    }

    /// Set the user attributes.
    ///
    /// If left unmodified, the user attributes are empty.
    pub fn attributes(&mut self, attributes: Map<String, Value>) -> &mut Self {
        self.attributes = attributes;
        self
    }

    /// Build the metadata.
    ///
    /// # Errors
    /// Returns [`ArrayMetadataV2Error`] if a configuration default is invalid or [`ArrayMetadataV2::new`] fails.
    pub fn build(&self) -> Result<ArrayMetadataV2, ArrayMetadataV2Error> {
        let (order, compressor, filters) = {
            let config = global_config();
            let category = categorize_data_type(&self.data_type);
            let order = match self.order {
                Some(order) => order,
                None => config.get_as("array.order")?,
            };
            let compressor = match &self.compressor {
                Some(compressor) => compressor.clone(),
                None => config
                    .default_compressor(category, ZarrFormat::V2)?
                    .into_iter()
                    .next()
                    .map(CodecInput::from),
            };
            let filters = match &self.filters {
                Some(filters) => filters.clone(),
                None => config
                    .default_filters(category, ZarrFormat::V2)?
                    .map(|filters| filters.into_iter().map(CodecInput::from).collect()),
            };
            (order, compressor, filters)
        };
        let fill_value = self
            .fill_value
            .clone()
            .unwrap_or_else(|| Some(self.data_type.zero_value()));
        ArrayMetadataV2::new(
            self.shape.clone(),
            self.chunks.clone(),
            self.data_type.clone(),
            fill_value,
            order,
            self.dimension_separator,
            compressor,
            filters,
            self.attributes.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use zmeta_data_type::{ByteOrder, Float32DataType, VariableLengthStringDataType};

    use super::*;
    use crate::codec::{Codec, GzipCodec};

    #[test]
    fn array_builder_defaults() {
        let data_type = DataType::new(Float32DataType::new(ByteOrder::Little));
        let metadata = ArrayMetadataV2Builder::new(vec![8, 8], vec![4, 4], data_type)
            .build()
            .unwrap();
        let dict = metadata.to_dict();
        assert_eq!(dict["dtype"], json!("<f4"));
        assert_eq!(dict["fill_value"], json!(0.0));
        assert_eq!(dict["order"], json!("C"));
        assert_eq!(dict["compressor"], json!({"id": "zstd", "level": 0}));
        assert_eq!(dict["filters"], Value::Null);

        let metadata = ArrayMetadataV2Builder::new(
            vec![8],
            vec![4],
            DataType::new(VariableLengthStringDataType),
        )
        .build()
        .unwrap();
        assert_eq!(metadata.to_dict()["filters"], json!([{"id": "vlen-utf8"}]));
    }

    #[test]
    fn array_builder_explicit() {
        let data_type = DataType::new(Float32DataType::new(ByteOrder::Big));
        let gzip = Codec::new(GzipCodec::new(5).unwrap());
        let mut builder = ArrayMetadataV2Builder::new(vec![8, 8], vec![4, 4], data_type);
        builder
            .fill_value(None)
            .order(MemoryOrder::F)
            .dimension_separator(ChunkKeySeparator::Slash)
            .compressor(Some(gzip.into()))
            .filters(Some(vec![]));
        let metadata = builder.build().unwrap();
        assert_eq!(metadata.fill_value(), None);
        assert_eq!(metadata.order(), MemoryOrder::F);
        assert_eq!(metadata.filters(), None);
        assert_eq!(
            metadata.to_dict()["compressor"],
            json!({"id": "gzip", "level": 5})
        );
        assert_eq!(metadata.encode_chunk_key(&[1, 0]), "1/0");

        assert!(matches!(
            builder.chunks(vec![4]).build(),
            Err(ArrayMetadataV2Error::ShapeMismatch { chunks: 1, shape: 2 })
        ));
    }
}
