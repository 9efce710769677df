use std::collections::HashMap;

use derive_more::From;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, ser::PrettyFormatter};
use zmeta_data_type::{DataType, DataTypeKind, NativeDType, Scalar};
use zmeta_plugin::ZarrFormat;

use super::{
    ArrayConfig, ArrayMetadataV2Error, ArrayShape, ArraySpec, ChunkKeySeparator,
    ChunkKeySeparatorError, MemoryOrder, MemoryOrderError, ZARRAY_JSON, ZATTRS_JSON,
};
use crate::{
    buffer::{Buffer, BufferPrototype},
    codec::{Codec, CodecMetadata},
    config::global_config,
};

/// The keys of a stored Zarr V2 array metadata document.
const FIELDS: [&str; 10] = [
    "shape",
    "chunks",
    "dtype",
    "fill_value",
    "order",
    "filters",
    "dimension_separator",
    "compressor",
    "attributes",
    "zarr_format",
];

/// A compressor or filter, either instantiated or as a codec configuration.
#[derive(Debug, Clone, From)]
pub enum CodecInput {
    /// An instantiated codec.
    Codec(Codec),
    /// A codec configuration, resolved through the codec registry.
    Metadata(CodecMetadata),
}

impl CodecInput {
    fn into_codec(self) -> Result<Codec, ArrayMetadataV2Error> {
        match self {
            Self::Codec(codec) => Ok(codec),
            Self::Metadata(metadata) => Ok(Codec::from_metadata(&metadata)?),
        }
    }
}

/// Zarr V2 array metadata.
///
/// An instance is fully validated: the shape and chunk shape have the same length,
/// every codec is resolved, and the fill value is a valid value of the data type.
///
/// Stored as the `.zarray` document:
/// ```json
/// {
///     "shape": [10000, 10000],
///     "chunks": [1000, 1000],
///     "dtype": "<f8",
///     "fill_value": "NaN",
///     "order": "C",
///     "filters": null,
///     "dimension_separator": ".",
///     "compressor": {
///         "id": "blosc",
///         "cname": "lz4",
///         "clevel": 5,
///         "shuffle": 1,
///         "blocksize": 0
///     },
///     "zarr_format": 2
/// }
/// ```
/// with the user attributes in a sibling `.zattrs` document.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayMetadataV2 {
    shape: ArrayShape,
    chunks: ArrayShape,
    data_type: DataType,
    fill_value: Option<Scalar>,
    fill_value_json: Value,
    order: MemoryOrder,
    dimension_separator: ChunkKeySeparator,
    compressor: Option<Codec>,
    filters: Option<Vec<Codec>>,
    attributes: Map<String, Value>,
}

impl ArrayMetadataV2 {
    /// Create new Zarr V2 array metadata.
    ///
    /// Codec configurations are resolved through the codec registry.
    /// An empty list of `filters` is stored as no filters, with a warning.
    /// A zero `fill_value` becomes the zero value of the data type.
    ///
    /// # Errors
    /// Returns [`ArrayMetadataV2Error`] if
    ///  - `shape` and `chunks` have different lengths,
    ///  - a codec cannot be created, or
    ///  - `fill_value` is not valid for `data_type`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        shape: ArrayShape,
        chunks: ArrayShape,
        data_type: DataType,
        fill_value: Option<Scalar>,
        order: MemoryOrder,
        dimension_separator: ChunkKeySeparator,
        compressor: Option<CodecInput>,
        filters: Option<Vec<CodecInput>>,
        attributes: Map<String, Value>,
    ) -> Result<Self, ArrayMetadataV2Error> {
        check_shape(&shape, &chunks)?;
        let compressor = compressor.map(CodecInput::into_codec).transpose()?;
        let filters = match filters {
            Some(filters) if filters.is_empty() => {
                log::warn!(
                    "an empty list of filters is not valid Zarr V2 array metadata, storing no filters instead"
                );
                None
            }
            Some(filters) => Some(
                filters
                    .into_iter()
                    .map(CodecInput::into_codec)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            None => None,
        };
        let fill_value = parse_fill_value(fill_value, &data_type)?;
        let fill_value_json = match &fill_value {
            Some(fill_value) => data_type
                .to_json_value(fill_value, ZarrFormat::V2)
                .map_err(|_| fill_value_error(fill_value, &data_type))?,
            None => Value::Null,
        };
        Ok(Self {
            shape,
            chunks,
            data_type,
            fill_value,
            fill_value_json,
            order,
            dimension_separator,
            compressor,
            filters,
            attributes,
        })
    }

    /// Load Zarr V2 array metadata from a stored document.
    ///
    /// `data` is the `.zarray` document, optionally with the user attributes under `attributes`.
    /// Unknown keys are ignored.
    /// A missing `fill_value` is zero, and a missing `order`, `filters`, `dimension_separator`, or `compressor` takes its default.
    ///
    /// # Errors
    /// Returns [`ArrayMetadataV2Error`] if `zarr_format` is not 2, a required key is missing,
    /// the data type does not resolve to exactly one data type wrapper, or the metadata is not valid.
    pub fn from_dict(data: &Map<String, Value>) -> Result<Self, ArrayMetadataV2Error> {
        match data.get("zarr_format") {
            Some(zarr_format) if zarr_format.as_u64() == Some(2) => {}
            zarr_format => {
                return Err(ArrayMetadataV2Error::InvalidZarrFormat(
                    zarr_format.cloned().unwrap_or(Value::Null),
                ));
            }
        }
        for key in data.keys().filter(|key| !FIELDS.contains(&key.as_str())) {
            log::debug!("ignoring unknown key {key:?} in Zarr V2 array metadata");
        }

        let shape = parse_shape(required(data, "shape")?)?;
        let chunks = parse_shape(required(data, "chunks")?)?;

        let dtype = required(data, "dtype")?;
        let native = NativeDType::from_json(dtype)
            .map_err(|err| ArrayMetadataV2Error::InvalidDataType(err.to_string()))?;
        let data_type = DataType::from_native(&native)?;

        let fill_value = match data.get("fill_value") {
            None => Some(Scalar::Int(0)),
            Some(Value::Null) => None,
            Some(fill_value) => Some(
                data_type
                    .from_json_value(fill_value, ZarrFormat::V2)
                    .ok()
                    .or_else(|| {
                        // Fixed-length bytes fill values are base64 encoded.
                        (data_type.kind() != DataTypeKind::Bytes)
                            .then(|| scalar_from_json(fill_value))
                            .flatten()
                    })
                    .ok_or_else(|| ArrayMetadataV2Error::FillValue {
                        fill_value: fill_value.to_string(),
                        data_type: data_type.name(ZarrFormat::V2),
                    })?,
            ),
        };

        let order = match data.get("order") {
            None => MemoryOrder::default(),
            Some(Value::String(order)) => order.parse()?,
            Some(order) => return Err(MemoryOrderError(order.to_string()).into()),
        };
        let dimension_separator = match data.get("dimension_separator") {
            None => ChunkKeySeparator::default(),
            Some(Value::String(separator)) => separator.parse()?,
            Some(separator) => return Err(ChunkKeySeparatorError(separator.to_string()).into()),
        };

        let compressor = match data.get("compressor") {
            None | Some(Value::Null) => None,
            Some(compressor) => Some(CodecInput::from(parse_codec_metadata(compressor)?)),
        };
        let filters = match data.get("filters") {
            None | Some(Value::Null) => None,
            Some(Value::Array(filters)) => Some(
                filters
                    .iter()
                    .map(|filter| parse_codec_metadata(filter).map(CodecInput::from))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Some(filters) => return Err(ArrayMetadataV2Error::InvalidFilters(filters.clone())),
        };
        let attributes = match data.get("attributes") {
            None => Map::new(),
            Some(Value::Object(attributes)) => attributes.clone(),
            Some(attributes) => {
                return Err(ArrayMetadataV2Error::InvalidAttributes(attributes.clone()));
            }
        };

        Self::new(
            shape,
            chunks,
            data_type,
            fill_value,
            order,
            dimension_separator,
            compressor,
            filters,
            attributes,
        )
    }

    /// Load Zarr V2 array metadata from the text of a `.zarray` document.
    ///
    /// # Errors
    /// Returns [`ArrayMetadataV2Error`] if `zarray` is not a JSON object or [`from_dict`](Self::from_dict) fails.
    pub fn from_json_str(zarray: &str) -> Result<Self, ArrayMetadataV2Error> {
        match serde_json::from_str(zarray) {
            Ok(Value::Object(data)) => Self::from_dict(&data),
            Ok(value) => Err(ArrayMetadataV2Error::Json(format!(
                "expected an object, got {value}"
            ))),
            Err(err) => Err(ArrayMetadataV2Error::Json(err.to_string())),
        }
    }

    /// Serialise the metadata to a single JSON object, including the user attributes under `attributes`.
    ///
    /// A `zstd` compressor without a checksum is written without the `checksum` key.
    #[must_use]
    pub fn to_dict(&self) -> Map<String, Value> {
        let mut dict = Map::new();
        dict.insert("shape".to_string(), Value::from(self.shape.clone()));
        dict.insert("chunks".to_string(), Value::from(self.chunks.clone()));
        dict.insert("dtype".to_string(), self.data_type.to_json(ZarrFormat::V2));
        dict.insert("fill_value".to_string(), self.fill_value_json.clone());
        dict.insert("order".to_string(), Value::from(self.order.to_string()));
        dict.insert(
            "filters".to_string(),
            self.filters.as_ref().map_or(Value::Null, |filters| {
                Value::Array(filters.iter().map(codec_to_json).collect())
            }),
        );
        dict.insert(
            "dimension_separator".to_string(),
            Value::from(self.dimension_separator.as_str()),
        );
        dict.insert(
            "compressor".to_string(),
            self.compressor.as_ref().map_or(Value::Null, codec_to_json),
        );
        dict.insert("zarr_format".to_string(), Value::from(2));
        dict.insert(
            "attributes".to_string(),
            Value::Object(self.attributes.clone()),
        );
        dict
    }

    /// Serialise the metadata to the `.zarray` and `.zattrs` documents.
    ///
    /// The documents are indented by `json_indent` spaces from the global configuration, or compact if it is null.
    ///
    /// # Errors
    /// Returns [`ArrayMetadataV2Error`] if `json_indent` is invalid.
    pub fn to_buffer_dict(
        &self,
        prototype: &BufferPrototype,
    ) -> Result<HashMap<String, Buffer>, ArrayMetadataV2Error> {
        let indent = global_config().json_indent()?;
        let mut zarray = self.to_dict();
        let zattrs = zarray
            .remove("attributes")
            .unwrap_or_else(|| Value::Object(Map::new()));
        let zarray = Value::Object(zarray);
        Ok(HashMap::from([
            (
                ZARRAY_JSON.to_string(),
                prototype.buffer().from_bytes(to_json_bytes(&zarray, indent)?),
            ),
            (
                ZATTRS_JSON.to_string(),
                prototype.buffer().from_bytes(to_json_bytes(&zattrs, indent)?),
            ),
        ]))
    }

    /// The Zarr format, always [`ZarrFormat::V2`].
    #[must_use]
    #[allow(clippy::unused_self)]
    pub const fn zarr_format(&self) -> ZarrFormat {
        ZarrFormat::V2
    }

    /// The array shape.
    #[must_use]
    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    /// The chunk shape.
    #[must_use]
    pub fn chunks(&self) -> &[u64] {
        &self.chunks
    }

    /// The number of dimensions.
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.shape.len()
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

    /// The memory order of chunks.
    #[must_use]
    pub const fn order(&self) -> MemoryOrder {
        self.order
    }

    /// The chunk key separator.
    #[must_use]
    pub const fn dimension_separator(&self) -> ChunkKeySeparator {
        self.dimension_separator
    }

    /// The compressor.
    #[must_use]
    pub fn compressor(&self) -> Option<&Codec> {
        self.compressor.as_ref()
    }

    /// The filters.
    #[must_use]
    pub fn filters(&self) -> Option<&[Codec]> {
        self.filters.as_deref()
    }

    /// The user attributes.
    #[must_use]
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// The codecs in encoding order: the filters, then the compressor.
    #[must_use]
    pub fn codecs(&self) -> Vec<Codec> {
        self.filters
            .iter()
            .flatten()
            .chain(self.compressor.iter())
            .cloned()
            .collect()
    }

    /// The shard shape. Zarr V2 arrays are never sharded.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub const fn shards(&self) -> Option<&[u64]> {
        None
    }

    /// Return the specification of the chunk at `chunk_coords`.
    ///
    /// Every chunk of a Zarr V2 array has the chunk shape.
    #[must_use]
    pub fn get_chunk_spec(
        &self,
        _chunk_coords: &[u64],
        config: ArrayConfig,
        prototype: BufferPrototype,
    ) -> ArraySpec {
        ArraySpec::new(
            self.chunks.clone(),
            self.data_type.clone(),
            self.fill_value.clone(),
            config,
            prototype,
        )
    }

    /// Encode the key of the chunk at `chunk_coords`.
    ///
    /// Coordinates are joined by the dimension separator. The chunk of a zero-dimensional array has the key `0`.
    #[must_use]
    pub fn encode_chunk_key(&self, chunk_coords: &[u64]) -> String {
        if chunk_coords.is_empty() {
            "0".to_string()
        } else {
            let mut buffer = itoa::Buffer::new();
            chunk_coords
                .iter()
                .map(|&coord| buffer.format(coord).to_string())
                .join(self.dimension_separator.as_str())
        }
    }

    /// Return a copy of the metadata with a new shape.
    ///
    /// Only the length of `shape` is checked.
    ///
    /// # Errors
    /// Returns [`ArrayMetadataV2Error::ShapeMismatch`] if `shape` and the chunk shape have different lengths.
    pub fn update_shape(&self, shape: ArrayShape) -> Result<Self, ArrayMetadataV2Error> {
        check_shape(&shape, &self.chunks)?;
        Ok(Self {
            shape,
            ..self.clone()
        })
    }

    /// Return a copy of the metadata with new user attributes.
    #[must_use]
    pub fn update_attributes(&self, attributes: Map<String, Value>) -> Self {
        Self {
            attributes,
            ..self.clone()
        }
    }
}

impl From<ArrayMetadataV2> for Map<String, Value> {
    fn from(metadata: ArrayMetadataV2) -> Self {
        metadata.to_dict()
    }
}

impl TryFrom<Map<String, Value>> for ArrayMetadataV2 {
    type Error = ArrayMetadataV2Error;

    fn try_from(data: Map<String, Value>) -> Result<Self, Self::Error> {
        Self::from_dict(&data)
    }
}

impl Serialize for ArrayMetadataV2 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_dict().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ArrayMetadataV2 {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let data = Map::<String, Value>::deserialize(d)?;
        Self::from_dict(&data).map_err(serde::de::Error::custom)
    }
}

fn check_shape(shape: &[u64], chunks: &[u64]) -> Result<(), ArrayMetadataV2Error> {
    if shape.len() == chunks.len() {
        Ok(())
    } else {
        Err(ArrayMetadataV2Error::ShapeMismatch {
            chunks: chunks.len(),
            shape: shape.len(),
        })
    }
}

fn required<'a>(
    data: &'a Map<String, Value>,
    key: &'static str,
) -> Result<&'a Value, ArrayMetadataV2Error> {
    data.get(key).ok_or(ArrayMetadataV2Error::MissingKey(key))
}

fn parse_shape(value: &Value) -> Result<ArrayShape, ArrayMetadataV2Error> {
    value
        .as_array()
        .and_then(|values| values.iter().map(Value::as_u64).collect::<Option<Vec<_>>>())
        .ok_or_else(|| ArrayMetadataV2Error::InvalidShape(value.clone()))
}

fn parse_codec_metadata(value: &Value) -> Result<CodecMetadata, ArrayMetadataV2Error> {
    serde_json::from_value(value.clone())
        .map_err(|_| ArrayMetadataV2Error::InvalidCodec(value.clone()))
}

/// A JSON literal as a scalar, to be cast to the data type.
fn scalar_from_json(value: &Value) -> Option<Scalar> {
    match value {
        Value::Bool(b) => Some(Scalar::Bool(*b)),
        Value::Number(number) => number
            .as_i64()
            .map(Scalar::Int)
            .or_else(|| number.as_u64().map(Scalar::UInt))
            .or_else(|| number.as_f64().map(Scalar::Float)),
        Value::String(string) => Some(Scalar::String(string.clone())),
        _ => None,
    }
}

fn fill_value_error(fill_value: &Scalar, data_type: &DataType) -> ArrayMetadataV2Error {
    ArrayMetadataV2Error::FillValue {
        fill_value: fill_value.to_string(),
        data_type: data_type.name(ZarrFormat::V2),
    }
}

/// Convert a fill value to the canonical fill value of `data_type`.
fn parse_fill_value(
    fill_value: Option<Scalar>,
    data_type: &DataType,
) -> Result<Option<Scalar>, ArrayMetadataV2Error> {
    let Some(fill_value) = fill_value else {
        return Ok(None);
    };
    let native = data_type.to_native();
    if native.has_object() {
        return Ok(Some(fill_value));
    }
    if fill_value.is_zero() {
        return Ok(Some(data_type.zero_value()));
    }
    let parsed = match (&fill_value, data_type.kind()) {
        (Scalar::String(_), DataTypeKind::String) => data_type.cast_value(&fill_value),
        (_, DataTypeKind::String) => return Err(fill_value_error(&fill_value, data_type)),
        (Scalar::Bytes(bytes), _) if native.kind_char() == 'V' => {
            data_type.scalar_from_bytes(bytes)
        }
        _ => data_type.cast_value(&fill_value),
    };
    parsed
        .map(Some)
        .map_err(|_| fill_value_error(&fill_value, data_type))
}

/// The stored form of a codec.
fn codec_to_json(codec: &Codec) -> Value {
    let mut configuration = codec.configuration();
    if configuration.id() == "zstd"
        && !configuration
            .configuration()
            .get("checksum")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    {
        configuration.configuration_mut().remove("checksum");
    }
    Value::Object(configuration.into())
}

fn to_json_bytes(value: &Value, indent: Option<usize>) -> Result<Vec<u8>, ArrayMetadataV2Error> {
    let json_error = |err: serde_json::Error| ArrayMetadataV2Error::Json(err.to_string());
    match indent {
        Some(indent) => {
            let indent = vec![b' '; indent];
            let mut bytes = Vec::new();
            let mut serializer = serde_json::Serializer::with_formatter(
                &mut bytes,
                PrettyFormatter::with_indent(&indent),
            );
            value.serialize(&mut serializer).map_err(json_error)?;
            Ok(bytes)
        }
        None => serde_json::to_vec(value).map_err(json_error),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use zmeta_data_type::{
        ByteOrder, FixedLengthBytesDataType, Float64DataType, Int32DataType,
        VariableLengthStringDataType,
    };

    use super::*;
    use crate::codec::ZstdCodec;

    fn int32() -> DataType {
        DataType::new(Int32DataType::new(ByteOrder::Little))
    }

    fn metadata(
        fill_value: Option<Scalar>,
        data_type: DataType,
    ) -> Result<ArrayMetadataV2, ArrayMetadataV2Error> {
        ArrayMetadataV2::new(
            vec![10, 10],
            vec![5, 5],
            data_type,
            fill_value,
            MemoryOrder::C,
            ChunkKeySeparator::Dot,
            None,
            None,
            Map::new(),
        )
    }

    #[test]
    fn array_metadata_v2_fill_value() {
        let zero = metadata(Some(Scalar::Float(0.0)), int32()).unwrap();
        assert_eq!(zero.fill_value(), Some(&Scalar::Int(0)));
        assert_eq!(zero.to_dict()["fill_value"], json!(0));

        let none = metadata(None, int32()).unwrap();
        assert_eq!(none.fill_value(), None);
        assert_eq!(none.to_dict()["fill_value"], Value::Null);

        let err = metadata(Some(Scalar::from("x")), int32()).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"Fill_value "x" is not valid for dtype <i4."#
        );

        let nan = metadata(
            Some(Scalar::Float(f64::NAN)),
            DataType::new(Float64DataType::new(ByteOrder::Little)),
        )
        .unwrap();
        assert_eq!(nan.to_dict()["fill_value"], json!("NaN"));

        let string =
            metadata(Some(Scalar::Int(0)), DataType::new(VariableLengthStringDataType)).unwrap();
        assert_eq!(string.fill_value(), Some(&Scalar::Int(0)));
        assert_eq!(string.to_dict()["fill_value"], json!("0"));
    }

    #[test]
    fn array_metadata_v2_opaque_fill_value() {
        let data_type = DataType::new(FixedLengthBytesDataType::new(4));
        let test = metadata(Some(Scalar::from(b"test".as_slice())), data_type.clone()).unwrap();
        assert_eq!(test.fill_value(), Some(&Scalar::Bytes(b"test".to_vec())));
        assert_eq!(test.to_dict()["fill_value"], json!("dGVzdA=="));
        assert!(metadata(Some(Scalar::from(b"long value".as_slice())), data_type).is_err());
    }

    #[test]
    fn array_metadata_v2_codecs() {
        let zstd = ZstdCodec::new(3, false).unwrap();
        let metadata = ArrayMetadataV2::new(
            vec![4],
            vec![2],
            int32(),
            None,
            MemoryOrder::F,
            ChunkKeySeparator::Slash,
            Some(Codec::new(zstd).into()),
            Some(vec![CodecMetadata::new("crc32c", Map::new()).into()]),
            Map::new(),
        )
        .unwrap();
        let dict = metadata.to_dict();
        assert_eq!(dict["compressor"], json!({"id": "zstd", "level": 3}));
        assert_eq!(dict["filters"], json!([{"id": "crc32c"}]));
        assert_eq!(dict["order"], json!("F"));
        assert_eq!(dict["dimension_separator"], json!("/"));
        assert_eq!(
            metadata.codecs().iter().map(|codec| codec.identifier()).collect::<Vec<_>>(),
            vec!["crc32c", "zstd"]
        );
        assert_eq!(metadata.encode_chunk_key(&[0]), "0");
    }

    #[test]
    fn array_metadata_v2_update() {
        let metadata = metadata(None, int32()).unwrap();
        let resized = metadata.update_shape(vec![20, 30]).unwrap();
        assert_eq!(resized.shape(), &[20, 30]);
        assert_eq!(metadata.shape(), &[10, 10]);
        assert!(matches!(
            metadata.update_shape(vec![20]),
            Err(ArrayMetadataV2Error::ShapeMismatch { chunks: 2, shape: 1 })
        ));

        let mut attributes = Map::new();
        attributes.insert("units".to_string(), json!("m"));
        let updated = metadata.update_attributes(attributes.clone());
        assert_eq!(updated.attributes(), &attributes);
        assert_eq!(updated.to_dict()["attributes"], json!({"units": "m"}));
        assert!(metadata.attributes().is_empty());
    }

    #[test]
    fn array_metadata_v2_invalid_document() {
        let document = json!({
            "zarr_format": 3,
            "shape": [1],
            "chunks": [1],
            "dtype": "<i4",
        });
        assert!(matches!(
            ArrayMetadataV2::from_dict(document.as_object().unwrap()),
            Err(ArrayMetadataV2Error::InvalidZarrFormat(_))
        ));

        let document = json!({"zarr_format": 2, "shape": [1], "dtype": "<i4"});
        assert!(matches!(
            ArrayMetadataV2::from_dict(document.as_object().unwrap()),
            Err(ArrayMetadataV2Error::MissingKey("chunks"))
        ));

        let document = json!({"zarr_format": 2, "shape": [-1], "chunks": [1], "dtype": "<i4"});
        assert!(matches!(
            ArrayMetadataV2::from_dict(document.as_object().unwrap()),
            Err(ArrayMetadataV2Error::InvalidShape(_))
        ));

        let document = json!({"zarr_format": 2, "shape": [1], "chunks": [1], "dtype": "<i4", "order": "K"});
        assert!(matches!(
            ArrayMetadataV2::from_dict(document.as_object().unwrap()),
            Err(ArrayMetadataV2Error::InvalidOrder(_))
        ));

        let document = json!({"zarr_format": 2, "shape": [1], "chunks": [1], "dtype": "<i4", "filters": {}});
        assert!(matches!(
            ArrayMetadataV2::from_dict(document.as_object().unwrap()),
            Err(ArrayMetadataV2Error::InvalidFilters(_))
        ));

        assert!(matches!(
            ArrayMetadataV2::from_json_str("[]"),
            Err(ArrayMetadataV2Error::Json(_))
        ));
    }
}
