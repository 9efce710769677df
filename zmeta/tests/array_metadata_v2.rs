#![allow(missing_docs)]

use chrono::NaiveDate;
use serde_json::{Map, Value, json};
use zmeta::{
    array::{
        ArrayConfig, ArrayMetadataV2, ArrayMetadataV2Error, ChunkKeySeparator, CodecInput,
        MemoryOrder, ZARRAY_JSON, ZATTRS_JSON,
    },
    buffer::{BufferPrototype, CpuBuffer, CpuNDBuffer},
    codec::{Codec, CodecMetadata, ZstdCodec},
    data_type::{ByteOrder, DataType, Int32DataType, NumpyTimeUnit, Scalar},
};

fn int32() -> DataType {
    DataType::new(Int32DataType::new(ByteOrder::Little))
}

fn cpu_prototype() -> BufferPrototype {
    BufferPrototype::new(std::sync::Arc::new(CpuBuffer), std::sync::Arc::new(CpuNDBuffer))
}

fn from_json(document: &Value) -> Result<ArrayMetadataV2, ArrayMetadataV2Error> {
    ArrayMetadataV2::from_dict(document.as_object().unwrap())
}

#[test]
fn array_metadata_v2_int32_scenario() {
    let metadata = ArrayMetadataV2::new(
        vec![10, 10],
        vec![5, 5],
        int32(),
        Some(Scalar::Int(0)),
        MemoryOrder::C,
        ChunkKeySeparator::Dot,
        None,
        None,
        Map::new(),
    )
    .unwrap();

    let dict = metadata.to_dict();
    assert_eq!(dict["zarr_format"], json!(2));
    assert_eq!(dict["dtype"], json!("<i4"));
    assert_eq!(dict["fill_value"], json!(0));
    assert_eq!(dict["compressor"], Value::Null);
    assert_eq!(dict["filters"], Value::Null);
    assert_eq!(dict["shape"], json!([10, 10]));
    assert_eq!(dict["chunks"], json!([5, 5]));
    assert_eq!(metadata.encode_chunk_key(&[1, 2]), "1.2");
    assert_eq!(metadata.encode_chunk_key(&[]), "0");
    assert_eq!(metadata.ndim(), 2);
    assert_eq!(metadata.shards(), None);

    assert_eq!(ArrayMetadataV2::from_dict(&dict).unwrap(), metadata);
}

#[test]
fn array_metadata_v2_shape_mismatch() {
    for (shape, chunks) in [(vec![10], vec![5, 5]), (vec![10, 10], vec![5]), (vec![], vec![1])] {
        let err = ArrayMetadataV2::new(
            shape.clone(),
            chunks.clone(),
            int32(),
            None,
            MemoryOrder::C,
            ChunkKeySeparator::Dot,
            None,
            None,
            Map::new(),
        )
        .unwrap_err();
        assert!(matches!(err, ArrayMetadataV2Error::ShapeMismatch { .. }));
        assert_eq!(
            err.to_string(),
            format!(
                "The `shape` and `chunks` attributes must have the same length. `chunks` has length {}, but `shape` has length {}.",
                chunks.len(),
                shape.len()
            )
        );
    }
}

#[test]
fn array_metadata_v2_empty_filters() {
    testing_logger::setup();
    let metadata = ArrayMetadataV2::new(
        vec![10],
        vec![5],
        int32(),
        None,
        MemoryOrder::C,
        ChunkKeySeparator::Dot,
        None,
        Some(vec![]),
        Map::new(),
    )
    .unwrap();
    assert_eq!(metadata.filters(), None);
    assert_eq!(metadata.to_dict()["filters"], Value::Null);
    testing_logger::validate(|captured_logs| {
        let warnings: Vec<_> = captured_logs
            .iter()
            .filter(|log| log.level == log::Level::Warn)
            .collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].body.contains("empty list of filters"));
    });
}

#[test]
fn array_metadata_v2_from_dict_unknown_keys() {
    let metadata = from_json(&json!({
        "zarr_format": 2,
        "shape": [100],
        "chunks": [10],
        "dtype": "<f8",
        "fill_value": "NaN",
        "order": "C",
        "filters": null,
        "compressor": null,
        "dimension_separator": "/",
        "zarr_version": 2,
        "created_by": "legacy writer",
    }))
    .unwrap();
    let dict = metadata.to_dict();
    assert!(!dict.contains_key("zarr_version"));
    assert!(!dict.contains_key("created_by"));
    assert_eq!(dict["fill_value"], json!("NaN"));
    assert!(matches!(metadata.fill_value(), Some(Scalar::Float(f)) if f.is_nan()));
    assert_eq!(metadata.dimension_separator(), ChunkKeySeparator::Slash);
}

#[test]
fn array_metadata_v2_from_dict_defaults() {
    let metadata = from_json(&json!({
        "zarr_format": 2,
        "shape": [4, 4],
        "chunks": [2, 2],
        "dtype": ">u2",
    }))
    .unwrap();
    assert_eq!(metadata.fill_value(), Some(&Scalar::UInt(0)));
    assert_eq!(metadata.order(), MemoryOrder::C);
    assert_eq!(metadata.dimension_separator(), ChunkKeySeparator::Dot);
    assert!(metadata.compressor().is_none());
    assert!(metadata.filters().is_none());
    assert_eq!(metadata.to_dict()["dtype"], json!(">u2"));
}

#[test]
fn array_metadata_v2_zstd_checksum() {
    let document = json!({
        "zarr_format": 2,
        "shape": [8],
        "chunks": [8],
        "dtype": "<i4",
        "fill_value": 0,
        "order": "C",
        "filters": null,
        "compressor": {"id": "zstd", "level": 1, "checksum": false},
    });
    let metadata = from_json(&document).unwrap();
    assert_eq!(
        metadata.to_dict()["compressor"],
        json!({"id": "zstd", "level": 1})
    );

    let checksum = ArrayMetadataV2::new(
        vec![8],
        vec![8],
        int32(),
        None,
        MemoryOrder::C,
        ChunkKeySeparator::Dot,
        Some(Codec::new(ZstdCodec::new(1, true).unwrap()).into()),
        None,
        Map::new(),
    )
    .unwrap();
    assert_eq!(
        checksum.to_dict()["compressor"],
        json!({"id": "zstd", "level": 1, "checksum": true})
    );
}

#[test]
fn array_metadata_v2_codec_configurations() {
    let compressor: CodecMetadata =
        serde_json::from_value(json!({"name": "blosc", "configuration": {"cname": "zstd", "clevel": 3, "shuffle": 2}}))
            .unwrap();
    let metadata = ArrayMetadataV2::new(
        vec![8],
        vec![8],
        int32(),
        None,
        MemoryOrder::C,
        ChunkKeySeparator::Dot,
        Some(CodecInput::Metadata(compressor)),
        None,
        Map::new(),
    )
    .unwrap();
    assert_eq!(
        metadata.to_dict()["compressor"],
        json!({"id": "blosc", "cname": "zstd", "clevel": 3, "shuffle": 2, "blocksize": 0})
    );

    let unknown = from_json(&json!({
        "zarr_format": 2,
        "shape": [8],
        "chunks": [8],
        "dtype": "<i4",
        "compressor": {"id": "lzma"},
    }));
    assert!(matches!(unknown, Err(ArrayMetadataV2Error::Codec(_))));
}

#[test]
fn array_metadata_v2_opaque_fill_value() {
    let metadata = from_json(&json!({
        "zarr_format": 2,
        "shape": [3],
        "chunks": [3],
        "dtype": "|V4",
        "fill_value": "dGVzdA==",
    }))
    .unwrap();
    assert_eq!(metadata.fill_value(), Some(&Scalar::Bytes(b"test".to_vec())));
    assert_eq!(metadata.to_dict()["fill_value"], json!("dGVzdA=="));
}

#[test]
fn array_metadata_v2_fixed_bytes_fill_value_must_be_base64() {
    for dtype in ["|S5", "|V5"] {
        let err = from_json(&json!({
            "zarr_format": 2,
            "shape": [3],
            "chunks": [3],
            "dtype": dtype,
            "fill_value": "hello",
        }))
        .unwrap_err();
        assert!(matches!(err, ArrayMetadataV2Error::FillValue { .. }), "{dtype}");
        assert_eq!(
            err.to_string(),
            format!(r#"Fill_value "hello" is not valid for dtype {dtype}."#)
        );
    }

    let metadata = from_json(&json!({
        "zarr_format": 2,
        "shape": [3],
        "chunks": [3],
        "dtype": "|S5",
        "fill_value": "aGVsbG8=",
    }))
    .unwrap();
    assert_eq!(metadata.fill_value(), Some(&Scalar::Bytes(b"hello".to_vec())));
}

#[test]
fn array_metadata_v2_datetime_fill_value() {
    let metadata = from_json(&json!({
        "zarr_format": 2,
        "shape": [3],
        "chunks": [3],
        "dtype": "<M8[s]",
        "fill_value": 1_609_459_200,
    }))
    .unwrap();
    let expected = NaiveDate::from_ymd_opt(2021, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let Some(Scalar::DateTime64(offset)) = metadata.fill_value() else {
        panic!("expected a datetime fill value");
    };
    assert_eq!(
        NumpyTimeUnit::Second.offset_to_datetime(1, *offset),
        Some(expected)
    );
    assert_eq!(metadata.to_dict()["fill_value"], json!(1_609_459_200));
}

#[test]
fn array_metadata_v2_invalid_fill_value() {
    let err = from_json(&json!({
        "zarr_format": 2,
        "shape": [3],
        "chunks": [3],
        "dtype": "|u1",
        "fill_value": 300,
    }))
    .unwrap_err();
    assert!(matches!(err, ArrayMetadataV2Error::FillValue { .. }));
    assert_eq!(err.to_string(), "Fill_value 300 is not valid for dtype |u1.");
}

#[test]
fn array_metadata_v2_to_buffer_dict() {
    let mut attributes = Map::new();
    attributes.insert("long_name".to_string(), json!("temperature"));
    let metadata = ArrayMetadataV2::new(
        vec![2],
        vec![1],
        int32(),
        Some(Scalar::Int(-1)),
        MemoryOrder::F,
        ChunkKeySeparator::Dot,
        None,
        None,
        attributes,
    )
    .unwrap();
    let buffers = metadata.to_buffer_dict(&cpu_prototype()).unwrap();
    assert_eq!(buffers.len(), 2);

    let zarray: Value = serde_json::from_slice(&buffers[ZARRAY_JSON]).unwrap();
    assert!(zarray.get("attributes").is_none());
    assert_eq!(zarray["fill_value"], json!(-1));
    assert_eq!(zarray["order"], json!("F"));
    let zattrs: Value = serde_json::from_slice(&buffers[ZATTRS_JSON]).unwrap();
    assert_eq!(zattrs, json!({"long_name": "temperature"}));

    let text = std::str::from_utf8(&buffers[ZATTRS_JSON]).unwrap();
    assert_eq!(text, "{\n  \"long_name\": \"temperature\"\n}");

    let mut zarray = zarray.as_object().unwrap().clone();
    zarray.insert("attributes".to_string(), zattrs);
    assert_eq!(ArrayMetadataV2::from_dict(&zarray).unwrap(), metadata);
}

#[test]
fn array_metadata_v2_serde() {
    let json = r#"{
        "zarr_format": 2,
        "shape": [10000, 10000],
        "chunks": [1000, 1000],
        "dtype": "<f8",
        "fill_value": "NaN",
        "order": "C",
        "filters": null,
        "compressor": {"id": "blosc", "cname": "lz4", "clevel": 5, "shuffle": 1, "blocksize": 0},
        "dimension_separator": "."
    }"#;
    let metadata: ArrayMetadataV2 = serde_json::from_str(json).unwrap();
    assert_eq!(metadata.compressor().unwrap().identifier(), "blosc");
    let serialised = serde_json::to_value(&metadata).unwrap();
    assert_eq!(serialised["compressor"]["cname"], json!("lz4"));
    assert_eq!(serialised["attributes"], json!({}));
    assert_eq!(ArrayMetadataV2::from_json_str(json).unwrap().to_dict(), metadata.to_dict());
}

#[test]
fn array_metadata_v2_chunk_spec() {
    let metadata = from_json(&json!({
        "zarr_format": 2,
        "shape": [10, 7],
        "chunks": [4, 3],
        "dtype": "<i4",
        "fill_value": 5,
    }))
    .unwrap();
    let config = ArrayConfig::new(MemoryOrder::F, true);
    let spec = metadata.get_chunk_spec(&[2, 2], config, cpu_prototype());
    assert_eq!(spec.shape(), &[4, 3]);
    assert_eq!(spec.ndim(), 2);
    assert_eq!(spec.data_type(), &int32());
    assert_eq!(spec.fill_value(), Some(&Scalar::Int(5)));
    assert_eq!(spec.config(), &config);
    assert_eq!(spec.prototype(), &cpu_prototype());
}
