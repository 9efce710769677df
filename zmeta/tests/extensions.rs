#![allow(missing_docs)]

use std::sync::Arc;

use serde_json::{Map, json};
use serial_test::serial;
use zmeta::{
    array::{ArrayMetadataV2, ArrayMetadataV2Builder, MemoryOrder},
    buffer::{
        Buffer, BufferEntryPoint, BufferPlugin, BufferTraits, CpuBuffer, CpuNDBuffer,
        buffer_registry, default_buffer_prototype,
    },
    codec::{
        Codec, CodecEntryPoint, CodecMetadata, CodecPlugin, CodecTraits, ZstdCodecConfiguration,
        clear_discovered_codecs, codec_registry, discover_codecs, register_codec,
        unregister_codec,
    },
    config::global_config_mut,
    data_type::{ByteOrder, DataType, Int32DataType},
    discover_extensions,
    pipeline::{BatchedCodecPipeline, get_pipeline},
    plugin::PluginCreateError,
};

/// A `zstd` implementation registered under an alternative name.
#[derive(Debug)]
struct AlternativeZstdCodec {
    configuration: ZstdCodecConfiguration,
}

impl CodecTraits for AlternativeZstdCodec {
    fn identifier(&self) -> &'static str {
        "test.zstd"
    }

    fn configuration(&self) -> CodecMetadata {
        CodecMetadata::with_configuration("zstd", &self.configuration)
    }
}

fn create_alternative_zstd(metadata: &CodecMetadata) -> Result<Codec, PluginCreateError> {
    let configuration = metadata
        .to_typed_configuration()
        .map_err(|err| PluginCreateError::Other(err.to_string()))?;
    Ok(Codec::new(AlternativeZstdCodec { configuration }))
}

#[derive(Debug)]
struct SubmittedCodec;

impl CodecTraits for SubmittedCodec {
    fn identifier(&self) -> &'static str {
        "test.submitted"
    }

    fn configuration(&self) -> CodecMetadata {
        CodecMetadata::new("test.submitted", Map::new())
    }
}

#[allow(clippy::unnecessary_wraps)]
fn create_submitted(_metadata: &CodecMetadata) -> Result<Codec, PluginCreateError> {
    Ok(Codec::new(SubmittedCodec))
}

inventory::submit! {
    CodecEntryPoint::new(CodecPlugin::new("test.submitted", create_submitted))
}

#[derive(Debug)]
struct PinnedBuffer;

impl BufferTraits for PinnedBuffer {
    fn identifier(&self) -> &'static str {
        "test.buffer.pinned"
    }

    fn from_bytes(&self, bytes: Vec<u8>) -> Buffer {
        Buffer::from(bytes::Bytes::from(bytes))
    }
}

#[allow(clippy::unnecessary_wraps)]
fn create_pinned_buffer(_: &()) -> Result<Arc<dyn BufferTraits>, PluginCreateError> {
    Ok(Arc::new(PinnedBuffer))
}

inventory::submit! {
    BufferEntryPoint::new(BufferPlugin::new("test.buffer.pinned", create_pinned_buffer))
}

fn int32_with_zstd() -> Result<ArrayMetadataV2, zmeta::array::ArrayMetadataV2Error> {
    ArrayMetadataV2::from_dict(
        json!({
            "zarr_format": 2,
            "shape": [16],
            "chunks": [4],
            "dtype": "<i4",
            "compressor": {"id": "zstd", "level": 5, "checksum": false},
        })
        .as_object()
        .unwrap(),
    )
}

#[test]
#[serial]
fn codec_implementation_from_config() {
    let handle = register_codec(
        "test.zstd",
        CodecPlugin::new("test.zstd", create_alternative_zstd),
    );

    let builtin = int32_with_zstd().unwrap();
    assert_eq!(builtin.compressor().unwrap().identifier(), "zstd");

    global_config_mut()
        .set(&json!({"codecs": {"zstd": "test.zstd"}}))
        .unwrap();
    let alternative = int32_with_zstd().unwrap();
    assert_eq!(alternative.compressor().unwrap().identifier(), "test.zstd");
    assert_eq!(
        alternative.to_dict()["compressor"],
        json!({"id": "zstd", "level": 5})
    );

    global_config_mut()
        .set(&json!({"codecs.zstd": "test.missing"}))
        .unwrap();
    assert!(matches!(
        int32_with_zstd(),
        Err(zmeta::array::ArrayMetadataV2Error::Codec(
            PluginCreateError::Unsupported(_)
        ))
    ));

    global_config_mut().reset();
    assert!(unregister_codec(&handle));
    assert!(!codec_registry().contains("test.zstd"));
}

#[test]
#[serial]
fn discovery_is_idempotent() {
    discover_extensions();
    assert!(codec_registry().contains("test.submitted"));
    assert!(buffer_registry().contains("test.buffer.pinned"));
    assert_eq!(discover_extensions(), 0);
    assert_eq!(discover_codecs(), 0);

    clear_discovered_codecs();
    assert_eq!(discover_codecs(), 1);
    assert_eq!(discover_codecs(), 0);
    assert!(codec_registry().contains("test.submitted"));
    assert!(codec_registry().contains("zstd"));

    let codec = Codec::from_metadata(&CodecMetadata::new("test.submitted", Map::new())).unwrap();
    assert_eq!(codec.identifier(), "test.submitted");
}

#[test]
#[serial]
fn buffer_prototype_from_config() {
    let prototype = default_buffer_prototype().unwrap();
    assert_eq!(prototype.buffer().identifier(), CpuBuffer::IDENTIFIER);
    assert_eq!(prototype.nd_buffer().identifier(), CpuNDBuffer::IDENTIFIER);

    global_config_mut()
        .set(&json!({"buffer": "test.buffer.pinned"}))
        .unwrap();
    let prototype = default_buffer_prototype().unwrap();
    assert_eq!(prototype.buffer().identifier(), "test.buffer.pinned");
    assert_eq!(prototype.buffer().from_bytes(vec![1, 2]).as_bytes(), &[1, 2]);

    global_config_mut().enable_gpu();
    assert!(matches!(
        default_buffer_prototype(),
        Err(PluginCreateError::Unsupported(_))
    ));

    global_config_mut().reset();
    assert_eq!(
        default_buffer_prototype().unwrap().buffer().identifier(),
        CpuBuffer::IDENTIFIER
    );
}

#[test]
#[serial]
fn pipeline_from_config() {
    let metadata = int32_with_zstd().unwrap();
    let pipeline = get_pipeline(metadata.codecs()).unwrap();
    assert_eq!(pipeline.identifier(), BatchedCodecPipeline::IDENTIFIER);
    assert_eq!(pipeline.batch_size(), 1);
    assert_eq!(pipeline.codecs().len(), 1);

    global_config_mut()
        .set(&json!({"codec_pipeline": {"batch_size": 8}}))
        .unwrap();
    assert_eq!(get_pipeline(metadata.codecs()).unwrap().batch_size(), 8);

    global_config_mut()
        .set(&json!({"codec_pipeline.batch_size": 0}))
        .unwrap();
    assert!(matches!(
        get_pipeline(metadata.codecs()),
        Err(PluginCreateError::ConfigurationInvalid(_))
    ));

    global_config_mut()
        .set(&json!({"codec_pipeline": {"path": "test.pipeline.missing", "batch_size": 1}}))
        .unwrap();
    assert!(matches!(
        get_pipeline(metadata.codecs()),
        Err(PluginCreateError::Unsupported(_))
    ));

    global_config_mut().reset();
}

#[test]
#[serial]
fn builder_defaults_from_environment() {
    global_config_mut().refresh_from([
        ("ZARR_ARRAY__ORDER".to_string(), "F".to_string()),
        (
            "ZARR_ARRAY__V2_DEFAULT_COMPRESSOR__DEFAULT".to_string(),
            "None".to_string(),
        ),
    ]);
    let data_type = DataType::new(Int32DataType::new(ByteOrder::Big));
    let metadata = ArrayMetadataV2Builder::new(vec![4], vec![2], data_type.clone())
        .build()
        .unwrap();
    assert_eq!(metadata.order(), MemoryOrder::F);
    assert!(metadata.compressor().is_none());
    assert_eq!(metadata.to_dict()["dtype"], json!(">i4"));

    global_config_mut().reset();
    let metadata = ArrayMetadataV2Builder::new(vec![4], vec![2], data_type)
        .build()
        .unwrap();
    assert_eq!(metadata.order(), MemoryOrder::C);
    assert_eq!(metadata.compressor().unwrap().identifier(), "zstd");
}
