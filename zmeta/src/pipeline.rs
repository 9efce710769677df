//! Codec pipelines.
//!
//! A codec pipeline runs the codecs of an array over its chunks.
//! This crate only resolves which pipeline implementation serves an array:
//! the configuration key `codec_pipeline.path` names the registered implementation,
//! and `codec_pipeline.batch_size` sets the number of chunks it processes per batch.
//!
//! Pipelines defined in other crates are submitted as [`CodecPipelineEntryPoint`]s with [`inventory::submit!`].

use std::{
    fmt::Debug,
    sync::{Arc, LazyLock},
};

use derive_more::Deref;
use zmeta_plugin::{
    EntryPointDiscovery, Plugin, PluginConfigurationInvalidError, PluginCreateError,
    RuntimeRegistry, RuntimeRegistryHandle,
};

use crate::{ExtensionNotFoundError, codec::Codec, config::global_config};

/// Codec pipeline traits.
pub trait CodecPipelineTraits: Debug + Send + Sync {
    /// The registered name of the implementation.
    fn identifier(&self) -> &'static str;

    /// The number of chunks processed per batch.
    fn batch_size(&self) -> usize;

    /// The codecs of the pipeline, in encoding order.
    fn codecs(&self) -> &[Codec];
}

/// A codec pipeline.
#[derive(Debug, Clone, Deref)]
pub struct CodecPipeline(Arc<dyn CodecPipelineTraits>);

impl CodecPipeline {
    /// Create a codec pipeline.
    pub fn new<T: CodecPipelineTraits + 'static>(pipeline: T) -> Self {
        Self(Arc::new(pipeline))
    }
}

/// The inputs of a codec pipeline plugin.
#[derive(Debug, Clone)]
pub struct CodecPipelineOptions {
    /// The codecs, in encoding order.
    pub codecs: Vec<Codec>,
    /// The number of chunks processed per batch.
    pub batch_size: usize,
}

/// A codec pipeline plugin.
pub type CodecPipelinePlugin = Plugin<CodecPipeline, CodecPipelineOptions>;

/// A codec pipeline entry point.
#[derive(Deref)]
pub struct CodecPipelineEntryPoint(CodecPipelinePlugin);

inventory::collect!(CodecPipelineEntryPoint);

impl CodecPipelineEntryPoint {
    /// The entry-point group of codec pipelines.
    pub const GROUP: &'static str = "zmeta.codec_pipeline";

    /// Create a new codec pipeline entry point.
    #[must_use]
    pub const fn new(plugin: CodecPipelinePlugin) -> Self {
        Self(plugin)
    }
}

/// A codec pipeline that processes chunks in fixed size batches.
#[derive(Debug, Clone)]
pub struct BatchedCodecPipeline {
    codecs: Vec<Codec>,
    batch_size: usize,
}

impl BatchedCodecPipeline {
    /// The registered name of the batched codec pipeline.
    pub const IDENTIFIER: &'static str = "zmeta.pipeline.batched";

    /// Create a new batched codec pipeline.
    ///
    /// # Errors
    /// Returns [`PluginConfigurationInvalidError`] if `batch_size` is zero.
    pub fn new(codecs: Vec<Codec>, batch_size: usize) -> Result<Self, PluginConfigurationInvalidError> {
        if batch_size == 0 {
            return Err(PluginConfigurationInvalidError::new(
                "the batch size of a codec pipeline must be positive".to_string(),
            ));
        }
        Ok(Self { codecs, batch_size })
    }
}

impl CodecPipelineTraits for BatchedCodecPipeline {
    fn identifier(&self) -> &'static str {
        Self::IDENTIFIER
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn codecs(&self) -> &[Codec] {
        &self.codecs
    }
}

fn create_batched_pipeline(
    options: &CodecPipelineOptions,
) -> Result<CodecPipeline, PluginCreateError> {
    let pipeline = BatchedCodecPipeline::new(options.codecs.clone(), options.batch_size)?;
    Ok(CodecPipeline::new(pipeline))
}

static PIPELINE_REGISTRY: LazyLock<RuntimeRegistry<CodecPipelinePlugin>> = LazyLock::new(|| {
    let registry = RuntimeRegistry::new();
    registry.register(
        BatchedCodecPipeline::IDENTIFIER,
        CodecPipelinePlugin::new(BatchedCodecPipeline::IDENTIFIER, create_batched_pipeline),
    );
    registry
});

static PIPELINE_DISCOVERY: EntryPointDiscovery<CodecPipelinePlugin> =
    EntryPointDiscovery::new(CodecPipelineEntryPoint::GROUP);

/// The process-wide codec pipeline registry.
pub fn pipeline_registry() -> &'static RuntimeRegistry<CodecPipelinePlugin> {
    discover_pipelines();
    &PIPELINE_REGISTRY
}

/// Merge the submitted [`CodecPipelineEntryPoint`]s into the codec pipeline registry.
///
/// Only the first call has an effect. Returns the number of pipelines registered by this call.
pub fn discover_pipelines() -> usize {
    PIPELINE_DISCOVERY.discover(&PIPELINE_REGISTRY, || {
        inventory::iter::<CodecPipelineEntryPoint>
            .into_iter()
            .map(|entry_point| (entry_point.identifier().to_string(), **entry_point))
    })
}

/// Register a codec pipeline, replacing any pipeline already registered under its identifier.
pub fn register_pipeline(
    plugin: CodecPipelinePlugin,
) -> RuntimeRegistryHandle<CodecPipelinePlugin> {
    pipeline_registry().register(plugin.identifier(), plugin)
}

/// Create the codec pipeline named by `codec_pipeline.path` over `codecs`.
///
/// # Errors
/// Returns [`PluginCreateError`] if the configured pipeline is not registered, or the configured batch size is invalid.
pub fn get_pipeline(codecs: Vec<Codec>) -> Result<CodecPipeline, PluginCreateError> {
    let (path, batch_size) = {
        let config = global_config();
        (
            config.codec_pipeline_path()?,
            config.codec_pipeline_batch_size()?,
        )
    };
    pipeline_registry()
        .get(&path)
        .ok_or_else(|| ExtensionNotFoundError::new("codec pipeline", path))?
        .create(&CodecPipelineOptions { codecs, batch_size })
}
