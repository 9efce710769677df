//! Buffers and buffer prototypes.
//!
//! A [`BufferPrototype`] pairs the buffer implementation that holds encoded bytes (such as a metadata document)
//! with the n-dimensional buffer implementation that holds decoded chunks.
//!
//! Implementations are looked up by name in the buffer and ndbuffer registries.
//! The configuration keys `buffer` and `ndbuffer` name the implementations of the [`default_buffer_prototype`].
//! The CPU implementations are built in; others (e.g. GPU buffers) are submitted as
//! [`BufferEntryPoint`]s and [`NDBufferEntryPoint`]s with [`inventory::submit!`].

use std::{
    fmt::Debug,
    sync::{Arc, LazyLock},
};

use bytes::Bytes;
use derive_more::{Deref, From};
use zmeta_plugin::{
    EntryPointDiscovery, Plugin, PluginCreateError, RuntimeRegistry, RuntimeRegistryHandle,
};

use crate::{ExtensionNotFoundError, config::global_config};

/// An immutable byte buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, From)]
pub struct Buffer(Bytes);

impl Buffer {
    /// Return the bytes of the buffer.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Convert the buffer into [`Bytes`].
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

/// Buffer traits.
pub trait BufferTraits: Debug + Send + Sync {
    /// The registered name of the implementation.
    fn identifier(&self) -> &'static str;

    /// Create a buffer holding `bytes`.
    fn from_bytes(&self, bytes: Vec<u8>) -> Buffer;
}

/// N-dimensional buffer traits.
pub trait NDBufferTraits: Debug + Send + Sync {
    /// The registered name of the implementation.
    fn identifier(&self) -> &'static str;
}

/// A buffer prototype.
#[derive(Debug, Clone)]
pub struct BufferPrototype {
    buffer: Arc<dyn BufferTraits>,
    nd_buffer: Arc<dyn NDBufferTraits>,
}

impl BufferPrototype {
    /// Create a new buffer prototype.
    #[must_use]
    pub fn new(buffer: Arc<dyn BufferTraits>, nd_buffer: Arc<dyn NDBufferTraits>) -> Self {
        Self { buffer, nd_buffer }
    }

    /// The buffer implementation.
    #[must_use]
    pub fn buffer(&self) -> &Arc<dyn BufferTraits> {
        &self.buffer
    }

    /// The n-dimensional buffer implementation.
    #[must_use]
    pub fn nd_buffer(&self) -> &Arc<dyn NDBufferTraits> {
        &self.nd_buffer
    }
}

impl PartialEq for BufferPrototype {
    fn eq(&self, other: &Self) -> bool {
        self.buffer.identifier() == other.buffer.identifier()
            && self.nd_buffer.identifier() == other.nd_buffer.identifier()
    }
}

impl Eq for BufferPrototype {}

/// A buffer in host memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuBuffer;

impl CpuBuffer {
    /// The registered name of the CPU buffer.
    pub const IDENTIFIER: &'static str = "zmeta.buffer.cpu";
}

impl BufferTraits for CpuBuffer {
    fn identifier(&self) -> &'static str {
        Self::IDENTIFIER
    }

    fn from_bytes(&self, bytes: Vec<u8>) -> Buffer {
        Buffer(Bytes::from(bytes))
    }
}

/// An n-dimensional buffer in host memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuNDBuffer;

impl CpuNDBuffer {
    /// The registered name of the CPU n-dimensional buffer.
    pub const IDENTIFIER: &'static str = "zmeta.ndbuffer.cpu";
}

impl NDBufferTraits for CpuNDBuffer {
    fn identifier(&self) -> &'static str {
        Self::IDENTIFIER
    }
}

/// A buffer plugin.
pub type BufferPlugin = Plugin<Arc<dyn BufferTraits>, ()>;

/// An n-dimensional buffer plugin.
pub type NDBufferPlugin = Plugin<Arc<dyn NDBufferTraits>, ()>;

/// A buffer entry point.
#[derive(Deref)]
pub struct BufferEntryPoint(BufferPlugin);

inventory::collect!(BufferEntryPoint);

impl BufferEntryPoint {
    /// The entry-point group of buffers.
    pub const GROUP: &'static str = "zmeta.buffer";

    /// Create a new buffer entry point.
    #[must_use]
    pub const fn new(plugin: BufferPlugin) -> Self {
        Self(plugin)
    }
}

/// An n-dimensional buffer entry point.
#[derive(Deref)]
pub struct NDBufferEntryPoint(NDBufferPlugin);

inventory::collect!(NDBufferEntryPoint);

impl NDBufferEntryPoint {
    /// The entry-point group of n-dimensional buffers.
    pub const GROUP: &'static str = "zmeta.ndbuffer";

    /// Create a new n-dimensional buffer entry point.
    #[must_use]
    pub const fn new(plugin: NDBufferPlugin) -> Self {
        Self(plugin)
    }
}

#[allow(clippy::unnecessary_wraps)]
fn create_cpu_buffer(_: &()) -> Result<Arc<dyn BufferTraits>, PluginCreateError> {
    Ok(Arc::new(CpuBuffer))
}

#[allow(clippy::unnecessary_wraps)]
fn create_cpu_nd_buffer(_: &()) -> Result<Arc<dyn NDBufferTraits>, PluginCreateError> {
    Ok(Arc::new(CpuNDBuffer))
}

static BUFFER_REGISTRY: LazyLock<RuntimeRegistry<BufferPlugin>> = LazyLock::new(|| {
    let registry = RuntimeRegistry::new();
    registry.register(
        CpuBuffer::IDENTIFIER,
        BufferPlugin::new(CpuBuffer::IDENTIFIER, create_cpu_buffer),
    );
    registry
});

static ND_BUFFER_REGISTRY: LazyLock<RuntimeRegistry<NDBufferPlugin>> = LazyLock::new(|| {
    let registry = RuntimeRegistry::new();
    registry.register(
        CpuNDBuffer::IDENTIFIER,
        NDBufferPlugin::new(CpuNDBuffer::IDENTIFIER, create_cpu_nd_buffer),
    );
    registry
});

static BUFFER_DISCOVERY: EntryPointDiscovery<BufferPlugin> =
    EntryPointDiscovery::new(BufferEntryPoint::GROUP);

static ND_BUFFER_DISCOVERY: EntryPointDiscovery<NDBufferPlugin> =
    EntryPointDiscovery::new(NDBufferEntryPoint::GROUP);

/// The process-wide buffer registry.
pub fn buffer_registry() -> &'static RuntimeRegistry<BufferPlugin> {
    discover_buffers();
    &BUFFER_REGISTRY
}

/// The process-wide n-dimensional buffer registry.
pub fn nd_buffer_registry() -> &'static RuntimeRegistry<NDBufferPlugin> {
    discover_buffers();
    &ND_BUFFER_REGISTRY
}

/// Merge the submitted [`BufferEntryPoint`]s and [`NDBufferEntryPoint`]s into the buffer registries.
///
/// Only the first call has an effect. Returns the number of implementations registered by this call.
pub fn discover_buffers() -> usize {
    let buffers = BUFFER_DISCOVERY.discover(&BUFFER_REGISTRY, || {
        inventory::iter::<BufferEntryPoint>
            .into_iter()
            .map(|entry_point| (entry_point.identifier().to_string(), **entry_point))
    });
    let nd_buffers = ND_BUFFER_DISCOVERY.discover(&ND_BUFFER_REGISTRY, || {
        inventory::iter::<NDBufferEntryPoint>
            .into_iter()
            .map(|entry_point| (entry_point.identifier().to_string(), **entry_point))
    });
    buffers + nd_buffers
}

/// Register a buffer implementation, replacing any implementation already registered under its identifier.
pub fn register_buffer(plugin: BufferPlugin) -> RuntimeRegistryHandle<BufferPlugin> {
    buffer_registry().register(plugin.identifier(), plugin)
}

/// Register an n-dimensional buffer implementation, replacing any implementation already registered under its identifier.
pub fn register_nd_buffer(plugin: NDBufferPlugin) -> RuntimeRegistryHandle<NDBufferPlugin> {
    nd_buffer_registry().register(plugin.identifier(), plugin)
}

/// Create the buffer implementation registered under `name`.
///
/// # Errors
/// Returns [`PluginCreateError`] if no buffer is registered under `name` or it fails to initialise.
pub fn get_buffer(name: &str) -> Result<Arc<dyn BufferTraits>, PluginCreateError> {
    buffer_registry()
        .get(name)
        .ok_or_else(|| ExtensionNotFoundError::new("buffer", name.to_string()))?
        .create(&())
}

/// Create the n-dimensional buffer implementation registered under `name`.
///
/// # Errors
/// Returns [`PluginCreateError`] if no n-dimensional buffer is registered under `name` or it fails to initialise.
pub fn get_nd_buffer(name: &str) -> Result<Arc<dyn NDBufferTraits>, PluginCreateError> {
    nd_buffer_registry()
        .get(name)
        .ok_or_else(|| ExtensionNotFoundError::new("ndbuffer", name.to_string()))?
        .create(&())
}

/// Return the buffer prototype named by the `buffer` and `ndbuffer` configuration keys.
///
/// # Errors
/// Returns [`PluginCreateError`] if either configured implementation is not registered.
pub fn default_buffer_prototype() -> Result<BufferPrototype, PluginCreateError> {
    let (buffer, nd_buffer) = {
        let config = global_config();
        (config.buffer()?, config.ndbuffer()?)
    };
    Ok(BufferPrototype::new(
        get_buffer(&buffer)?,
        get_nd_buffer(&nd_buffer)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_buffer() {
        let buffer = CpuBuffer.from_bytes(b"{}".to_vec());
        assert_eq!(buffer.as_bytes(), b"{}");
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.into_bytes(), Bytes::from_static(b"{}"));
    }

    #[test]
    fn builtin_buffers() {
        assert_eq!(
            get_buffer(CpuBuffer::IDENTIFIER).unwrap().identifier(),
            CpuBuffer::IDENTIFIER
        );
        assert_eq!(
            get_nd_buffer(CpuNDBuffer::IDENTIFIER).unwrap().identifier(),
            CpuNDBuffer::IDENTIFIER
        );
        assert!(matches!(
            get_buffer("zmeta.buffer.gpu"),
            Err(PluginCreateError::Unsupported(_))
        ));
    }
}
