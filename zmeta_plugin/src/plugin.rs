use crate::PluginCreateError;

/// A plugin.
///
/// Pairs a stable identifier with a function creating the extension from an input.
pub struct Plugin<TPlugin, TInput: ?Sized> {
    /// The identifier of the plugin.
    identifier: &'static str,
    /// Create an implementation of this plugin from an input.
    create_fn: fn(input: &TInput) -> Result<TPlugin, PluginCreateError>,
}

impl<TPlugin, TInput: ?Sized> Plugin<TPlugin, TInput> {
    /// Create a new plugin for registration.
    pub const fn new(
        identifier: &'static str,
        create_fn: fn(input: &TInput) -> Result<TPlugin, PluginCreateError>,
    ) -> Self {
        Self {
            identifier,
            create_fn,
        }
    }

    /// Create a `TPlugin` plugin from `input`.
    ///
    /// # Errors
    ///
    /// Returns a [`PluginCreateError`] if plugin creation fails due to either:
    ///  - the configuration is invalid, or
    ///  - some other reason specific to the plugin.
    pub fn create(&self, input: &TInput) -> Result<TPlugin, PluginCreateError> {
        (self.create_fn)(input)
    }

    /// Returns the identifier of the plugin.
    #[must_use]
    pub const fn identifier(&self) -> &'static str {
        self.identifier
    }
}

impl<TPlugin, TInput: ?Sized> Clone for Plugin<TPlugin, TInput> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<TPlugin, TInput: ?Sized> Copy for Plugin<TPlugin, TInput> {}

impl<TPlugin, TInput: ?Sized> std::fmt::Debug for Plugin<TPlugin, TInput> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}
