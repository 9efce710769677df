//! Runtime registry for named extension plugins.
//!
//! Entries are keyed by a stable name.
//! Registering a name that is already present replaces the previous entry (last write wins).
//!
//! Readers take a snapshot of the table and never observe a partially applied write.
//! Writers copy the table, modify the copy, and swap it in under the write lock.
//! Concurrent writers are serialised by the lock, but their relative order is the caller's responsibility.

use std::sync::{Arc, PoisonError, RwLock};

/// A handle to a registered plugin. See [`RuntimeRegistry::register`].
pub type RuntimeRegistryHandle<P> = Arc<P>;

type Entries<P> = Arc<Vec<(String, RuntimeRegistryHandle<P>)>>;

/// A runtime registry for named extension plugins.
///
/// # Type Parameters
///
/// * `P` - The plugin type to store (e.g., `DataTypePlugin`)
#[derive(Debug)]
pub struct RuntimeRegistry<P> {
    entries: RwLock<Entries<P>>,
}

impl<P> RuntimeRegistry<P> {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Take a snapshot of the registered plugins, in registration order.
    ///
    /// The snapshot is unaffected by later writes.
    #[must_use]
    pub fn snapshot(&self) -> Entries<P> {
        Arc::clone(&self.entries.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn update(&self, f: impl FnOnce(&mut Vec<(String, RuntimeRegistryHandle<P>)>)) {
        let mut guard = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let mut entries: Vec<_> = guard.iter().cloned().collect();
        f(&mut entries);
        *guard = Arc::new(entries);
    }

    /// Register `plugin` under `name` and return a handle to it.
    ///
    /// An existing plugin with the same name is replaced in place.
    pub fn register(&self, name: impl Into<String>, plugin: P) -> RuntimeRegistryHandle<P> {
        let handle = Arc::new(plugin);
        self.replace(name.into(), Arc::clone(&handle));
        handle
    }

    /// Put `handle` under `name`, returning the handle it replaced.
    pub(crate) fn replace(
        &self,
        name: String,
        handle: RuntimeRegistryHandle<P>,
    ) -> Option<RuntimeRegistryHandle<P>> {
        let mut previous = None;
        self.update(|entries| {
            if let Some(entry) = entries.iter_mut().find(|(n, _)| *n == name) {
                previous = Some(std::mem::replace(&mut entry.1, handle));
            } else {
                entries.push((name, handle));
            }
        });
        previous
    }

    /// Return the plugin registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<RuntimeRegistryHandle<P>> {
        self.snapshot()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, plugin)| Arc::clone(plugin))
    }

    /// Returns true if a plugin is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.snapshot().iter().any(|(n, _)| n == name)
    }

    /// Unregister the plugin registered under `name`.
    ///
    /// Returns `true` if the plugin was found and removed, `false` otherwise.
    pub fn unregister(&self, name: &str) -> bool {
        let mut removed = false;
        self.update(|entries| {
            let len = entries.len();
            entries.retain(|(n, _)| n != name);
            removed = entries.len() != len;
        });
        removed
    }

    /// Unregister a plugin by its handle.
    ///
    /// Uses `Arc::ptr_eq`, so a plugin that has since been replaced under the same name is not removed.
    pub fn unregister_handle(&self, handle: &RuntimeRegistryHandle<P>) -> bool {
        let mut removed = false;
        self.update(|entries| {
            if let Some(pos) = entries.iter().position(|(_, p)| Arc::ptr_eq(p, handle)) {
                entries.remove(pos);
                removed = true;
            }
        });
        removed
    }

    /// The registered names, in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.snapshot().iter().map(|(n, _)| n.clone()).collect()
    }

    /// Returns the number of registered plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Returns true if no plugins are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Clear all registered plugins.
    pub fn clear(&self) {
        self.update(Vec::clear);
    }
}

impl<P> Default for RuntimeRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_unregister() {
        let registry: RuntimeRegistry<String> = RuntimeRegistry::new();

        registry.register("a", "plugin1".to_string());
        registry.register("b", "plugin2".to_string());
        assert_eq!(registry.len(), 2);

        assert!(registry.unregister("a"));
        assert_eq!(registry.len(), 1);

        // Unregistering again should return false
        assert!(!registry.unregister("a"));

        assert!(registry.unregister("b"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_override_last_write_wins() {
        let registry: RuntimeRegistry<i32> = RuntimeRegistry::new();
        registry.register("x", 1);
        registry.register("y", 2);
        registry.register("x", 3);

        assert_eq!(registry.len(), 2);
        assert_eq!(*registry.get("x").unwrap(), 3);
        // The override keeps its original position
        assert_eq!(registry.names(), vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_snapshot_isolated_from_writes() {
        let registry: RuntimeRegistry<i32> = RuntimeRegistry::new();
        registry.register("x", 1);
        let snapshot = registry.snapshot();
        registry.register("y", 2);
        registry.unregister("x");

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].0, "x");
        assert_eq!(registry.names(), vec!["y".to_string()]);
    }

    #[test]
    fn test_unregister_handle() {
        let registry: RuntimeRegistry<String> = RuntimeRegistry::new();

        let handle = registry.register("p", "plugin".to_string());
        let handle_clone = Arc::clone(&handle);

        // Can unregister with the clone
        assert!(registry.unregister_handle(&handle_clone));
        assert!(registry.is_empty());

        // Original handle no longer valid
        assert!(!registry.unregister_handle(&handle));
    }

    #[test]
    fn test_replaced_handle_not_removed() {
        let registry: RuntimeRegistry<i32> = RuntimeRegistry::new();
        let old = registry.register("x", 1);
        registry.register("x", 2);
        assert!(!registry.unregister_handle(&old));
        assert_eq!(*registry.get("x").unwrap(), 2);
    }

    #[test]
    fn test_clear() {
        let registry: RuntimeRegistry<String> = RuntimeRegistry::new();

        registry.register("a", "a".to_string());
        registry.register("b", "b".to_string());
        assert_eq!(registry.len(), 2);

        registry.clear();
        assert!(registry.is_empty());
        assert!(!registry.contains("a"));
    }
}
