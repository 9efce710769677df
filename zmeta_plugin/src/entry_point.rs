use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use crate::{RuntimeRegistry, RuntimeRegistryHandle};

/// An entry registered by discovery, and the entry it replaced.
#[derive(Debug)]
struct Discovered<P> {
    name: String,
    handle: RuntimeRegistryHandle<P>,
    replaced: Option<RuntimeRegistryHandle<P>>,
}

/// Once-per-process discovery of externally supplied plugins for one entry-point group.
///
/// Entry points are merged into a [`RuntimeRegistry`] the first time [`discover`](Self::discover) is called.
/// Later calls are no-ops, so no entry is duplicated.
/// [`clear`](Self::clear) removes the discovered entries again, restores any entries they replaced, and re-arms discovery.
#[derive(Debug)]
pub struct EntryPointDiscovery<P> {
    group: &'static str,
    done: AtomicBool,
    discovered: Mutex<Vec<Discovered<P>>>,
}

impl<P> EntryPointDiscovery<P> {
    /// Create a new discovery for the entry-point `group`.
    #[must_use]
    pub const fn new(group: &'static str) -> Self {
        Self {
            group,
            done: AtomicBool::new(false),
            discovered: Mutex::new(Vec::new()),
        }
    }

    /// The entry-point group name.
    #[must_use]
    pub const fn group(&self) -> &'static str {
        self.group
    }

    /// Returns true if discovery has run since creation or the last [`clear`](Self::clear).
    #[must_use]
    pub fn is_discovered(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    /// Merge the entry points produced by `load` into `registry`, unless that already happened.
    ///
    /// `load` is only invoked on the first call, and later calls do not lock.
    /// Returns the number of entry points registered by this call.
    pub fn discover<I>(&self, registry: &RuntimeRegistry<P>, load: impl FnOnce() -> I) -> usize
    where
        I: IntoIterator<Item = (String, P)>,
    {
        if self.done.load(Ordering::Acquire) {
            return 0;
        }
        let mut discovered = self.discovered.lock().unwrap_or_else(PoisonError::into_inner);
        if self.done.load(Ordering::Acquire) {
            return 0;
        }
        let mut count = 0;
        for (name, plugin) in load() {
            log::debug!("registering `{name}` from entry-point group `{}`", self.group);
            let handle = Arc::new(plugin);
            let replaced = registry.replace(name.clone(), Arc::clone(&handle));
            if let Some(entry) = discovered.iter_mut().find(|entry| entry.name == name) {
                entry.handle = handle;
            } else {
                discovered.push(Discovered {
                    name,
                    handle,
                    replaced,
                });
            }
            count += 1;
        }
        self.done.store(true, Ordering::Release);
        count
    }

    /// Remove every discovered entry from `registry` and re-arm discovery.
    ///
    /// An entry that replaced a plugin registered before discovery is reverted to that plugin.
    /// Entries replaced again since discovery are left untouched.
    pub fn clear(&self, registry: &RuntimeRegistry<P>) {
        let mut discovered = self.discovered.lock().unwrap_or_else(PoisonError::into_inner);
        for entry in discovered.drain(..) {
            let current = registry.get(&entry.name);
            if !current.is_some_and(|current| Arc::ptr_eq(&current, &entry.handle)) {
                continue;
            }
            match entry.replaced {
                Some(replaced) => {
                    registry.replace(entry.name, replaced);
                }
                None => {
                    registry.unregister_handle(&entry.handle);
                }
            }
        }
        self.done.store(false, Ordering::Release);
    }
}
