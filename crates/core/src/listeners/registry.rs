//! Source → listener registry for one hook
//!
//! Membership is a set per (source, listener): registering twice is the same
//! as registering once. The mutex is held for map work only, never while a
//! listener receives a signal.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use finhook_engine::ObjectWorld;
use finhook_sdk::ObjectHandle;

use super::{ListenerContext, ListenerId};

type ListenerSet = HashMap<ListenerId, Weak<dyn ListenerContext>>;

/// Listener membership for one hook
pub struct ListenerRegistry {
    hook: &'static str,
    sources: Mutex<HashMap<ObjectHandle, ListenerSet>>,
}

impl ListenerRegistry {
    pub fn new(hook: &'static str) -> Self {
        Self {
            hook,
            sources: Mutex::new(HashMap::new()),
        }
    }

    /// Add `listener` to the listeners of `source`
    ///
    /// Returns `true` if it was not registered yet.
    pub fn insert(&self, source: ObjectHandle, listener: &Arc<dyn ListenerContext>) -> bool {
        let id = listener.id();
        let added = self
            .sources
            .lock()
            .entry(source)
            .or_default()
            .insert(id, Arc::downgrade(listener))
            .is_none();

        if added {
            tracing::debug!("[{}] {} registered on {}", self.hook, id, source);
        }
        added
    }

    /// Remove `listener` from the listeners of `source`
    ///
    /// Returns `true` if it was registered.
    pub fn remove(&self, source: ObjectHandle, listener: ListenerId) -> bool {
        let mut sources = self.sources.lock();
        let Some(set) = sources.get_mut(&source) else {
            return false;
        };

        let removed = set.remove(&listener).is_some();
        if set.is_empty() {
            sources.remove(&source);
        }
        drop(sources);

        if removed {
            tracing::debug!("[{}] {} unregistered from {}", self.hook, listener, source);
        }
        removed
    }

    /// Remove `listener` from every source
    ///
    /// Returns the number of sources it was removed from.
    pub fn remove_listener(&self, listener: ListenerId) -> usize {
        let mut sources = self.sources.lock();
        let mut removed = 0;
        sources.retain(|_, set| {
            if set.remove(&listener).is_some() {
                removed += 1;
            }
            !set.is_empty()
        });
        removed
    }

    /// Check if any listener is registered on `source`
    pub fn contains_source(&self, source: ObjectHandle) -> bool {
        self.sources.lock().contains_key(&source)
    }

    /// Check if `listener` is registered on `source`
    pub fn contains(&self, source: ObjectHandle, listener: ListenerId) -> bool {
        self.sources
            .lock()
            .get(&source)
            .is_some_and(|set| set.contains_key(&listener))
    }

    /// Live listeners of `source`
    ///
    /// A stale source or dropped listener is pruned here and yields nothing.
    pub fn listeners_of(
        &self,
        source: ObjectHandle,
        world: &dyn ObjectWorld,
    ) -> Vec<Arc<dyn ListenerContext>> {
        let alive = world.is_valid(source);
        let mut sources = self.sources.lock();

        if !alive {
            if sources.remove(&source).is_some() {
                tracing::debug!("[{}] Pruned stale source {}", self.hook, source);
            }
            return Vec::new();
        }

        let Some(set) = sources.get_mut(&source) else {
            return Vec::new();
        };

        let mut listeners = Vec::with_capacity(set.len());
        set.retain(|_, weak| match weak.upgrade() {
            Some(listener) => {
                listeners.push(listener);
                true
            }
            None => false,
        });
        if set.is_empty() {
            sources.remove(&source);
        }
        listeners
    }

    /// Sources with at least one registration
    pub fn sources(&self) -> Vec<ObjectHandle> {
        self.sources.lock().keys().copied().collect()
    }

    pub fn source_count(&self) -> usize {
        self.sources.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.lock().is_empty()
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("hook", &self.hook)
            .field("sources", &self.source_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::SignalQueue;
    use finhook_engine::ObjectTable;

    fn listener() -> Arc<dyn ListenerContext> {
        Arc::new(SignalQueue::new(4))
    }

    #[test]
    fn test_unknown_source_has_no_listeners() {
        let world = ObjectTable::new();
        let registry = ListenerRegistry::new("test");
        let source = world.spawn("A", "a");

        assert!(!registry.contains_source(source));
        assert!(registry.listeners_of(source, &world).is_empty());
        assert!(registry
            .listeners_of(ObjectHandle::invalid(), &world)
            .is_empty());
    }

    #[test]
    fn test_membership_is_idempotent() {
        let world = ObjectTable::new();
        let registry = ListenerRegistry::new("test");
        let source = world.spawn("A", "a");
        let a = listener();

        assert!(registry.insert(source, &a));
        assert!(!registry.insert(source, &a));
        assert!(!registry.insert(source, &a));
        assert_eq!(registry.listeners_of(source, &world).len(), 1);

        assert!(registry.remove(source, a.id()));
        assert!(!registry.contains(source, a.id()));
        assert!(!registry.remove(source, a.id()));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_unregister_sequences() {
        let world = ObjectTable::new();
        let registry = ListenerRegistry::new("test");
        let source = world.spawn("A", "a");
        let a = listener();

        // Membership follows the last operation, not a count
        for register in [true, true, false, false, true] {
            if register {
                registry.insert(source, &a);
            } else {
                registry.remove(source, a.id());
            }
            assert_eq!(registry.contains(source, a.id()), register);
        }
    }

    #[test]
    fn test_stale_source_is_pruned() {
        let world = ObjectTable::new();
        let registry = ListenerRegistry::new("test");
        let source = world.spawn("A", "a");
        let a = listener();

        registry.insert(source, &a);
        world.destroy(source);

        assert!(registry.listeners_of(source, &world).is_empty());
        assert!(!registry.contains_source(source));
    }

    #[test]
    fn test_dropped_listener_is_pruned() {
        let world = ObjectTable::new();
        let registry = ListenerRegistry::new("test");
        let source = world.spawn("A", "a");
        let a = listener();
        let b = listener();

        registry.insert(source, &a);
        registry.insert(source, &b);
        drop(a);

        let live = registry.listeners_of(source, &world);
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].id(), b.id());
    }

    #[test]
    fn test_remove_listener_everywhere() {
        let world = ObjectTable::new();
        let registry = ListenerRegistry::new("test");
        let first = world.spawn("A", "a");
        let second = world.spawn("A", "b");
        let a = listener();
        let b = listener();

        registry.insert(first, &a);
        registry.insert(second, &a);
        registry.insert(second, &b);

        assert_eq!(registry.remove_listener(a.id()), 2);
        assert!(!registry.contains_source(first));
        assert!(registry.contains(second, b.id()));
    }
}
