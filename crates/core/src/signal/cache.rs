//! Signal descriptor cache
//!
//! Resolving a descriptor walks reflection metadata, which costs far more
//! than delivery. Results are cached per (native class, signal name), misses
//! included, so a missing descriptor is reported once and never looked up
//! again.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use finhook_engine::{ObjectWorld, Reflection};
use finhook_sdk::{NativeClass, ObjectHandle, SignalDescriptor};

use crate::error::{HookError, HookResult};

type CacheKey = (NativeClass, String);

/// Per-hook cache of resolved signal descriptors
#[derive(Default)]
pub struct SignalCache {
    entries: Mutex<HashMap<CacheKey, Option<Arc<SignalDescriptor>>>>,
}

impl SignalCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the descriptor named `signal` for the class of `source`
    ///
    /// A stale source yields [`HookError::InvalidSource`] and is not cached.
    pub fn resolve(
        &self,
        world: &dyn ObjectWorld,
        reflection: &dyn Reflection,
        source: ObjectHandle,
        signal: &str,
    ) -> HookResult<Arc<SignalDescriptor>> {
        let class = world
            .class_of(source)
            .ok_or(HookError::InvalidSource(source))?;
        let key = (class.clone(), signal.to_string());

        if let Some(cached) = self.entries.lock().get(&key) {
            return cached.clone().ok_or(HookError::MissingSignalDescriptor {
                class,
                signal: signal.to_string(),
            });
        }

        let found = reflection
            .find_class(&class)
            .and_then(|descriptor| descriptor.find_signal(signal));

        let (resolved, first_miss) = match self.entries.lock().entry(key) {
            Entry::Occupied(entry) => (entry.get().clone(), false),
            Entry::Vacant(entry) => {
                let miss = found.is_none();
                (entry.insert(found).clone(), miss)
            }
        };

        resolved.ok_or_else(|| {
            let err = HookError::MissingSignalDescriptor {
                class,
                signal: signal.to_string(),
            };
            if first_miss {
                tracing::error!("{}", err);
            }
            err
        })
    }

    /// Number of cached entries, misses included
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Number of cached misses
    pub fn miss_count(&self) -> usize {
        self.entries.lock().values().filter(|e| e.is_none()).count()
    }
}
