//! In-process delegate table
//!
//! Stores per-object delegate subscriptions and broadcasts to them. Callbacks
//! are snapshotted before running, so a callback may subscribe or unsubscribe
//! without deadlocking.

use parking_lot::RwLock;
use slotmap::SlotMap;

use finhook_sdk::{NetworkValue, ObjectHandle};

use crate::delegates::{DelegateCallback, DelegateKey, Delegates};
use crate::error::InterceptError;

/// One subscription
struct DelegateEntry {
    source: ObjectHandle,
    delegate: &'static str,
    callback: DelegateCallback,
}

/// Subscription registry for native per-object delegates
#[derive(Default)]
pub struct DelegateTable {
    entries: RwLock<SlotMap<DelegateKey, DelegateEntry>>,
}

impl DelegateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire a delegate on an object
    ///
    /// Returns the number of callbacks invoked.
    pub fn broadcast(&self, source: ObjectHandle, delegate: &str, args: &[NetworkValue]) -> usize {
        let callbacks: Vec<DelegateCallback> = self
            .entries
            .read()
            .values()
            .filter(|e| e.source == source && e.delegate == delegate)
            .map(|e| e.callback.clone())
            .collect();

        tracing::trace!(
            "Broadcasting {} on {} to {} subscribers",
            delegate,
            source,
            callbacks.len()
        );

        for callback in &callbacks {
            callback(args);
        }
        callbacks.len()
    }

    /// Number of subscriptions bound to a delegate on an object
    pub fn subscriber_count(&self, source: ObjectHandle, delegate: &str) -> usize {
        self.entries
            .read()
            .values()
            .filter(|e| e.source == source && e.delegate == delegate)
            .count()
    }

    /// Drop every subscription on an object (object destroyed)
    pub fn clear_object(&self, source: ObjectHandle) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, e| e.source != source);
        before - entries.len()
    }
}

impl Delegates for DelegateTable {
    fn subscribe(
        &self,
        source: ObjectHandle,
        delegate: &'static str,
        callback: DelegateCallback,
    ) -> Result<DelegateKey, InterceptError> {
        if !source.is_valid() {
            return Err(InterceptError::InvalidObject(source));
        }

        let key = self.entries.write().insert(DelegateEntry {
            source,
            delegate,
            callback,
        });
        tracing::debug!("Subscribed to {} on {}", delegate, source);
        Ok(key)
    }

    fn unsubscribe(&self, key: DelegateKey) -> bool {
        self.entries.write().remove(key).is_some()
    }
}
