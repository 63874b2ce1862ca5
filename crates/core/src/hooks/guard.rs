//! Transfer guard
//!
//! Counts in-flight calls per source for hooks whose logical operation can
//! cross several native call paths (an outer call that may run an inner one,
//! or both running from parallel stacks). Only the exit that brings the count
//! to zero or below may report the operation as complete.

use std::collections::HashMap;

use parking_lot::Mutex;

use finhook_sdk::ObjectHandle;

use crate::error::HookError;

/// Per-source in-flight counter
#[derive(Debug, Default)]
pub struct TransferGuard {
    counters: Mutex<HashMap<ObjectHandle, i32>>,
}

impl TransferGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark one call on `source` as in flight
    pub fn enter(&self, source: ObjectHandle) {
        *self.counters.lock().entry(source).or_insert(0) += 1;
    }

    /// Mark one call on `source` as finished
    ///
    /// Returns `true` for exactly the exit that completes the outermost call.
    /// An exit without a matching enter changes nothing and returns `false`.
    pub fn exit(&self, source: ObjectHandle) -> bool {
        let completed = {
            let mut counters = self.counters.lock();
            match counters.get_mut(&source) {
                Some(count) => {
                    *count -= 1;
                    let finished = *count <= 0;
                    if finished {
                        counters.remove(&source);
                    }
                    Some(finished)
                }
                None => None,
            }
        };

        completed.unwrap_or_else(|| {
            tracing::warn!("{}", HookError::GuardImbalance(source));
            false
        })
    }

    /// Enter `source` and exit it again when the returned token is completed
    /// or dropped
    ///
    /// Dropping the token, including while unwinding, exits without
    /// reporting completion.
    pub fn track(&self, source: ObjectHandle) -> InFlight<'_> {
        self.enter(source);
        InFlight {
            guard: self,
            source,
            armed: true,
        }
    }

    /// Current in-flight count for `source`
    pub fn in_flight(&self, source: ObjectHandle) -> i32 {
        self.counters.lock().get(&source).copied().unwrap_or(0)
    }

    /// Check if no call is in flight on any source
    pub fn is_idle(&self) -> bool {
        self.counters.lock().is_empty()
    }
}

/// One in-flight call on a source, see [`TransferGuard::track`]
#[must_use = "dropping the token exits immediately"]
#[derive(Debug)]
pub struct InFlight<'a> {
    guard: &'a TransferGuard,
    source: ObjectHandle,
    armed: bool,
}

impl InFlight<'_> {
    /// Exit the source, returning `true` if this completed the outermost call
    pub fn complete(mut self) -> bool {
        self.armed = false;
        self.guard.exit(self.source)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.guard.exit(self.source);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;

    fn source() -> ObjectHandle {
        ObjectHandle::from_parts(7, 1)
    }

    #[test]
    fn test_nested_enter_exit() {
        let guard = TransferGuard::new();
        guard.enter(source());
        guard.enter(source());
        assert_eq!(guard.in_flight(source()), 2);

        assert!(!guard.exit(source()));
        assert!(guard.exit(source()));
        assert!(guard.is_idle());
    }

    #[test]
    fn test_exit_without_enter_is_noop() {
        let guard = TransferGuard::new();
        assert!(!guard.exit(source()));
        assert!(guard.is_idle());

        guard.enter(source());
        assert!(guard.exit(source()));
        assert!(!guard.exit(source()));
        assert_eq!(guard.in_flight(source()), 0);
    }

    #[test]
    fn test_sources_are_independent() {
        let guard = TransferGuard::new();
        let other = ObjectHandle::from_parts(8, 1);

        guard.enter(source());
        guard.enter(other);
        assert!(guard.exit(other));
        assert_eq!(guard.in_flight(source()), 1);
        assert!(guard.exit(source()));
    }

    #[test]
    fn test_interleaved_exits_complete_once() {
        const THREADS: usize = 8;
        let guard = TransferGuard::new();
        let completed = AtomicUsize::new(0);
        let barrier = Barrier::new(THREADS);

        // Hold the operation open so every thread's exit is nested inside it
        guard.enter(source());
        std::thread::scope(|scope| {
            for _ in 0..THREADS {
                scope.spawn(|| {
                    guard.enter(source());
                    barrier.wait();
                    if guard.exit(source()) {
                        completed.fetch_add(1, Ordering::SeqCst);
                    }
                });
            }
        });

        assert_eq!(completed.load(Ordering::SeqCst), 0);
        assert!(guard.exit(source()));
        assert!(guard.is_idle());
    }

    #[test]
    fn test_balanced_parallel_calls_complete_exactly_once() {
        const THREADS: usize = 8;
        let guard = TransferGuard::new();
        let completed = AtomicUsize::new(0);
        let barrier = Barrier::new(THREADS);

        std::thread::scope(|scope| {
            for _ in 0..THREADS {
                scope.spawn(|| {
                    guard.enter(source());
                    barrier.wait();
                    if guard.exit(source()) {
                        completed.fetch_add(1, Ordering::SeqCst);
                    }
                });
            }
        });

        // All enters happen before any exit, so only the last exit completes
        assert_eq!(completed.load(Ordering::SeqCst), 1);
        assert!(guard.is_idle());
    }

    #[test]
    fn test_tracked_call_exits_on_unwind() {
        let guard = TransferGuard::new();

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _call = guard.track(source());
            panic!("wrapped call failed");
        }));
        assert!(outcome.is_err());
        assert!(guard.is_idle());

        let outer = guard.track(source());
        let inner = guard.track(source());
        assert!(!inner.complete());
        assert!(outer.complete());
        assert!(guard.is_idle());
    }
}
