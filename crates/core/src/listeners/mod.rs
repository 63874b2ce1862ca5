//! Listener contexts and per-hook listener registries
//!
//! A listener context is whatever asked to be notified: usually a script
//! bound to a game object. The hook subsystem never owns one; registries only
//! hold weak references keyed by [`ListenerId`].

mod registry;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::signal::SignalEvent;

pub use registry::ListenerRegistry;

/// Stable identity of a listener context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Allocate a fresh, process-unique id
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// A registered receiver of signals
///
/// `enqueue` is called on the simulation thread and must not block.
pub trait ListenerContext: Send + Sync {
    /// Identity used for registry membership
    fn id(&self) -> ListenerId;

    /// Queue a signal for later processing
    ///
    /// Returns `false` if the event was dropped.
    fn enqueue(&self, event: SignalEvent) -> bool;
}
