//! Engine service bundle
//!
//! The collaborators the hook core consumes are acquired once by the host and
//! passed explicitly to whoever needs them. Nothing here is a global.

use std::fmt;
use std::sync::Arc;
use std::thread::ThreadId;

use crate::delegates::Delegates;
use crate::interceptor::Interceptor;
use crate::world::{ObjectWorld, Reflection};

/// Engine-side services used by the hook core
#[derive(Clone)]
pub struct EngineServices {
    /// Object liveness and property access
    pub world: Arc<dyn ObjectWorld>,

    /// Class and signal metadata
    pub reflection: Arc<dyn Reflection>,

    /// Native call interception
    pub interceptor: Arc<dyn Interceptor>,

    /// Per-object delegate subscription
    pub delegates: Arc<dyn Delegates>,

    /// Simulation thread ID for runtime checks, if known
    simulation_thread: Option<ThreadId>,
}

impl EngineServices {
    /// Create a new service bundle
    pub fn new(
        world: Arc<dyn ObjectWorld>,
        reflection: Arc<dyn Reflection>,
        interceptor: Arc<dyn Interceptor>,
        delegates: Arc<dyn Delegates>,
    ) -> Self {
        Self {
            world,
            reflection,
            interceptor,
            delegates,
            simulation_thread: None,
        }
    }

    /// Record the simulation thread
    pub fn with_simulation_thread(mut self, thread: ThreadId) -> Self {
        self.simulation_thread = Some(thread);
        self
    }

    /// Check if the current thread is the simulation thread
    ///
    /// Returns `false` when the simulation thread is unknown.
    pub fn is_simulation_thread(&self) -> bool {
        self.simulation_thread
            .map(|id| std::thread::current().id() == id)
            .unwrap_or(false)
    }
}

impl fmt::Debug for EngineServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineServices")
            .field("simulation_thread", &self.simulation_thread)
            .finish_non_exhaustive()
    }
}
