//! Shared fixtures for unit tests

use std::sync::Arc;

use finhook_engine::{DelegateTable, DetourTable, EngineServices, ObjectTable};
use finhook_sdk::NATIVE_SIGNATURES;

use crate::listeners::ListenerContext;
use crate::signal::SignalQueue;

/// In-process engine with every native signature exported
pub(crate) struct Harness {
    pub objects: Arc<ObjectTable>,
    pub detours: Arc<DetourTable>,
    pub delegates: Arc<DelegateTable>,
    pub services: EngineServices,
}

impl Harness {
    pub fn new() -> Self {
        let objects = Arc::new(ObjectTable::new());
        let detours = Arc::new(DetourTable::with_exports(NATIVE_SIGNATURES.iter().copied()));
        let delegates = Arc::new(DelegateTable::new());
        let services = EngineServices::new(
            objects.clone(),
            objects.clone(),
            detours.clone(),
            delegates.clone(),
        );

        Self {
            objects,
            detours,
            delegates,
            services,
        }
    }
}

/// A signal queue and the same queue as a listener context
pub(crate) fn listener() -> (Arc<SignalQueue>, Arc<dyn ListenerContext>) {
    let queue = Arc::new(SignalQueue::new(64));
    let context: Arc<dyn ListenerContext> = queue.clone();
    (queue, context)
}

/// Names of the pending signals, oldest first
pub(crate) fn drained_names(queue: &SignalQueue) -> Vec<String> {
    queue
        .drain()
        .into_iter()
        .map(|event| event.name().to_string())
        .collect()
}
