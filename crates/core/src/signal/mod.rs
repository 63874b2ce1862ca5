//! Signals and signal delivery
//!
//! A [`Signal`] pairs a resolved [`SignalDescriptor`] with the delivery
//! primitive: given a source and ordered values, it enqueues one
//! [`SignalEvent`] for every listener context bound to that source.
//!
//! Typed payloads implement [`SignalPayload`], usually through
//! `#[derive(SignalPayload)]`.

mod cache;
mod queue;

use std::sync::Arc;

use finhook_sdk::{NetworkValue, ObjectHandle, SignalDescriptor, SignalParam};

use crate::error::{HookError, HookResult};
use crate::listeners::ListenerContext;

pub use cache::SignalCache;
pub use queue::SignalQueue;

/// A struct describing one signal's parameters
///
/// Derive it with `#[derive(SignalPayload)]`; fields map to parameters in
/// declaration order.
pub trait SignalPayload {
    /// Script-visible signal name
    const NAME: &'static str;

    /// Parameter names and types in order
    fn params() -> Vec<SignalParam>;

    /// Field values in parameter order
    fn into_values(self) -> Vec<NetworkValue>;

    /// Descriptor a class exposing this signal would register
    fn descriptor() -> SignalDescriptor
    where
        Self: Sized,
    {
        SignalDescriptor::new(Self::NAME, Self::params())
    }
}

/// One signal occurrence queued for a listener
#[derive(Debug, Clone, PartialEq)]
pub struct SignalEvent {
    pub signal: Arc<SignalDescriptor>,
    pub source: ObjectHandle,
    pub values: Vec<NetworkValue>,
}

impl SignalEvent {
    /// Name of the signal
    pub fn name(&self) -> &str {
        self.signal.name()
    }
}

/// A resolved signal ready for delivery
#[derive(Debug, Clone)]
pub struct Signal {
    descriptor: Arc<SignalDescriptor>,
}

impl Signal {
    pub fn new(descriptor: Arc<SignalDescriptor>) -> Self {
        Self { descriptor }
    }

    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    pub fn descriptor(&self) -> &Arc<SignalDescriptor> {
        &self.descriptor
    }

    /// Deliver one occurrence from `source` to every listener
    ///
    /// Values are checked against the descriptor first; nothing is delivered
    /// on mismatch. Returns the number of listeners that accepted the event.
    pub fn trigger(
        &self,
        source: ObjectHandle,
        values: Vec<NetworkValue>,
        listeners: &[Arc<dyn ListenerContext>],
    ) -> HookResult<usize> {
        self.descriptor
            .check_values(&values)
            .map_err(|reason| HookError::SignalArguments {
                signal: self.name().to_string(),
                reason,
            })?;

        let mut accepted = 0;
        for listener in listeners {
            let event = SignalEvent {
                signal: self.descriptor.clone(),
                source,
                values: values.clone(),
            };
            if listener.enqueue(event) {
                accepted += 1;
            }
        }

        tracing::trace!(
            "Signal {} from {} delivered to {}/{} listeners",
            self.name(),
            source,
            accepted,
            listeners.len()
        );
        Ok(accepted)
    }
}
