//! Function and multi-function hooks
//!
//! A [`FunctionHook`] owns the listener registry, signal cache and transfer
//! guard for one intercepted call site. Its spec's install function attaches
//! policy bodies through [`FunctionHook::on_before`], [`FunctionHook::on_after`]
//! and [`FunctionHook::on_wrap`].
//!
//! Installed interceptors hold only a weak reference to the hook. Once the
//! registry is dropped the native calls pass straight through.
//!
//! Every policy body runs inside a panic boundary: a failure is logged and
//! the native call continues as if unhooked.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use finhook_engine::{CallScope, EngineServices, InterceptError, NativeCall};
use finhook_sdk::{NativeSignature, NetworkValue, ObjectHandle};

use super::guard::TransferGuard;
use super::spec::{DeliveryPolicy, HookId, HookSpec};
use crate::error::HookError;
use crate::listeners::ListenerRegistry;
use crate::signal::{Signal, SignalCache, SignalPayload};

/// Shared state of one intercepted call site
pub struct FunctionHook {
    spec: &'static HookSpec,
    services: EngineServices,
    listeners: ListenerRegistry,
    signals: SignalCache,
    guard: TransferGuard,
    inert: AtomicBool,
}

impl FunctionHook {
    pub fn new(spec: &'static HookSpec, services: EngineServices) -> Self {
        Self {
            spec,
            services,
            listeners: ListenerRegistry::new(spec.id.as_str()),
            signals: SignalCache::new(),
            guard: TransferGuard::new(),
            inert: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> HookId {
        self.spec.id
    }

    pub fn spec(&self) -> &'static HookSpec {
        self.spec
    }

    pub fn services(&self) -> &EngineServices {
        &self.services
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn signals(&self) -> &SignalCache {
        &self.signals
    }

    /// Transfer guard, only for hooks delivering once per transfer
    pub fn guard(&self) -> Option<&TransferGuard> {
        (self.spec.policy == DeliveryPolicy::OncePerTransfer).then_some(&self.guard)
    }

    /// Check if `source` has registered listeners
    pub fn is_sender(&self, source: ObjectHandle) -> bool {
        self.listeners.contains_source(source)
    }

    /// Check if the hook failed to install and must never deliver
    pub fn is_inert(&self) -> bool {
        self.inert.load(Ordering::Acquire)
    }

    pub(crate) fn mark_inert(&self) {
        self.inert.store(true, Ordering::Release);
    }

    /// Read a native property of a live object
    pub fn property(&self, object: ObjectHandle, name: &str) -> Option<NetworkValue> {
        self.services.world.property(object, name)
    }

    /// Read an object-valued property, only if it refers to a live object
    pub fn object_property(&self, object: ObjectHandle, name: &str) -> Option<ObjectHandle> {
        self.property(object, name)
            .and_then(|value| value.as_object())
            .filter(|handle| self.services.world.is_valid(*handle))
    }

    /// Send a typed signal from `source`
    ///
    /// Returns the number of listeners that accepted it.
    pub fn send<P: SignalPayload>(&self, source: ObjectHandle, payload: P) -> usize {
        self.send_values(source, P::NAME, payload.into_values())
    }

    /// Send the signal named `signal` from `source`
    ///
    /// Failures are logged and count as "not delivered".
    pub fn send_values(
        &self,
        source: ObjectHandle,
        signal: &str,
        values: Vec<NetworkValue>,
    ) -> usize {
        if self.is_inert() {
            return 0;
        }

        if !self.spec.declares_signal(signal) {
            tracing::error!(
                "[{}] Signal '{}' is not declared by this hook",
                self.id(),
                signal
            );
            return 0;
        }

        let listeners = self
            .listeners
            .listeners_of(source, self.services.world.as_ref());
        if listeners.is_empty() {
            return 0;
        }

        let result = self
            .signals
            .resolve(
                self.services.world.as_ref(),
                self.services.reflection.as_ref(),
                source,
                signal,
            )
            .and_then(|descriptor| Signal::new(descriptor).trigger(source, values, &listeners));

        match result {
            Ok(accepted) => accepted,
            // Reported once by the cache
            Err(HookError::MissingSignalDescriptor { .. }) => 0,
            Err(HookError::InvalidSource(_)) => 0,
            Err(err) => {
                tracing::error!("[{}] {}", self.id(), err);
                0
            }
        }
    }

    /// Run `body` before every call of `signature`
    pub fn on_before<F>(
        self: &Arc<Self>,
        signature: NativeSignature,
        body: F,
    ) -> Result<(), InterceptError>
    where
        F: Fn(&FunctionHook, &NativeCall) + Send + Sync + 'static,
    {
        let hook = Arc::downgrade(self);
        self.services.interceptor.install_before(
            signature,
            Arc::new(move |call: &NativeCall| {
                if let Some(hook) = hook.upgrade().filter(|h| !h.is_inert()) {
                    hook.contain(|| body(&hook, call));
                }
            }),
        )
    }

    /// Run `body` after every call of `signature`
    pub fn on_after<F>(
        self: &Arc<Self>,
        signature: NativeSignature,
        body: F,
    ) -> Result<(), InterceptError>
    where
        F: Fn(&FunctionHook, &NativeCall, &NetworkValue) + Send + Sync + 'static,
    {
        let hook = Arc::downgrade(self);
        self.services.interceptor.install_after(
            signature,
            Arc::new(move |call: &NativeCall, result: &NetworkValue| {
                if let Some(hook) = hook.upgrade().filter(|h| !h.is_inert()) {
                    hook.contain(|| body(&hook, call, result));
                }
            }),
        )
    }

    /// Run `body` around every call of `signature`
    ///
    /// If `body` never invokes the original, or panics before doing so, the
    /// original still runs.
    pub fn on_wrap<F>(
        self: &Arc<Self>,
        signature: NativeSignature,
        body: F,
    ) -> Result<(), InterceptError>
    where
        F: Fn(&FunctionHook, &mut CallScope<'_>) + Send + Sync + 'static,
    {
        let hook = Arc::downgrade(self);
        self.services.interceptor.install_wrap(
            signature,
            Arc::new(move |scope: &mut CallScope<'_>| {
                if let Some(hook) = hook.upgrade().filter(|h| !h.is_inert()) {
                    hook.contain(|| body(&hook, scope));
                }
            }),
        )
    }

    fn contain(&self, body: impl FnOnce()) {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(body)) {
            let err = HookError::HookPanicked(self.id(), panic_message(payload.as_ref()));
            tracing::error!("{}", err);
        }
    }
}

impl std::fmt::Debug for FunctionHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionHook")
            .field("id", &self.spec.id)
            .field("kind", &self.spec.kind())
            .field("listeners", &self.listeners)
            .field("inert", &self.is_inert())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
