//! Static reflection hooks
//!
//! Bind one listener to the native delegates of one object. There is no call
//! site interception and no fan-out: each registration owns its own
//! subscriptions and drops them on unregister.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use finhook_engine::{DelegateCallback, DelegateKey, Delegates, EngineServices};
use finhook_sdk::{NetworkValue, ObjectHandle, SignalDescriptor};

use super::spec::{DelegateBinding, HookBody, HookId, HookSpec};
use crate::error::{HookError, HookResult};
use crate::listeners::{ListenerContext, ListenerId};
use crate::signal::{Signal, SignalCache};

/// One listener's delegate subscriptions on one object
pub struct StaticReflectionHook {
    id: HookId,
    source: ObjectHandle,
    listener_id: ListenerId,
    listener: Weak<dyn ListenerContext>,
    delegates: Arc<dyn Delegates>,
    subscriptions: Mutex<Vec<DelegateKey>>,
}

impl StaticReflectionHook {
    /// Subscribe `listener` to every delegate `spec` binds on `source`
    ///
    /// Signals missing from the source's class are logged once through
    /// `cache`; their delegates are still bound but never deliver.
    pub fn register(
        spec: &'static HookSpec,
        services: &EngineServices,
        cache: &SignalCache,
        source: ObjectHandle,
        listener: &Arc<dyn ListenerContext>,
    ) -> HookResult<Arc<Self>> {
        let HookBody::StaticReflection { bindings } = spec.body else {
            return Err(HookError::UnknownHook(spec.id.to_string()));
        };

        if !services.world.is_valid(source) {
            return Err(HookError::InvalidSource(source));
        }

        let hook = Arc::new(Self {
            id: spec.id,
            source,
            listener_id: listener.id(),
            listener: Arc::downgrade(listener),
            delegates: services.delegates.clone(),
            subscriptions: Mutex::new(Vec::with_capacity(bindings.len())),
        });

        for binding in bindings {
            let descriptor = match cache.resolve(
                services.world.as_ref(),
                services.reflection.as_ref(),
                source,
                binding.signal,
            ) {
                Ok(descriptor) => Some(descriptor),
                Err(HookError::MissingSignalDescriptor { .. }) => None,
                Err(err) => {
                    hook.unregister();
                    return Err(err);
                }
            };

            let callback =
                Self::callback(spec.id, source, &hook.listener, *binding, descriptor);
            match services.delegates.subscribe(source, binding.delegate, callback) {
                Ok(key) => hook.subscriptions.lock().push(key),
                Err(err) => tracing::error!(
                    "[{}] Failed to bind {} on {}: {}",
                    spec.id,
                    binding.delegate,
                    source,
                    err
                ),
            }
        }

        tracing::debug!("[{}] {} bound to {}", spec.id, hook.listener_id, source);
        Ok(hook)
    }

    fn callback(
        id: HookId,
        source: ObjectHandle,
        listener: &Weak<dyn ListenerContext>,
        binding: DelegateBinding,
        descriptor: Option<Arc<SignalDescriptor>>,
    ) -> DelegateCallback {
        let listener = listener.clone();
        Arc::new(move |args: &[NetworkValue]| {
            let Some(descriptor) = &descriptor else {
                return;
            };
            let Some(listener) = listener.upgrade() else {
                return;
            };

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                let values =
                    (binding.convert)(args).ok_or_else(|| HookError::SignalArguments {
                        signal: binding.signal.to_string(),
                        reason: format!("unexpected {} broadcast", binding.delegate),
                    })?;
                Signal::new(descriptor.clone()).trigger(source, values, &[listener])
            }));

            match outcome {
                Ok(Ok(_)) => {}
                Ok(Err(err)) => tracing::error!("[{}] {}", id, err),
                Err(_) => tracing::error!(
                    "{}",
                    HookError::HookPanicked(id, binding.delegate.to_string())
                ),
            }
        })
    }

    /// Drop every delegate subscription
    ///
    /// Returns the number of subscriptions removed.
    pub fn unregister(&self) -> usize {
        let keys = std::mem::take(&mut *self.subscriptions.lock());
        let removed = keys
            .into_iter()
            .filter(|key| self.delegates.unsubscribe(*key))
            .count();
        if removed > 0 {
            tracing::debug!(
                "[{}] {} unbound from {}",
                self.id,
                self.listener_id,
                self.source
            );
        }
        removed
    }

    pub fn id(&self) -> HookId {
        self.id
    }

    pub fn source(&self) -> ObjectHandle {
        self.source
    }

    pub fn listener_id(&self) -> ListenerId {
        self.listener_id
    }

    /// The bound listener, if it is still alive
    pub fn listener(&self) -> Option<Arc<dyn ListenerContext>> {
        self.listener.upgrade()
    }

    /// Number of live delegate subscriptions
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.lock().len()
    }
}

impl std::fmt::Debug for StaticReflectionHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticReflectionHook")
            .field("id", &self.id)
            .field("source", &self.source)
            .field("listener", &self.listener_id)
            .field("subscriptions", &self.subscription_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::spec::DeliveryPolicy;
    use crate::testing::{listener, Harness};
    use finhook_sdk::{ClassDescriptor, SignalParam, ValueType};

    fn int_arg(args: &[NetworkValue]) -> Option<Vec<NetworkValue>> {
        match args {
            [NetworkValue::Int(n)] => Some(vec![NetworkValue::Int(*n)]),
            _ => None,
        }
    }

    static LEVEL: HookSpec = HookSpec {
        id: HookId::new("level"),
        classes: &["FGTank"],
        policy: DeliveryPolicy::EveryCall,
        body: HookBody::StaticReflection {
            bindings: &[
                DelegateBinding {
                    delegate: "OnLevelChanged",
                    signal: "LevelChanged",
                    convert: int_arg,
                },
                DelegateBinding {
                    delegate: "OnDrained",
                    signal: "Drained",
                    convert: int_arg,
                },
            ],
        },
    };

    fn setup() -> (Harness, ObjectHandle) {
        let harness = Harness::new();
        harness.objects.define_class(
            "FGTank",
            ClassDescriptor::new("Tank").with_signal(SignalDescriptor::new(
                "LevelChanged",
                vec![SignalParam::new("level", ValueType::Int)],
            )),
        );
        let tank = harness.objects.spawn("FGTank", "Tank");
        (harness, tank)
    }

    #[test]
    fn test_delegate_delivers_to_listener() {
        let (harness, tank) = setup();
        let cache = SignalCache::new();
        let (queue, context) = listener();

        let hook =
            StaticReflectionHook::register(&LEVEL, &harness.services, &cache, tank, &context)
                .unwrap();
        assert_eq!(hook.subscription_count(), 2);

        harness
            .delegates
            .broadcast(tank, "OnLevelChanged", &[NetworkValue::Int(40)]);
        let event = queue.pop().unwrap();
        assert_eq!(event.name(), "LevelChanged");
        assert_eq!(event.values, vec![NetworkValue::Int(40)]);

        // Declared by the hook but missing from the class
        harness
            .delegates
            .broadcast(tank, "OnDrained", &[NetworkValue::Int(0)]);
        assert!(queue.is_empty());
        assert_eq!(cache.miss_count(), 1);
    }

    #[test]
    fn test_malformed_broadcast_is_dropped() {
        let (harness, tank) = setup();
        let cache = SignalCache::new();
        let (queue, context) = listener();
        let _hook =
            StaticReflectionHook::register(&LEVEL, &harness.services, &cache, tank, &context)
                .unwrap();

        harness
            .delegates
            .broadcast(tank, "OnLevelChanged", &[NetworkValue::Str("full".into())]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_unregister_unsubscribes() {
        let (harness, tank) = setup();
        let cache = SignalCache::new();
        let (queue, context) = listener();
        let hook =
            StaticReflectionHook::register(&LEVEL, &harness.services, &cache, tank, &context)
                .unwrap();

        assert_eq!(hook.unregister(), 2);
        assert_eq!(hook.unregister(), 0);
        assert_eq!(harness.delegates.subscriber_count(tank, "OnLevelChanged"), 0);

        harness
            .delegates
            .broadcast(tank, "OnLevelChanged", &[NetworkValue::Int(1)]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_stale_source_is_rejected() {
        let (harness, tank) = setup();
        harness.objects.destroy(tank);
        let (_queue, context) = listener();

        let err = StaticReflectionHook::register(
            &LEVEL,
            &harness.services,
            &SignalCache::new(),
            tank,
            &context,
        )
        .unwrap_err();
        assert!(matches!(err, HookError::InvalidSource(_)));
    }
}
