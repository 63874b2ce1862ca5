//! Hook registry service
//!
//! The single entry point scripts use to attach listeners to hooks. It owns
//! one [`FunctionHook`] per function spec, one signal cache per static
//! reflection spec, the live static bindings and the [`HookInstaller`].
//!
//! The host constructs it once with the engine services and shares it; there
//! is no global instance.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use finhook_engine::EngineServices;
use finhook_sdk::{NativeClass, ObjectHandle};

use super::catalog;
use super::function::FunctionHook;
use super::installer::{HookInstaller, InstallState};
use super::spec::{HookBody, HookId, HookSpec};
use super::static_reflection::StaticReflectionHook;
use crate::config::CoreConfig;
use crate::error::{HookError, HookResult};
use crate::listeners::{ListenerContext, ListenerId};
use crate::signal::SignalCache;

type BindingKey = (HookId, ObjectHandle, ListenerId);

/// Process-wide hook service
pub struct HookRegistry {
    services: EngineServices,
    specs: Vec<&'static HookSpec>,
    function_hooks: HashMap<HookId, Arc<FunctionHook>>,
    static_caches: HashMap<HookId, SignalCache>,
    static_bindings: Mutex<HashMap<BindingKey, Arc<StaticReflectionHook>>>,
    installer: HookInstaller,
}

impl HookRegistry {
    /// Create a registry serving every hook in the catalog
    pub fn new(services: EngineServices, config: &CoreConfig) -> Self {
        Self::with_specs(services, config, catalog::ALL)
    }

    /// Create a registry serving the given hooks
    pub fn with_specs(
        services: EngineServices,
        config: &CoreConfig,
        specs: &[&'static HookSpec],
    ) -> Self {
        for disabled in &config.disabled_hooks {
            if !specs.iter().any(|spec| spec.id.as_str() == disabled) {
                tracing::warn!("Unknown hook '{}' in disabled_hooks", disabled);
            }
        }

        let mut function_hooks = HashMap::new();
        let mut static_caches = HashMap::new();
        for spec in specs {
            match spec.body {
                HookBody::Function { .. } | HookBody::MultiFunction { .. } => {
                    function_hooks.insert(
                        spec.id,
                        Arc::new(FunctionHook::new(spec, services.clone())),
                    );
                }
                HookBody::StaticReflection { .. } => {
                    static_caches.insert(spec.id, SignalCache::new());
                }
            }
        }

        tracing::debug!("Hook registry serving {} hooks", specs.len());

        Self {
            services,
            specs: specs.to_vec(),
            function_hooks,
            static_caches,
            static_bindings: Mutex::new(HashMap::new()),
            installer: HookInstaller::new(config.disabled_hooks.iter().cloned()),
        }
    }

    pub fn services(&self) -> &EngineServices {
        &self.services
    }

    /// Every hook spec served by this registry
    pub fn specs(&self) -> &[&'static HookSpec] {
        &self.specs
    }

    pub fn spec(&self, hook: impl AsRef<str>) -> Option<&'static HookSpec> {
        let hook = hook.as_ref();
        self.specs.iter().copied().find(|spec| spec.id.as_str() == hook)
    }

    /// Shared state of a function hook
    pub fn function_hook(&self, hook: impl AsRef<str>) -> Option<&Arc<FunctionHook>> {
        let spec = self.spec(hook)?;
        self.function_hooks.get(&spec.id)
    }

    /// Signal descriptor cache of any hook
    pub fn signal_cache(&self, hook: impl AsRef<str>) -> Option<&SignalCache> {
        let spec = self.spec(hook)?;
        match self.function_hooks.get(&spec.id) {
            Some(function_hook) => Some(function_hook.signals()),
            None => self.static_caches.get(&spec.id),
        }
    }

    /// Register `listener` for signals of `hook` from `source`
    ///
    /// Registering the same listener twice is a no-op. The first registration
    /// of a function hook installs its interceptors; if that fails the hook
    /// stays inert and registration still succeeds.
    #[tracing::instrument(
        skip_all,
        fields(hook = hook.as_ref(), source = %source, listener = %listener.id())
    )]
    pub fn register(
        &self,
        hook: impl AsRef<str>,
        source: ObjectHandle,
        listener: &Arc<dyn ListenerContext>,
    ) -> HookResult<()> {
        let spec = self
            .spec(hook.as_ref())
            .ok_or_else(|| HookError::UnknownHook(hook.as_ref().to_string()))?;

        if !self.services.world.is_valid(source) {
            self.prune_static_source(source);
            return Err(HookError::InvalidSource(source));
        }

        if let Some(function_hook) = self.function_hooks.get(&spec.id) {
            function_hook.listeners().insert(source, listener);
            self.installer.ensure_installed(function_hook);
            return Ok(());
        }

        let key = (spec.id, source, listener.id());
        let mut bindings = self.static_bindings.lock();
        if bindings.contains_key(&key) {
            return Ok(());
        }

        let cache = self
            .static_caches
            .get(&spec.id)
            .ok_or_else(|| HookError::UnknownHook(spec.id.to_string()))?;
        let binding =
            StaticReflectionHook::register(spec, &self.services, cache, source, listener)?;
        bindings.insert(key, binding);
        Ok(())
    }

    /// Remove `listener` from `hook` on `source`
    ///
    /// Returns `true` if it was registered. Installed interceptors stay.
    pub fn unregister(
        &self,
        hook: impl AsRef<str>,
        source: ObjectHandle,
        listener: ListenerId,
    ) -> bool {
        let Some(spec) = self.spec(hook) else {
            return false;
        };

        if let Some(function_hook) = self.function_hooks.get(&spec.id) {
            return function_hook.listeners().remove(source, listener);
        }

        let binding = self
            .static_bindings
            .lock()
            .remove(&(spec.id, source, listener));
        match binding {
            Some(binding) => {
                binding.unregister();
                true
            }
            None => false,
        }
    }

    /// Live listeners of `hook` on `source`
    pub fn listeners_of(
        &self,
        hook: impl AsRef<str>,
        source: ObjectHandle,
    ) -> Vec<Arc<dyn ListenerContext>> {
        let Some(spec) = self.spec(hook) else {
            return Vec::new();
        };

        if let Some(function_hook) = self.function_hooks.get(&spec.id) {
            return function_hook
                .listeners()
                .listeners_of(source, self.services.world.as_ref());
        }

        if !self.services.world.is_valid(source) {
            self.prune_static_source(source);
            return Vec::new();
        }
        self.static_bindings
            .lock()
            .values()
            .filter(|b| b.id() == spec.id && b.source() == source)
            .filter_map(|b| b.listener())
            .collect()
    }

    /// Drop every static binding on a destroyed `source`
    ///
    /// Returns the number of bindings removed.
    fn prune_static_source(&self, source: ObjectHandle) -> usize {
        let stale: Vec<_> = {
            let mut bindings = self.static_bindings.lock();
            let keys: Vec<BindingKey> = bindings
                .keys()
                .filter(|(_, bound, _)| *bound == source)
                .copied()
                .collect();
            keys.iter().filter_map(|key| bindings.remove(key)).collect()
        };
        for binding in &stale {
            binding.unregister();
        }
        if !stale.is_empty() {
            tracing::debug!("Pruned {} bindings on stale {}", stale.len(), source);
        }
        stale.len()
    }

    /// Check if `hook`'s interceptors are installed
    pub fn is_installed(&self, hook: impl AsRef<str>) -> bool {
        self.install_state(hook) == Some(InstallState::Installed)
    }

    /// Installation state of a function hook, `None` before first use
    pub fn install_state(&self, hook: impl AsRef<str>) -> Option<InstallState> {
        let spec = self.spec(hook)?;
        self.installer.state(spec.id)
    }

    /// Number of function hooks installed so far
    pub fn install_count(&self) -> usize {
        self.installer.install_count()
    }

    /// Hooks that can observe objects of `class`
    pub fn hooks_for_class(&self, class: &NativeClass) -> Vec<HookId> {
        self.specs
            .iter()
            .filter(|spec| spec.applies_to(class))
            .map(|spec| spec.id)
            .collect()
    }

    /// Register `listener` on every hook applicable to `source`'s class
    ///
    /// Returns the hooks it was registered with.
    pub fn register_object(
        &self,
        source: ObjectHandle,
        listener: &Arc<dyn ListenerContext>,
    ) -> HookResult<Vec<HookId>> {
        let class = self
            .services
            .world
            .class_of(source)
            .ok_or(HookError::InvalidSource(source))?;

        let hooks = self.hooks_for_class(&class);
        for hook in &hooks {
            self.register(hook, source, listener)?;
        }

        tracing::debug!(
            "{} attached to {} ({}) through {} hooks",
            listener.id(),
            source,
            class,
            hooks.len()
        );
        Ok(hooks)
    }

    /// Detach `listener` from every hook and source
    ///
    /// Returns the number of registrations removed.
    pub fn unregister_listener(&self, listener: ListenerId) -> usize {
        let mut removed: usize = self
            .function_hooks
            .values()
            .map(|hook| hook.listeners().remove_listener(listener))
            .sum();

        let detached: Vec<_> = {
            let mut bindings = self.static_bindings.lock();
            let keys: Vec<BindingKey> = bindings
                .keys()
                .filter(|(_, _, id)| *id == listener)
                .copied()
                .collect();
            keys.iter().filter_map(|key| bindings.remove(key)).collect()
        };
        for binding in &detached {
            binding.unregister();
        }
        removed += detached.len();

        if removed > 0 {
            tracing::debug!("{} detached from {} registrations", listener, removed);
        }
        removed
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("hooks", &self.specs.iter().map(|s| s.id).collect::<Vec<_>>())
            .field("installed", &self.install_count())
            .finish()
    }
}
