//! Hook installer
//!
//! Installs each function hook's interceptors at most once per process, on
//! the first registration that needs them. Installation is serialized and
//! never undone. A hook whose native functions cannot be intercepted stays
//! inert for good: registration keeps working, nothing is delivered.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::function::FunctionHook;
use super::spec::HookId;
use crate::error::HookError;

/// Outcome of installing one hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstallState {
    Installed,
    /// Interception failed, the hook is inert
    Failed,
    /// Disabled by configuration, the hook is inert
    Disabled,
}

/// Once-per-hook installation state
#[derive(Debug, Default)]
pub struct HookInstaller {
    states: Mutex<HashMap<HookId, InstallState>>,
    disabled: HashSet<String>,
    installs: AtomicUsize,
}

impl HookInstaller {
    /// Create an installer that never installs the `disabled` hook ids
    pub fn new<I>(disabled: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            disabled: disabled.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Install `hook` unless an earlier call already decided its state
    #[tracing::instrument(skip_all, fields(hook = %hook.id()))]
    pub fn ensure_installed(&self, hook: &Arc<FunctionHook>) -> InstallState {
        let id = hook.id();

        // Held across installation so concurrent first registrations wait
        let mut states = self.states.lock();
        if let Some(state) = states.get(&id) {
            return *state;
        }

        let state = if self.disabled.contains(id.as_str()) {
            hook.mark_inert();
            tracing::info!("Hook {} disabled by configuration", id);
            InstallState::Disabled
        } else {
            match hook.spec().install_fn().map(|install| install(hook)) {
                Some(Ok(())) => {
                    self.installs.fetch_add(1, Ordering::SeqCst);
                    tracing::info!("Installed hook {}", id);
                    InstallState::Installed
                }
                Some(Err(source)) => {
                    hook.mark_inert();
                    let err = HookError::InstallationFailure { hook: id, source };
                    tracing::error!("{}", err);
                    InstallState::Failed
                }
                None => {
                    hook.mark_inert();
                    tracing::error!("Hook {} has no native call site to install", id);
                    InstallState::Failed
                }
            }
        };

        states.insert(id, state);
        state
    }

    /// State of a hook, `None` if installation was never attempted
    pub fn state(&self, hook: HookId) -> Option<InstallState> {
        self.states.lock().get(&hook).copied()
    }

    /// Number of successful installations
    pub fn install_count(&self) -> usize {
        self.installs.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::spec::{DeliveryPolicy, HookBody, HookSpec};
    use crate::testing::Harness;
    use finhook_engine::InterceptError;
    use finhook_sdk::{NativeSignature, NetworkValue};

    const EXPORTED: NativeSignature = finhook_sdk::signatures::POWER_CIRCUIT_TICK;
    const MISSING: NativeSignature = NativeSignature::new("FGRemoved", "Gone");

    fn install_exported(hook: &Arc<FunctionHook>) -> Result<(), InterceptError> {
        hook.on_after(EXPORTED, |_, _, _: &NetworkValue| {})
    }

    fn install_missing(hook: &Arc<FunctionHook>) -> Result<(), InterceptError> {
        hook.on_after(MISSING, |_, _, _: &NetworkValue| {})
    }

    static GOOD: HookSpec = HookSpec {
        id: HookId::new("good"),
        classes: &[],
        policy: DeliveryPolicy::EveryCall,
        body: HookBody::Function {
            signals: &[],
            install: install_exported,
        },
    };

    static BROKEN: HookSpec = HookSpec {
        id: HookId::new("broken"),
        classes: &[],
        policy: DeliveryPolicy::EveryCall,
        body: HookBody::Function {
            signals: &[],
            install: install_missing,
        },
    };

    #[test]
    fn test_installs_once() {
        let harness = Harness::new();
        let installer = HookInstaller::default();
        let hook = Arc::new(FunctionHook::new(&GOOD, harness.services.clone()));

        assert_eq!(installer.ensure_installed(&hook), InstallState::Installed);
        assert_eq!(installer.ensure_installed(&hook), InstallState::Installed);
        assert_eq!(installer.install_count(), 1);
        assert!(harness.detours.is_hooked(&EXPORTED));
    }

    #[test]
    fn test_failure_is_permanent() {
        let harness = Harness::new();
        let installer = HookInstaller::default();
        let hook = Arc::new(FunctionHook::new(&BROKEN, harness.services.clone()));

        assert_eq!(installer.ensure_installed(&hook), InstallState::Failed);
        assert!(hook.is_inert());

        // Exporting the symbol later does not trigger a retry
        harness.detours.export(MISSING);
        assert_eq!(installer.ensure_installed(&hook), InstallState::Failed);
        assert!(!harness.detours.is_hooked(&MISSING));
        assert_eq!(installer.install_count(), 0);
    }

    #[test]
    fn test_disabled_hook_is_never_installed() {
        let harness = Harness::new();
        let installer = HookInstaller::new(["good".to_string()]);
        let hook = Arc::new(FunctionHook::new(&GOOD, harness.services.clone()));

        assert_eq!(installer.ensure_installed(&hook), InstallState::Disabled);
        assert_eq!(installer.state(GOOD.id), Some(InstallState::Disabled));
        assert!(!harness.detours.is_hooked(&EXPORTED));
        assert!(hook.is_inert());
    }

    #[test]
    fn test_concurrent_first_installs() {
        let harness = Harness::new();
        let installer = HookInstaller::default();
        let hook = Arc::new(FunctionHook::new(&GOOD, harness.services.clone()));

        std::thread::scope(|scope| {
            for _ in 0..16 {
                scope.spawn(|| installer.ensure_installed(&hook));
            }
        });

        assert_eq!(installer.install_count(), 1);
        assert_eq!(installer.state(GOOD.id), Some(InstallState::Installed));
    }
}
