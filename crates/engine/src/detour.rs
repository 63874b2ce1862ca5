//! In-process detour table
//!
//! [`DetourTable`] implements [`Interceptor`] for native functions that the
//! simulation calls through the table instead of directly. Each exported
//! signature owns a chain of before, wrap and after hooks.
//!
//! Chains are copy-on-write: installing a hook replaces the chain, and every
//! call takes a snapshot before running hooks, so the table lock is never held
//! while hook code runs.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;

use finhook_sdk::{NativeSignature, NetworkValue};

use crate::error::InterceptError;
use crate::interceptor::{
    AfterHook, BeforeHook, CallScope, InterceptModes, Interceptor, NativeCall, NextFn, WrapHook,
};

/// Hooks installed on one native function
#[derive(Clone, Default)]
struct DetourChain {
    before: Vec<BeforeHook>,
    wrap: Vec<WrapHook>,
    after: Vec<AfterHook>,
}

impl DetourChain {
    fn modes(&self) -> InterceptModes {
        let mut modes = InterceptModes::empty();
        modes.set(InterceptModes::BEFORE, !self.before.is_empty());
        modes.set(InterceptModes::WRAP, !self.wrap.is_empty());
        modes.set(InterceptModes::AFTER, !self.after.is_empty());
        modes
    }

    fn run(&self, call: &mut NativeCall, original: &mut NextFn<'_>) -> NetworkValue {
        for hook in &self.before {
            hook(&*call);
        }

        let result = run_wraps(&self.wrap, call, original);

        for hook in &self.after {
            hook(&*call, &result);
        }

        result
    }
}

/// Run wrap hooks outermost first, ending in the original body
fn run_wraps(wraps: &[WrapHook], call: &mut NativeCall, next: &mut NextFn<'_>) -> NetworkValue {
    match wraps.split_first() {
        None => next(call),
        Some((outer, rest)) => {
            let mut inner = |call: &mut NativeCall| run_wraps(rest, call, &mut *next);
            let mut scope = CallScope::new(call, &mut inner);
            outer(&mut scope);
            scope.finish()
        }
    }
}

/// Dispatch table for interceptable native functions
#[derive(Default)]
pub struct DetourTable {
    /// Signatures resolvable in this engine build
    exports: RwLock<HashSet<NativeSignature>>,

    /// Installed chains keyed by signature
    chains: RwLock<HashMap<NativeSignature, Arc<DetourChain>>>,
}

impl DetourTable {
    /// Create a table with no exported functions
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table exporting the given signatures
    pub fn with_exports<I>(signatures: I) -> Self
    where
        I: IntoIterator<Item = NativeSignature>,
    {
        let table = Self::new();
        table.exports.write().extend(signatures);
        table
    }

    /// Make a signature resolvable
    pub fn export(&self, signature: NativeSignature) {
        self.exports.write().insert(signature);
    }

    /// Check if a signature is resolvable
    pub fn is_exported(&self, signature: &NativeSignature) -> bool {
        self.exports.read().contains(signature)
    }

    /// Intercept modes currently installed on a signature
    pub fn installed_modes(&self, signature: &NativeSignature) -> InterceptModes {
        self.chains
            .read()
            .get(signature)
            .map(|chain| chain.modes())
            .unwrap_or_default()
    }

    /// Check if any hook is installed on a signature
    pub fn is_hooked(&self, signature: &NativeSignature) -> bool {
        !self.installed_modes(signature).is_empty()
    }

    /// Call a native function through the table
    ///
    /// `original` is the function body. Without installed hooks it is called
    /// directly.
    pub fn invoke<F>(
        &self,
        signature: &NativeSignature,
        call: &mut NativeCall,
        mut original: F,
    ) -> NetworkValue
    where
        F: FnMut(&mut NativeCall) -> NetworkValue,
    {
        let chain = self.chains.read().get(signature).cloned();

        match chain {
            Some(chain) => chain.run(call, &mut original),
            None => original(call),
        }
    }

    fn install<F>(
        &self,
        signature: NativeSignature,
        mode: InterceptModes,
        add: F,
    ) -> Result<(), InterceptError>
    where
        F: FnOnce(&mut DetourChain),
    {
        if !self.is_exported(&signature) {
            tracing::error!("Cannot hook {}: symbol not exported", signature);
            return Err(InterceptError::SymbolNotFound(signature.to_string()));
        }

        let mut chains = self.chains.write();
        let mut chain = chains
            .get(&signature)
            .map(|existing| DetourChain::clone(existing))
            .unwrap_or_default();
        add(&mut chain);
        chains.insert(signature, Arc::new(chain));

        tracing::debug!("Installed {:?} detour on {}", mode, signature);
        Ok(())
    }
}

impl Interceptor for DetourTable {
    fn install_before(
        &self,
        signature: NativeSignature,
        hook: BeforeHook,
    ) -> Result<(), InterceptError> {
        self.install(signature, InterceptModes::BEFORE, |chain| {
            chain.before.push(hook)
        })
    }

    fn install_after(
        &self,
        signature: NativeSignature,
        hook: AfterHook,
    ) -> Result<(), InterceptError> {
        self.install(signature, InterceptModes::AFTER, |chain| {
            chain.after.push(hook)
        })
    }

    fn install_wrap(
        &self,
        signature: NativeSignature,
        hook: WrapHook,
    ) -> Result<(), InterceptError> {
        self.install(signature, InterceptModes::WRAP, |chain| chain.wrap.push(hook))
    }
}
