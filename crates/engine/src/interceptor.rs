//! Native call interception capability
//!
//! The hook core never patches code itself. It asks an [`Interceptor`] to run
//! callbacks before, after, or around a native function identified by its
//! [`NativeSignature`]. How the engine side realises this (trampolines,
//! vtable slots, a dispatch table) is not visible to the core.
//!
//! # Call model
//!
//! ```text
//! game code → native call site → before hooks → wrap hooks (outermost first)
//!                                                   └→ original body
//!                                            → after hooks → caller
//! ```

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

use finhook_sdk::{NativeSignature, NetworkValue, ObjectHandle};

use crate::error::InterceptError;

bitflags! {
    /// Intercept modes installed on a native function
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct InterceptModes: u8 {
        const BEFORE = 1 << 0;
        const AFTER = 1 << 1;
        const WRAP = 1 << 2;
    }
}

/// Arguments of one native call
#[derive(Debug, Clone, PartialEq)]
pub struct NativeCall {
    /// Object the function is invoked on
    pub receiver: ObjectHandle,
    /// Arguments in native order; out-parameters are written back in place
    pub args: Vec<NetworkValue>,
}

impl NativeCall {
    pub fn new(receiver: ObjectHandle, args: Vec<NetworkValue>) -> Self {
        Self { receiver, args }
    }

    pub fn arg(&self, index: usize) -> Option<&NetworkValue> {
        self.args.get(index)
    }

    pub fn arg_mut(&mut self, index: usize) -> Option<&mut NetworkValue> {
        self.args.get_mut(index)
    }
}

/// Runs before the original body, cannot change the call
pub type BeforeHook = Arc<dyn Fn(&NativeCall) + Send + Sync>;

/// Runs after the original body with the call's result
pub type AfterHook = Arc<dyn Fn(&NativeCall, &NetworkValue) + Send + Sync>;

/// Runs around the original body with control over invocation
pub type WrapHook = Arc<dyn Fn(&mut CallScope<'_>) + Send + Sync>;

/// The next layer of a call chain: another wrap hook or the original body
pub type NextFn<'a> = dyn FnMut(&mut NativeCall) -> NetworkValue + 'a;

/// Access to a wrapped call and its result
///
/// The wrapped function runs at most once per scope, even if it unwinds. If
/// a wrap hook returns without invoking it and without overriding the result,
/// the chain invokes it afterwards.
pub struct CallScope<'a> {
    call: &'a mut NativeCall,
    next: &'a mut NextFn<'a>,
    result: Option<NetworkValue>,
    started: bool,
}

impl<'a> CallScope<'a> {
    pub fn new(call: &'a mut NativeCall, next: &'a mut NextFn<'a>) -> Self {
        Self {
            call,
            next,
            result: None,
            started: false,
        }
    }

    /// Object the function is invoked on
    pub fn receiver(&self) -> ObjectHandle {
        self.call.receiver
    }

    pub fn args(&self) -> &[NetworkValue] {
        &self.call.args
    }

    pub fn args_mut(&mut self) -> &mut [NetworkValue] {
        &mut self.call.args
    }

    /// Invoke the wrapped function, or return its result if already invoked
    ///
    /// A wrapped function that unwound is never run again; its result is
    /// `Nil`.
    pub fn invoke(&mut self) -> &NetworkValue {
        if self.result.is_none() && !self.started {
            self.started = true;
            let value = (self.next)(&mut *self.call);
            self.result = Some(value);
        }
        self.result.get_or_insert(NetworkValue::Nil)
    }

    /// Result of the wrapped function, `None` until invoked or overridden
    pub fn result(&self) -> Option<&NetworkValue> {
        self.result.as_ref()
    }

    /// Whether the wrapped function has produced a result
    pub fn is_complete(&self) -> bool {
        self.result.is_some()
    }

    /// Whether the wrapped function was entered, including runs that unwound
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Skip the wrapped function and return `value` to the caller instead
    pub fn override_result(&mut self, value: NetworkValue) {
        self.result = Some(value);
    }

    /// Finish the scope, invoking the wrapped function if nothing did
    pub fn finish(mut self) -> NetworkValue {
        match self.result.take() {
            Some(value) => value,
            None if self.started => NetworkValue::Nil,
            None => (self.next)(&mut *self.call),
        }
    }
}

impl fmt::Debug for CallScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallScope")
            .field("call", &self.call)
            .field("result", &self.result)
            .finish()
    }
}

/// Ability to intercept native engine functions
///
/// Installation is permanent: there is no uninstall operation.
pub trait Interceptor: Send + Sync {
    /// Run `hook` before every call of `signature`
    fn install_before(
        &self,
        signature: NativeSignature,
        hook: BeforeHook,
    ) -> Result<(), InterceptError>;

    /// Run `hook` after every call of `signature`
    fn install_after(
        &self,
        signature: NativeSignature,
        hook: AfterHook,
    ) -> Result<(), InterceptError>;

    /// Run `hook` around every call of `signature`
    fn install_wrap(&self, signature: NativeSignature, hook: WrapHook)
        -> Result<(), InterceptError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> ObjectHandle {
        ObjectHandle::from_parts(1, 1)
    }

    #[test]
    fn test_scope_invokes_once() {
        let mut calls = 0;
        let mut next = |call: &mut NativeCall| {
            calls += 1;
            call.args[0] = NetworkValue::Int(5);
            NetworkValue::Bool(true)
        };
        let mut call = NativeCall::new(handle(), vec![NetworkValue::Nil]);

        {
            let mut scope = CallScope::new(&mut call, &mut next);
            assert_eq!(scope.invoke(), &NetworkValue::Bool(true));
            assert_eq!(scope.invoke(), &NetworkValue::Bool(true));
            assert_eq!(scope.args()[0], NetworkValue::Int(5));
            assert_eq!(scope.finish(), NetworkValue::Bool(true));
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_scope_finish_invokes_when_untouched() {
        let mut calls = 0;
        let mut next = |_: &mut NativeCall| {
            calls += 1;
            NetworkValue::Int(1)
        };
        let mut call = NativeCall::new(handle(), vec![]);

        let scope = CallScope::new(&mut call, &mut next);
        assert!(!scope.is_complete());
        assert_eq!(scope.finish(), NetworkValue::Int(1));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_scope_override_skips_original() {
        let mut calls = 0;
        let mut next = |_: &mut NativeCall| {
            calls += 1;
            NetworkValue::Bool(true)
        };
        let mut call = NativeCall::new(handle(), vec![]);

        let mut scope = CallScope::new(&mut call, &mut next);
        scope.override_result(NetworkValue::Bool(false));
        assert_eq!(scope.finish(), NetworkValue::Bool(false));
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_unwound_original_never_reruns() {
        let mut calls = 0;
        let mut next = |_: &mut NativeCall| -> NetworkValue {
            calls += 1;
            panic!("native failure");
        };
        let mut call = NativeCall::new(handle(), vec![]);

        let mut scope = CallScope::new(&mut call, &mut next);
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            scope.invoke();
        }));
        assert!(outcome.is_err());
        assert!(scope.is_started());
        assert!(!scope.is_complete());
        assert_eq!(scope.invoke(), &NetworkValue::Nil);
        assert_eq!(scope.finish(), NetworkValue::Nil);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_intercept_modes() {
        let modes = InterceptModes::BEFORE | InterceptModes::WRAP;
        assert!(modes.contains(InterceptModes::WRAP));
        assert!(!modes.contains(InterceptModes::AFTER));
    }
}
