//! Hook subsystem errors
//!
//! None of these cross a hook boundary into a native call stack. Hook bodies
//! log them and carry on; only registration entry points return them.

use finhook_engine::InterceptError;
use finhook_sdk::{NativeClass, ObjectHandle};

use crate::hooks::HookId;

/// Error type for hook registration and signal delivery
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    /// The source's class exposes no signal with this name
    #[error("Signal '{signal}' not found on class {class}")]
    MissingSignalDescriptor { class: NativeClass, signal: String },

    /// The source handle is stale or malformed
    #[error("Invalid source object {0}")]
    InvalidSource(ObjectHandle),

    /// The native function could not be intercepted, the hook stays inert
    #[error("Failed to install hook '{hook}': {source}")]
    InstallationFailure {
        hook: HookId,
        #[source]
        source: InterceptError,
    },

    /// Transfer guard exit without a matching enter
    #[error("Transfer guard exit without matching enter on {0}")]
    GuardImbalance(ObjectHandle),

    /// No hook is registered under this id
    #[error("Unknown hook '{0}'")]
    UnknownHook(String),

    /// Values do not match the signal's parameter list
    #[error("Invalid arguments for signal '{signal}': {reason}")]
    SignalArguments { signal: String, reason: String },

    /// Hook policy code panicked, the native call continued unhooked
    #[error("Hook '{0}' panicked: {1}")]
    HookPanicked(HookId, String),
}

/// Result type for hook operations
pub type HookResult<T> = Result<T, HookError>;
