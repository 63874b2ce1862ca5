//! Error types for engine-side interception and delegate subscription

use finhook_sdk::ObjectHandle;

/// Error type for interceptor and delegate operations
#[derive(Debug, thiserror::Error)]
pub enum InterceptError {
    /// The native function could not be resolved in the running engine
    #[error("Native symbol not found: {0}")]
    SymbolNotFound(String),

    /// The native function was found but could not be patched
    #[error("Failed to patch {symbol}: {reason}")]
    PatchFailed { symbol: String, reason: String },

    /// The object handle is malformed or no longer alive
    #[error("Invalid object: {0}")]
    InvalidObject(ObjectHandle),

    /// The object does not expose the requested delegate
    #[error("Delegate '{delegate}' not found on {object}")]
    DelegateNotFound {
        delegate: String,
        object: ObjectHandle,
    },
}
