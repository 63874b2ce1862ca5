//! finhook Core - Hook Dispatch and Signal Delivery
//!
//! This crate turns native engine activity into script-visible signals:
//! hooks observe call sites or per-object delegates, decide whether
//! something worth reporting happened, and deliver a [`Signal`] to every
//! listener context registered for the source object.
//!
//! The entry point is [`HookRegistry`], constructed once with the engine
//! services and shared by whoever registers listeners.
//!
//! # Re-exports
//!
//! This crate re-exports the SDK and engine crates for convenience:
//! - [`sdk`] - Object handles, values, reflection descriptors and call sites
//! - [`engine`] - Interception, delegates and object services

// Allow the crate to refer to itself as `finhook_core` for proc macro compatibility
extern crate self as finhook_core;

pub use finhook_engine as engine;
pub use finhook_sdk as sdk;

pub mod config;
pub mod error;
pub mod hooks;
pub mod listeners;
pub mod signal;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, ConfigResult, CoreConfig};
pub use error::{HookError, HookResult};
pub use hooks::{
    DeliveryPolicy, FunctionHook, HookId, HookKind, HookRegistry, HookSpec, InstallState,
    StaticReflectionHook, TransferGuard,
};
pub use listeners::{ListenerContext, ListenerId, ListenerRegistry};
pub use signal::{Signal, SignalCache, SignalEvent, SignalPayload, SignalQueue};

// Derive macro, shares its name with the trait
pub use finhook_macros::SignalPayload;
