//! Hook system
//!
//! Provides the hook archetypes and the service that drives them:
//! - Function hooks (one intercepted call site, fixed signal per function)
//! - Multi-function hooks (signal and its source chosen at runtime)
//! - Static reflection hooks (bound to an existing per-object delegate)
//!
//! Function hooks share one listener registry per hook and are installed
//! lazily by the [`HookInstaller`] on first registration. Every concrete hook
//! lives in [`catalog`] as a static [`HookSpec`].

pub mod catalog;
mod function;
mod guard;
mod installer;
mod registry;
mod spec;
mod static_reflection;

pub use function::FunctionHook;
pub use guard::{InFlight, TransferGuard};
pub use installer::{HookInstaller, InstallState};
pub use registry::HookRegistry;
pub use spec::{
    ConvertFn, DelegateBinding, DeliveryPolicy, HookBody, HookId, HookKind, HookSpec, InstallFn,
};
pub use static_reflection::StaticReflectionHook;
