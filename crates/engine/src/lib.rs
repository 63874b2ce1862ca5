//! finhook Engine - Simulation-Side Services
//!
//! This crate defines what the hook core consumes from the simulation engine:
//! - Intercepting native functions before, after, or around the original body
//! - Subscribing to native per-object delegates
//! - Object liveness, native properties and reflection metadata
//!
//! # Architecture
//!
//! The host acquires these services once and bundles them into
//! [`EngineServices`], which is passed explicitly to the hook registry. The
//! in-process implementations ([`DetourTable`], [`DelegateTable`],
//! [`ObjectTable`]) back simulations that route native calls through a
//! dispatch table, and the test suites.
//!
//! # Thread Safety
//!
//! All services are `Send + Sync`. Native calls arrive on the simulation
//! thread while registration happens on script threads.

pub mod delegate_table;
pub mod delegates;
pub mod detour;
pub mod error;
pub mod interceptor;
pub mod objects;
pub mod services;
pub mod world;

pub use delegate_table::DelegateTable;
pub use delegates::{DelegateCallback, DelegateKey, Delegates};
pub use detour::DetourTable;
pub use error::InterceptError;
pub use interceptor::{
    AfterHook, BeforeHook, CallScope, InterceptModes, Interceptor, NativeCall, NextFn, WrapHook,
};
pub use objects::ObjectTable;
pub use services::EngineServices;
pub use world::{ObjectWorld, Reflection};
