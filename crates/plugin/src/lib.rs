//! finhook Plugin - Host Layer
//!
//! This crate is what a simulation links to bring the hook system up. It
//! installs the tracing subscriber, loads the core configuration and builds
//! the shared [`HookRegistry`] from the engine services the host acquired.

mod host;

pub use finhook_core::{CoreConfig, HookRegistry};
pub use host::{init_tracing, load, load_with_config, Plugin, PluginError};

pub const NAME: &str = "finhook";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
