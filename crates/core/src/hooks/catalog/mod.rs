//! The concrete hooks
//!
//! Each submodule declares its typed signal payloads and one or more
//! [`HookSpec`]s. [`ALL`] is what [`HookRegistry::new`] serves.
//!
//! [`HookRegistry::new`]: crate::hooks::HookRegistry::new

pub mod delegates;
pub mod factory;
pub mod pipe_hyper;
pub mod power;
pub mod railroad;

use super::HookSpec;

pub use delegates::{BUILDABLE, RAILROAD_SIGNAL, TRAIN};
pub use factory::FACTORY_CONNECTOR;
pub use pipe_hyper::PIPE_HYPER_START;
pub use power::POWER_CIRCUIT;
pub use railroad::{RAILROAD_STATION, RAILROAD_TRACK};

/// Every hook in the catalog
pub static ALL: &[&HookSpec] = &[
    &RAILROAD_TRACK,
    &RAILROAD_STATION,
    &PIPE_HYPER_START,
    &FACTORY_CONNECTOR,
    &POWER_CIRCUIT,
    &BUILDABLE,
    &TRAIN,
    &RAILROAD_SIGNAL,
];
