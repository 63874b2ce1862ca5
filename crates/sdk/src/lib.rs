//! finhook SDK - Game Object Type Definitions
//!
//! This crate contains the plain data types shared between the simulation
//! engine side and the hook core. It has no dependencies and compiles quickly,
//! allowing parallel compilation of dependent crates.
//!
//! # Modules
//!
//! - [`handle`] - Opaque, identity-comparable game object handles
//! - [`value`] - Values carried by signals and native call arguments
//! - [`reflection`] - Class and signal descriptors exposed to scripts
//! - [`signatures`] - Native call sites and per-object delegates the hooks bind to

pub mod handle;
pub mod reflection;
pub mod signatures;
pub mod value;

pub use handle::ObjectHandle;
pub use reflection::{ClassDescriptor, NativeClass, SignalDescriptor, SignalParam};
pub use signatures::{NativeSignature, NATIVE_SIGNATURES};
pub use value::{InventoryItem, NetworkValue, SignalValue, ValueType};
