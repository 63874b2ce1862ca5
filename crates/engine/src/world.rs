//! Object liveness, property access and reflection lookup

use std::sync::Arc;

use finhook_sdk::{ClassDescriptor, NativeClass, NetworkValue, ObjectHandle};

/// Read access to live game objects
///
/// Every method must tolerate stale or malformed handles and answer with
/// `false` / `None` for them.
pub trait ObjectWorld: Send + Sync {
    /// Check whether the handle refers to a live object
    fn is_valid(&self, handle: ObjectHandle) -> bool;

    /// Native class of a live object
    fn class_of(&self, handle: ObjectHandle) -> Option<NativeClass>;

    /// Display name of a live object
    fn name_of(&self, handle: ObjectHandle) -> Option<String>;

    /// Current value of a native property
    fn property(&self, handle: ObjectHandle, name: &str) -> Option<NetworkValue>;
}

/// Reflection metadata lookup
pub trait Reflection: Send + Sync {
    /// Find the script-visible class for a native class
    fn find_class(&self, native: &NativeClass) -> Option<Arc<ClassDescriptor>>;
}
