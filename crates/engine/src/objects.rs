//! In-process object table
//!
//! Holds live game objects with their native class, display name and native
//! properties, plus the reflection classes scripts see. Object handles are
//! slot map keys, so a destroyed object's handle stays stale even after its
//! slot is reused.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use slotmap::{new_key_type, Key, KeyData, SlotMap};

use finhook_sdk::{ClassDescriptor, NativeClass, NetworkValue, ObjectHandle};

use crate::world::{ObjectWorld, Reflection};

new_key_type! {
    struct ObjectKey;
}

fn to_handle(key: ObjectKey) -> ObjectHandle {
    ObjectHandle::from_raw(key.data().as_ffi())
}

/// Slot map versions of occupied slots are odd; `from_ffi` would round an
/// even serial up to the next live one.
fn to_key(handle: ObjectHandle) -> Option<ObjectKey> {
    (handle.is_valid() && handle.serial() % 2 == 1)
        .then(|| ObjectKey::from(KeyData::from_ffi(handle.raw())))
}

struct ObjectEntry {
    class: NativeClass,
    name: String,
    properties: HashMap<String, NetworkValue>,
}

/// Object and class storage implementing [`ObjectWorld`] and [`Reflection`]
#[derive(Default)]
pub struct ObjectTable {
    objects: RwLock<SlotMap<ObjectKey, ObjectEntry>>,
    classes: DashMap<NativeClass, Arc<ClassDescriptor>>,
}

impl ObjectTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the reflection class for a native class
    pub fn define_class(&self, native: impl Into<NativeClass>, class: ClassDescriptor) {
        self.classes.insert(native.into(), Arc::new(class));
    }

    /// Create a live object
    pub fn spawn(&self, class: impl Into<NativeClass>, name: impl Into<String>) -> ObjectHandle {
        let entry = ObjectEntry {
            class: class.into(),
            name: name.into(),
            properties: HashMap::new(),
        };
        let handle = to_handle(self.objects.write().insert(entry));
        tracing::trace!("Spawned object {}", handle);
        handle
    }

    /// Destroy an object, making every handle to it stale
    pub fn destroy(&self, handle: ObjectHandle) -> bool {
        let removed = to_key(handle)
            .map(|key| self.objects.write().remove(key).is_some())
            .unwrap_or(false);
        if removed {
            tracing::trace!("Destroyed object {}", handle);
        }
        removed
    }

    /// Set a native property on a live object
    ///
    /// Returns `false` for stale handles.
    pub fn set_property(
        &self,
        handle: ObjectHandle,
        name: impl Into<String>,
        value: impl Into<NetworkValue>,
    ) -> bool {
        let Some(key) = to_key(handle) else {
            return false;
        };
        match self.objects.write().get_mut(key) {
            Some(entry) => {
                entry.properties.insert(name.into(), value.into());
                true
            }
            None => false,
        }
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    fn with_entry<T>(&self, handle: ObjectHandle, f: impl FnOnce(&ObjectEntry) -> T) -> Option<T> {
        let key = to_key(handle)?;
        self.objects.read().get(key).map(f)
    }
}

impl ObjectWorld for ObjectTable {
    fn is_valid(&self, handle: ObjectHandle) -> bool {
        self.with_entry(handle, |_| ()).is_some()
    }

    fn class_of(&self, handle: ObjectHandle) -> Option<NativeClass> {
        self.with_entry(handle, |e| e.class.clone())
    }

    fn name_of(&self, handle: ObjectHandle) -> Option<String> {
        self.with_entry(handle, |e| e.name.clone())
    }

    fn property(&self, handle: ObjectHandle, name: &str) -> Option<NetworkValue> {
        self.with_entry(handle, |e| e.properties.get(name).cloned())
            .flatten()
    }
}

impl Reflection for ObjectTable {
    fn find_class(&self, native: &NativeClass) -> Option<Arc<ClassDescriptor>> {
        self.classes.get(native).map(|c| c.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finhook_sdk::SignalDescriptor;

    #[test]
    fn test_spawn_and_destroy() {
        let table = ObjectTable::new();
        let track = table.spawn("FGBuildableRailroadTrack", "Track_1");

        assert!(table.is_valid(track));
        assert_eq!(table.name_of(track).as_deref(), Some("Track_1"));
        assert_eq!(
            table.class_of(track),
            Some(NativeClass::new("FGBuildableRailroadTrack"))
        );

        assert!(table.destroy(track));
        assert!(!table.is_valid(track));
        assert!(!table.destroy(track));
        assert!(table.is_empty());
    }

    #[test]
    fn test_stale_handle_after_slot_reuse() {
        let table = ObjectTable::new();
        let first = table.spawn("A", "first");
        table.destroy(first);
        let second = table.spawn("A", "second");

        assert_ne!(first, second);
        assert!(!table.is_valid(first));
        assert!(table.is_valid(second));
        assert_eq!(table.name_of(first), None);
    }

    #[test]
    fn test_invalid_handle_is_tolerated() {
        let table = ObjectTable::new();
        let invalid = ObjectHandle::invalid();

        assert!(!table.is_valid(invalid));
        assert_eq!(table.property(invalid, "x"), None);
        assert!(!table.set_property(invalid, "x", 1i64));
    }

    #[test]
    fn test_unissued_serial_does_not_resolve() {
        let table = ObjectTable::new();
        let first = table.spawn("A", "first");
        table.destroy(first);
        let live = table.spawn("A", "second");
        assert_eq!(live.index(), first.index());
        assert_eq!(live.serial() % 2, 1);

        let forged = ObjectHandle::from_parts(live.index(), live.serial() - 1);
        assert!(!table.is_valid(forged));
        assert_eq!(table.name_of(forged), None);
        assert!(!table.set_property(forged, "x", 1i64));
        assert!(!table.destroy(forged));
        assert!(table.is_valid(live));
    }

    #[test]
    fn test_properties() {
        let table = ObjectTable::new();
        let circuit = table.spawn("FGPowerCircuit", "Circuit");

        assert_eq!(table.property(circuit, "IsFuseTriggered"), None);
        assert!(table.set_property(circuit, "IsFuseTriggered", true));
        assert_eq!(
            table.property(circuit, "IsFuseTriggered"),
            Some(NetworkValue::Bool(true))
        );
    }

    #[test]
    fn test_reflection_lookup() {
        let table = ObjectTable::new();
        table.define_class(
            "FGPowerCircuit",
            ClassDescriptor::new("PowerCircuit")
                .with_signal(SignalDescriptor::new("PowerFuseChanged", vec![])),
        );

        let class = table.find_class(&NativeClass::new("FGPowerCircuit")).unwrap();
        assert_eq!(class.internal_name(), "PowerCircuit");
        assert!(class.find_signal("PowerFuseChanged").is_some());
        assert!(table.find_class(&NativeClass::new("Unknown")).is_none());
    }
}
