//! Object handle type for safe game object references
//!
//! Game objects are referenced through an opaque 64-bit handle combining a slot
//! index with a serial number. The serial number changes when an object is
//! destroyed and a new one takes its slot, so a stale handle never resolves to
//! the replacement object.
//!
//! # Handle Format
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          u64 raw value                           │
//! ├────────────────────────────────┬────────────────────────────────┤
//! │     Serial Number (32 bits)    │       Slot Index (32 bits)     │
//! │          bits 32-63            │           bits 0-31            │
//! └────────────────────────────────┴────────────────────────────────┘
//! ```
//!
//! - Invalid handle: `u64::MAX` (all bits set)
//!
//! Whether a well-formed handle still refers to a live object is answered by
//! the engine, not by the handle itself.

use std::fmt;

/// Invalid handle sentinel value
pub const INVALID_HANDLE: u64 = u64::MAX;

const INDEX_MASK: u64 = 0xFFFF_FFFF;

/// A handle to a native game object
///
/// Handles are `Copy`, hashable and compared by raw value. They never keep the
/// object alive.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ObjectHandle {
    value: u64,
}

impl ObjectHandle {
    /// Create a handle from a raw value
    #[inline]
    pub const fn from_raw(value: u64) -> Self {
        Self { value }
    }

    /// Create a handle from a slot index and serial number
    #[inline]
    pub const fn from_parts(index: u32, serial: u32) -> Self {
        Self::from_raw(((serial as u64) << 32) | index as u64)
    }

    /// Create an invalid handle
    #[inline]
    pub const fn invalid() -> Self {
        Self::from_raw(INVALID_HANDLE)
    }

    /// Get the raw handle value
    #[inline]
    pub const fn raw(&self) -> u64 {
        self.value
    }

    /// Get the slot index (lower 32 bits)
    #[inline]
    pub const fn index(&self) -> u32 {
        (self.value & INDEX_MASK) as u32
    }

    /// Get the serial number (upper 32 bits)
    #[inline]
    pub const fn serial(&self) -> u32 {
        (self.value >> 32) as u32
    }

    /// Check if this handle is well-formed (not the invalid sentinel)
    ///
    /// Note: A well-formed handle may still be stale if the object was destroyed.
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.value != INVALID_HANDLE
    }
}

impl Default for ObjectHandle {
    fn default() -> Self {
        Self::invalid()
    }
}

impl fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(
                f,
                "ObjectHandle(index={}, serial={})",
                self.index(),
                self.serial()
            )
        } else {
            write!(f, "ObjectHandle(invalid)")
        }
    }
}

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}:{}", self.index(), self.serial())
        } else {
            write!(f, "invalid")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_parts() {
        let handle = ObjectHandle::from_parts(7, 3);
        assert_eq!(handle.index(), 7);
        assert_eq!(handle.serial(), 3);
        assert_eq!(handle.raw(), (3u64 << 32) | 7);
    }

    #[test]
    fn test_handle_validity() {
        assert!(ObjectHandle::from_parts(0, 1).is_valid());
        assert!(!ObjectHandle::invalid().is_valid());
        assert!(!ObjectHandle::default().is_valid());
    }

    #[test]
    fn test_handle_identity() {
        let a = ObjectHandle::from_parts(1, 1);
        let b = ObjectHandle::from_parts(1, 2);
        assert_ne!(a, b);
        assert_eq!(a, ObjectHandle::from_raw(a.raw()));
    }

    #[test]
    fn test_handle_display() {
        assert_eq!(ObjectHandle::from_parts(1, 3).to_string(), "1:3");
        assert_eq!(ObjectHandle::invalid().to_string(), "invalid");

        let debug = format!("{:?}", ObjectHandle::from_parts(1, 3));
        assert!(debug.contains("index=1"));
        assert!(debug.contains("serial=3"));
    }
}
