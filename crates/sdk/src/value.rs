//! Values carried by signals and native call arguments

use std::fmt;

use crate::handle::ObjectHandle;

/// An item stack moved between inventories and conveyors
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct InventoryItem {
    /// Item descriptor class name, empty for "no item"
    pub descriptor: String,
    /// Number of items in the stack
    pub count: u32,
}

impl InventoryItem {
    pub fn new(descriptor: impl Into<String>, count: u32) -> Self {
        Self {
            descriptor: descriptor.into(),
            count,
        }
    }

    /// Check whether this is the empty item
    pub fn is_empty(&self) -> bool {
        self.descriptor.is_empty() || self.count == 0
    }
}

/// Type tag for a signal parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Nil,
    Bool,
    Int,
    Float,
    Str,
    Object,
    Item,
    /// Accepts any value
    Any,
}

impl ValueType {
    /// Check whether a value is acceptable for a parameter of this type
    pub fn accepts(&self, value: &NetworkValue) -> bool {
        *self == ValueType::Any || *self == value.value_type()
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Nil => "nil",
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Str => "string",
            ValueType::Object => "object",
            ValueType::Item => "item",
            ValueType::Any => "any",
        };
        f.write_str(name)
    }
}

/// A dynamically typed value as seen by scripts
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NetworkValue {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Object(ObjectHandle),
    Item(InventoryItem),
}

impl NetworkValue {
    /// Get the type tag of this value
    pub fn value_type(&self) -> ValueType {
        match self {
            NetworkValue::Nil => ValueType::Nil,
            NetworkValue::Bool(_) => ValueType::Bool,
            NetworkValue::Int(_) => ValueType::Int,
            NetworkValue::Float(_) => ValueType::Float,
            NetworkValue::Str(_) => ValueType::Str,
            NetworkValue::Object(_) => ValueType::Object,
            NetworkValue::Item(_) => ValueType::Item,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            NetworkValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            NetworkValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get a float, widening integers
    pub fn as_float(&self) -> Option<f64> {
        match self {
            NetworkValue::Float(f) => Some(*f),
            NetworkValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            NetworkValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<ObjectHandle> {
        match self {
            NetworkValue::Object(h) => Some(*h),
            _ => None,
        }
    }

    pub fn as_item(&self) -> Option<&InventoryItem> {
        match self {
            NetworkValue::Item(item) => Some(item),
            _ => None,
        }
    }

    /// Truthiness used for native call results (`Nil` and `false` are falsy)
    pub fn is_truthy(&self) -> bool {
        !matches!(self, NetworkValue::Nil | NetworkValue::Bool(false))
    }
}

impl fmt::Display for NetworkValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkValue::Nil => f.write_str("nil"),
            NetworkValue::Bool(b) => write!(f, "{}", b),
            NetworkValue::Int(i) => write!(f, "{}", i),
            NetworkValue::Float(v) => write!(f, "{}", v),
            NetworkValue::Str(s) => write!(f, "{:?}", s),
            NetworkValue::Object(h) => write!(f, "object({})", h),
            NetworkValue::Item(item) => write!(f, "item({} x{})", item.descriptor, item.count),
        }
    }
}

/// Rust types that map onto a single signal parameter
pub trait SignalValue: Into<NetworkValue> {
    /// Parameter type advertised in signal descriptors
    const TYPE: ValueType;
}

macro_rules! signal_value {
    ($($ty:ty => $variant:ident, $tag:ident $(as $cast:ty)?;)*) => {
        $(
            impl From<$ty> for NetworkValue {
                fn from(value: $ty) -> Self {
                    NetworkValue::$variant(value $(as $cast)?)
                }
            }

            impl SignalValue for $ty {
                const TYPE: ValueType = ValueType::$tag;
            }
        )*
    };
}

signal_value! {
    bool => Bool, Bool;
    i64 => Int, Int;
    i32 => Int, Int as i64;
    u32 => Int, Int as i64;
    f64 => Float, Float;
    f32 => Float, Float as f64;
    String => Str, Str;
    ObjectHandle => Object, Object;
    InventoryItem => Item, Item;
}

impl From<&str> for NetworkValue {
    fn from(value: &str) -> Self {
        NetworkValue::Str(value.to_string())
    }
}

impl From<()> for NetworkValue {
    fn from(_: ()) -> Self {
        NetworkValue::Nil
    }
}
