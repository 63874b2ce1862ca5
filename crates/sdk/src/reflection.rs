//! Reflection descriptors for script-visible classes and signals
//!
//! Descriptors are produced by the reflection collaborator and treated as
//! immutable for the lifetime of the process.

use std::fmt;
use std::sync::Arc;

use crate::value::{NetworkValue, ValueType};

/// Name of a native engine class (e.g. `FGBuildableRailroadTrack`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeClass(String);

impl NativeClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NativeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NativeClass {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// One named, typed signal parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalParam {
    pub name: String,
    pub ty: ValueType,
}

impl SignalParam {
    pub fn new(name: impl Into<String>, ty: ValueType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A named signal with an ordered parameter list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalDescriptor {
    name: String,
    params: Vec<SignalParam>,
}

impl SignalDescriptor {
    pub fn new(name: impl Into<String>, params: Vec<SignalParam>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[SignalParam] {
        &self.params
    }

    /// Check an ordered value list against the parameter list
    ///
    /// Returns a human readable reason on mismatch.
    pub fn check_values(&self, values: &[NetworkValue]) -> Result<(), String> {
        if values.len() != self.params.len() {
            return Err(format!(
                "expected {} values, got {}",
                self.params.len(),
                values.len()
            ));
        }

        for (param, value) in self.params.iter().zip(values) {
            if !param.ty.accepts(value) {
                return Err(format!(
                    "parameter '{}' expects {}, got {}",
                    param.name,
                    param.ty,
                    value.value_type()
                ));
            }
        }

        Ok(())
    }
}

/// Script-visible description of a native class
#[derive(Debug, Clone)]
pub struct ClassDescriptor {
    internal_name: String,
    signals: Vec<Arc<SignalDescriptor>>,
}

impl ClassDescriptor {
    pub fn new(internal_name: impl Into<String>) -> Self {
        Self {
            internal_name: internal_name.into(),
            signals: Vec::new(),
        }
    }

    /// Builder-style signal registration
    pub fn with_signal(mut self, signal: SignalDescriptor) -> Self {
        self.signals.push(Arc::new(signal));
        self
    }

    pub fn internal_name(&self) -> &str {
        &self.internal_name
    }

    pub fn signals(&self) -> &[Arc<SignalDescriptor>] {
        &self.signals
    }

    /// Find a signal by name
    pub fn find_signal(&self, name: &str) -> Option<Arc<SignalDescriptor>> {
        self.signals.iter().find(|s| s.name() == name).cloned()
    }
}
