//! Hook specifications
//!
//! A [`HookSpec`] is a static description of one hook: which native classes
//! it applies to, which signals it may send, and how it attaches to the
//! engine. Specs are plain data with function pointers; per-hook state lives
//! in the registry that owns them.

use std::fmt;
use std::sync::Arc;

use finhook_engine::InterceptError;
use finhook_sdk::{NativeClass, NetworkValue};

use super::function::FunctionHook;

/// Identity of a hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HookId(&'static str);

impl HookId {
    pub const fn new(id: &'static str) -> Self {
        Self(id)
    }

    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl AsRef<str> for HookId {
    fn as_ref(&self) -> &str {
        self.0
    }
}

impl fmt::Display for HookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Hook archetype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    /// Per-object native delegate, one subscription per listener
    StaticReflection,
    /// Intercepted call site with a fixed signal per native function
    SingleFunction,
    /// Intercepted call site that picks the signal and its source at runtime
    MultiFunction,
}

/// When a hook delivers relative to the calls it observes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryPolicy {
    /// Every qualifying call delivers
    EveryCall,
    /// Once per logical transfer, however many call paths it crossed
    OncePerTransfer,
    /// Only when observed state differs before and after the call
    OnStateChange,
}

/// Installs a function hook's interceptors
pub type InstallFn = fn(&Arc<FunctionHook>) -> Result<(), InterceptError>;

/// Converts delegate broadcast arguments into signal values
///
/// `None` means the broadcast is malformed and nothing is sent.
pub type ConvertFn = fn(&[NetworkValue]) -> Option<Vec<NetworkValue>>;

/// One native delegate and the signal it feeds
#[derive(Debug, Clone, Copy)]
pub struct DelegateBinding {
    pub delegate: &'static str,
    pub signal: &'static str,
    pub convert: ConvertFn,
}

/// How a hook attaches to the engine
#[derive(Debug, Clone, Copy)]
pub enum HookBody {
    Function {
        signals: &'static [&'static str],
        install: InstallFn,
    },
    MultiFunction {
        signals: &'static [&'static str],
        install: InstallFn,
    },
    StaticReflection {
        bindings: &'static [DelegateBinding],
    },
}

/// Static description of one hook
#[derive(Debug, Clone, Copy)]
pub struct HookSpec {
    pub id: HookId,
    /// Native classes whose objects this hook can observe
    pub classes: &'static [&'static str],
    pub policy: DeliveryPolicy,
    pub body: HookBody,
}

impl HookSpec {
    pub fn kind(&self) -> HookKind {
        match self.body {
            HookBody::Function { .. } => HookKind::SingleFunction,
            HookBody::MultiFunction { .. } => HookKind::MultiFunction,
            HookBody::StaticReflection { .. } => HookKind::StaticReflection,
        }
    }

    /// Installer for function hooks, `None` for static reflection hooks
    pub fn install_fn(&self) -> Option<InstallFn> {
        match self.body {
            HookBody::Function { install, .. } | HookBody::MultiFunction { install, .. } => {
                Some(install)
            }
            HookBody::StaticReflection { .. } => None,
        }
    }

    /// Names of every signal this hook may send
    pub fn signals(&self) -> Vec<&'static str> {
        match self.body {
            HookBody::Function { signals, .. } | HookBody::MultiFunction { signals, .. } => {
                signals.to_vec()
            }
            HookBody::StaticReflection { bindings } => {
                bindings.iter().map(|b| b.signal).collect()
            }
        }
    }

    pub fn declares_signal(&self, signal: &str) -> bool {
        self.signals().contains(&signal)
    }

    pub fn applies_to(&self, class: &NativeClass) -> bool {
        self.classes.contains(&class.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_install(_: &Arc<FunctionHook>) -> Result<(), InterceptError> {
        Ok(())
    }

    fn passthrough(args: &[NetworkValue]) -> Option<Vec<NetworkValue>> {
        Some(args.to_vec())
    }

    static FUNCTION: HookSpec = HookSpec {
        id: HookId::new("function"),
        classes: &["FGTest"],
        policy: DeliveryPolicy::EveryCall,
        body: HookBody::Function {
            signals: &["A", "B"],
            install: no_install,
        },
    };

    static DELEGATE: HookSpec = HookSpec {
        id: HookId::new("delegate"),
        classes: &["FGTest", "FGOther"],
        policy: DeliveryPolicy::EveryCall,
        body: HookBody::StaticReflection {
            bindings: &[DelegateBinding {
                delegate: "OnC",
                signal: "C",
                convert: passthrough,
            }],
        },
    };

    #[test]
    fn test_kind_and_signals() {
        assert_eq!(FUNCTION.kind(), HookKind::SingleFunction);
        assert!(FUNCTION.install_fn().is_some());
        assert!(FUNCTION.declares_signal("B"));
        assert!(!FUNCTION.declares_signal("C"));

        assert_eq!(DELEGATE.kind(), HookKind::StaticReflection);
        assert!(DELEGATE.install_fn().is_none());
        assert_eq!(DELEGATE.signals(), vec!["C"]);
    }

    #[test]
    fn test_applies_to() {
        assert!(DELEGATE.applies_to(&NativeClass::new("FGOther")));
        assert!(!FUNCTION.applies_to(&NativeClass::new("FGOther")));
    }

    #[test]
    fn test_hook_id_display() {
        assert_eq!(FUNCTION.id.to_string(), "function");
        assert_eq!(FUNCTION.id.as_ref(), "function");
    }
}
