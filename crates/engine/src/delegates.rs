//! Per-object native delegates
//!
//! Some engine objects already broadcast state changes through their own
//! multicast delegates. Subscribing to those needs no call-site interception.

use std::sync::Arc;

use slotmap::new_key_type;

use finhook_sdk::{NetworkValue, ObjectHandle};

use crate::error::InterceptError;

new_key_type! {
    /// Handle for one delegate subscription
    pub struct DelegateKey;
}

/// Callback bound to a native delegate, receives the broadcast arguments
pub type DelegateCallback = Arc<dyn Fn(&[NetworkValue]) + Send + Sync>;

/// Ability to subscribe to native per-object delegates
pub trait Delegates: Send + Sync {
    /// Bind `callback` to the delegate named `delegate` on `source`
    fn subscribe(
        &self,
        source: ObjectHandle,
        delegate: &'static str,
        callback: DelegateCallback,
    ) -> Result<DelegateKey, InterceptError>;

    /// Remove a subscription
    ///
    /// Returns `true` if the subscription existed.
    fn unsubscribe(&self, key: DelegateKey) -> bool;
}
