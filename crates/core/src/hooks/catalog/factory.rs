//! Factory connector hook
//!
//! An item leaving a connector is observed on two native functions: the
//! outer grab, which may run the internal inventory grab on the same
//! connector, and the internal grab on its own. Both are wrapped and share
//! the hook's transfer guard, so one logical grab delivers one
//! `ItemTransfer`, from whichever wrapper finishes last, and only if that
//! call succeeded.

use std::sync::Arc;

use finhook_engine::{CallScope, InterceptError};
use finhook_sdk::signatures::{FACTORY_GRAB_OUTPUT, FACTORY_INTERNAL_GRAB_OUTPUT};
use finhook_sdk::{InventoryItem, NetworkValue};

use crate::hooks::{DeliveryPolicy, FunctionHook, HookBody, HookId, HookSpec};
use crate::SignalPayload;

/// An item was grabbed from the connector
#[derive(Debug, Clone, PartialEq, SignalPayload)]
pub struct ItemTransfer {
    pub item: InventoryItem,
}

pub static FACTORY_CONNECTOR: HookSpec = HookSpec {
    id: HookId::new("factory_connector"),
    classes: &["FGFactoryConnectionComponent"],
    policy: DeliveryPolicy::OncePerTransfer,
    body: HookBody::Function {
        signals: &[ItemTransfer::NAME],
        install: install_connector,
    },
};

fn install_connector(hook: &Arc<FunctionHook>) -> Result<(), InterceptError> {
    hook.on_wrap(FACTORY_GRAB_OUTPUT, grab)?;
    hook.on_wrap(FACTORY_INTERNAL_GRAB_OUTPUT, grab)
}

/// Wraps either grab; the grabbed item is written to argument 0
fn grab(hook: &FunctionHook, scope: &mut CallScope<'_>) {
    let connector = scope.receiver();
    if !hook.is_sender(connector) {
        return;
    }
    let Some(guard) = hook.guard() else {
        return;
    };

    let transfer = guard.track(connector);
    let success = scope.invoke().as_bool().unwrap_or(false);
    if !transfer.complete() || !success {
        return;
    }

    if let Some(item) = scope.args().first().and_then(NetworkValue::as_item) {
        hook.send(connector, ItemTransfer { item: item.clone() });
    }
}
