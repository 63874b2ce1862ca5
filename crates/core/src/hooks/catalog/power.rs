//! Power circuit hook
//!
//! Wraps the circuit tick and compares the fuse state before and after it.
//! The tick runs many times per second; only transitions are signalled.

use std::sync::Arc;

use finhook_engine::{CallScope, InterceptError};
use finhook_sdk::signatures::properties::FUSE_TRIGGERED;
use finhook_sdk::signatures::POWER_CIRCUIT_TICK;
use finhook_sdk::ObjectHandle;

use crate::hooks::{DeliveryPolicy, FunctionHook, HookBody, HookId, HookSpec};
use crate::SignalPayload;

/// The circuit's fuse tripped or was reset
#[derive(Debug, Clone, PartialEq, SignalPayload)]
pub struct PowerFuseChanged;

pub static POWER_CIRCUIT: HookSpec = HookSpec {
    id: HookId::new("power_circuit"),
    classes: &["FGPowerCircuit"],
    policy: DeliveryPolicy::OnStateChange,
    body: HookBody::Function {
        signals: &[PowerFuseChanged::NAME],
        install: install_circuit,
    },
};

fn install_circuit(hook: &Arc<FunctionHook>) -> Result<(), InterceptError> {
    hook.on_wrap(POWER_CIRCUIT_TICK, tick_circuit)
}

fn tick_circuit(hook: &FunctionHook, scope: &mut CallScope<'_>) {
    let circuit = scope.receiver();
    if !hook.is_sender(circuit) {
        return;
    }

    let was_triggered = fuse_triggered(hook, circuit);
    scope.invoke();
    if fuse_triggered(hook, circuit) != was_triggered {
        hook.send(circuit, PowerFuseChanged);
    }
}

fn fuse_triggered(hook: &FunctionHook, circuit: ObjectHandle) -> bool {
    hook.property(circuit, FUSE_TRIGGERED)
        .and_then(|value| value.as_bool())
        .unwrap_or(false)
}
