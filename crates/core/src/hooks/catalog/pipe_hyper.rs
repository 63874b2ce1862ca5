//! Pipe hyper start hook
//!
//! Both native calls run on the character's movement component, not on the
//! hyper start that listeners register with. The signal source is found at
//! call time: the hyper start argument on entry, the owner of the connection
//! the character is ejected through on exit.

use std::sync::Arc;

use finhook_engine::{InterceptError, NativeCall};
use finhook_sdk::signatures::properties::{
    CONNECTED_COMPONENT, CONNECTION_TO_EJECT_THROUGH, OWNER,
};
use finhook_sdk::signatures::{CHARACTER_ENTER_PIPE_HYPER, CHARACTER_PIPE_HYPER_FORCE_EXIT};
use finhook_sdk::{NetworkValue, ObjectHandle};

use crate::hooks::{DeliveryPolicy, FunctionHook, HookBody, HookId, HookSpec};
use crate::SignalPayload;

/// A player entered the pipe network through this hyper start
#[derive(Debug, Clone, PartialEq, SignalPayload)]
pub struct PlayerEntered {
    pub entered: bool,
}

/// A player was ejected from the pipe network here
#[derive(Debug, Clone, PartialEq, SignalPayload)]
pub struct PlayerExited;

pub static PIPE_HYPER_START: HookSpec = HookSpec {
    id: HookId::new("pipe_hyper_start"),
    classes: &["FGPipeHyperStart"],
    policy: DeliveryPolicy::EveryCall,
    body: HookBody::MultiFunction {
        signals: &[PlayerEntered::NAME, PlayerExited::NAME],
        install: install_pipe_hyper,
    },
};

fn install_pipe_hyper(hook: &Arc<FunctionHook>) -> Result<(), InterceptError> {
    hook.on_after(CHARACTER_ENTER_PIPE_HYPER, enter_pipe_hyper)?;
    hook.on_before(CHARACTER_PIPE_HYPER_FORCE_EXIT, pipe_hyper_force_exit)
}

/// After entry: signal the hyper start if the character actually got in
fn enter_pipe_hyper(hook: &FunctionHook, call: &NativeCall, result: &NetworkValue) {
    if !result.as_bool().unwrap_or(false) {
        return;
    }

    let Some(start) = call.arg(0).and_then(NetworkValue::as_object) else {
        return;
    };
    if hook.services().world.is_valid(start) && hook.is_sender(start) {
        hook.send(start, PlayerEntered { entered: true });
    }
}

/// Before a forced exit: signal the component the character leaves through
fn pipe_hyper_force_exit(hook: &FunctionHook, call: &NativeCall) {
    if let Some(owner) = ejection_owner(hook, call.receiver) {
        if hook.is_sender(owner) {
            hook.send(owner, PlayerExited);
        }
    }
}

/// movement → ejection connection → connected component → owner
fn ejection_owner(hook: &FunctionHook, movement: ObjectHandle) -> Option<ObjectHandle> {
    let connection = hook.object_property(movement, CONNECTION_TO_EJECT_THROUGH)?;
    let connected = hook.object_property(connection, CONNECTED_COMPONENT)?;
    hook.object_property(connected, OWNER)
}
