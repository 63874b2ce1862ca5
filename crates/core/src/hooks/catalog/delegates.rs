//! Hooks bound to native per-object delegates
//!
//! These need no call site interception: the engine already broadcasts the
//! change on the object, so each registration subscribes its listener
//! directly.

use finhook_sdk::signatures::delegates::{
    ASPECT_CHANGED, BLOCK_VALIDATION_CHANGED, PRODUCTION_STATUS_CHANGED, SELF_DRIVING_CHANGED,
};
use finhook_sdk::NetworkValue;

use crate::hooks::{DelegateBinding, DeliveryPolicy, HookBody, HookId, HookSpec};
use crate::SignalPayload;

/// Production status of a buildable changed
#[derive(Debug, Clone, PartialEq, SignalPayload)]
pub struct ProductionChanged {
    pub status: i64,
}

/// A train's self driving was switched on or off
#[derive(Debug, Clone, PartialEq, SignalPayload)]
#[signal(name = "SelfDrvingUpdate")]
pub struct SelfDrivingUpdate {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, SignalPayload)]
pub struct AspectChanged {
    pub aspect: i64,
}

#[derive(Debug, Clone, PartialEq, SignalPayload)]
pub struct ValidationChanged {
    pub validation: i64,
}

pub static BUILDABLE: HookSpec = HookSpec {
    id: HookId::new("buildable"),
    classes: &["FGBuildableFactory", "FGBuildableManufacturer"],
    policy: DeliveryPolicy::EveryCall,
    body: HookBody::StaticReflection {
        bindings: &[DelegateBinding {
            delegate: PRODUCTION_STATUS_CHANGED,
            signal: ProductionChanged::NAME,
            convert: production_changed,
        }],
    },
};

pub static TRAIN: HookSpec = HookSpec {
    id: HookId::new("train"),
    classes: &["FGTrain"],
    policy: DeliveryPolicy::EveryCall,
    body: HookBody::StaticReflection {
        bindings: &[DelegateBinding {
            delegate: SELF_DRIVING_CHANGED,
            signal: SelfDrivingUpdate::NAME,
            convert: self_driving_update,
        }],
    },
};

pub static RAILROAD_SIGNAL: HookSpec = HookSpec {
    id: HookId::new("railroad_signal"),
    classes: &["FGBuildableRailroadSignal"],
    policy: DeliveryPolicy::EveryCall,
    body: HookBody::StaticReflection {
        bindings: &[
            DelegateBinding {
                delegate: ASPECT_CHANGED,
                signal: AspectChanged::NAME,
                convert: aspect_changed,
            },
            DelegateBinding {
                delegate: BLOCK_VALIDATION_CHANGED,
                signal: ValidationChanged::NAME,
                convert: validation_changed,
            },
        ],
    },
};

fn production_changed(args: &[NetworkValue]) -> Option<Vec<NetworkValue>> {
    let status = args.first()?.as_int()?;
    Some(ProductionChanged { status }.into_values())
}

fn self_driving_update(args: &[NetworkValue]) -> Option<Vec<NetworkValue>> {
    let enabled = args.first()?.as_bool()?;
    Some(SelfDrivingUpdate { enabled }.into_values())
}

fn aspect_changed(args: &[NetworkValue]) -> Option<Vec<NetworkValue>> {
    let aspect = args.first()?.as_int()?;
    Some(AspectChanged { aspect }.into_values())
}

fn validation_changed(args: &[NetworkValue]) -> Option<Vec<NetworkValue>> {
    let validation = args.first()?.as_int()?;
    Some(ValidationChanged { validation }.into_values())
}
