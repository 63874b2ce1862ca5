//! Railroad track and station hooks
//!
//! Both deliver after the native call returns, once per call.

use std::sync::Arc;

use finhook_engine::{InterceptError, NativeCall};
use finhook_sdk::signatures::{
    RAILROAD_STATION_CANCEL_DOCKING, RAILROAD_STATION_FINISH_DOCKING,
    RAILROAD_STATION_START_DOCKING, RAILROAD_TRACK_VEHICLE_ENTERED,
    RAILROAD_TRACK_VEHICLE_EXITED,
};
use finhook_sdk::{NetworkValue, ObjectHandle};

use crate::hooks::{DeliveryPolicy, FunctionHook, HookBody, HookId, HookSpec};
use crate::SignalPayload;

/// A vehicle entered the track
#[derive(Debug, Clone, PartialEq, SignalPayload)]
pub struct VehicleEnter {
    pub vehicle: ObjectHandle,
}

/// A vehicle left the track
#[derive(Debug, Clone, PartialEq, SignalPayload)]
pub struct VehicleExit {
    pub vehicle: ObjectHandle,
}

/// A locomotive started docking, `success` is the native result
#[derive(Debug, Clone, PartialEq, SignalPayload)]
pub struct StartDocking {
    pub success: bool,
    pub locomotive: ObjectHandle,
    pub offset: f64,
}

#[derive(Debug, Clone, PartialEq, SignalPayload)]
pub struct FinishDocking;

#[derive(Debug, Clone, PartialEq, SignalPayload)]
pub struct CancelDocking;

pub static RAILROAD_TRACK: HookSpec = HookSpec {
    id: HookId::new("railroad_track"),
    classes: &["FGBuildableRailroadTrack"],
    policy: DeliveryPolicy::EveryCall,
    body: HookBody::Function {
        signals: &[VehicleEnter::NAME, VehicleExit::NAME],
        install: install_track,
    },
};

pub static RAILROAD_STATION: HookSpec = HookSpec {
    id: HookId::new("railroad_station"),
    classes: &["FGBuildableRailroadStation"],
    policy: DeliveryPolicy::EveryCall,
    body: HookBody::Function {
        signals: &[StartDocking::NAME, FinishDocking::NAME, CancelDocking::NAME],
        install: install_station,
    },
};

fn install_track(hook: &Arc<FunctionHook>) -> Result<(), InterceptError> {
    hook.on_after(RAILROAD_TRACK_VEHICLE_ENTERED, |hook, call, _| {
        if let Some(vehicle) = vehicle_arg(hook, call) {
            hook.send(call.receiver, VehicleEnter { vehicle });
        }
    })?;
    hook.on_after(RAILROAD_TRACK_VEHICLE_EXITED, |hook, call, _| {
        if let Some(vehicle) = vehicle_arg(hook, call) {
            hook.send(call.receiver, VehicleExit { vehicle });
        }
    })
}

fn vehicle_arg(hook: &FunctionHook, call: &NativeCall) -> Option<ObjectHandle> {
    if !hook.is_sender(call.receiver) {
        return None;
    }
    call.arg(0).and_then(NetworkValue::as_object)
}

fn install_station(hook: &Arc<FunctionHook>) -> Result<(), InterceptError> {
    hook.on_after(RAILROAD_STATION_START_DOCKING, start_docking)?;
    hook.on_after(RAILROAD_STATION_FINISH_DOCKING, |hook, call, _| {
        if hook.is_sender(call.receiver) {
            hook.send(call.receiver, FinishDocking);
        }
    })?;
    hook.on_after(RAILROAD_STATION_CANCEL_DOCKING, |hook, call, _| {
        if hook.is_sender(call.receiver) {
            hook.send(call.receiver, CancelDocking);
        }
    })
}

fn start_docking(hook: &FunctionHook, call: &NativeCall, result: &NetworkValue) {
    if !hook.is_sender(call.receiver) {
        return;
    }

    let payload = StartDocking {
        success: result.as_bool().unwrap_or(false),
        locomotive: call
            .arg(0)
            .and_then(NetworkValue::as_object)
            .unwrap_or_default(),
        offset: call.arg(1).and_then(NetworkValue::as_float).unwrap_or(0.0),
    };
    hook.send(call.receiver, payload);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreConfig;
    use crate::hooks::HookRegistry;
    use crate::testing::{drained_names, listener, Harness};
    use finhook_sdk::ClassDescriptor;

    fn registry(harness: &Harness) -> HookRegistry {
        harness.objects.define_class(
            "FGBuildableRailroadTrack",
            ClassDescriptor::new("RailroadTrack")
                .with_signal(VehicleEnter::descriptor())
                .with_signal(VehicleExit::descriptor()),
        );
        harness.objects.define_class(
            "FGBuildableRailroadStation",
            ClassDescriptor::new("RailroadStation")
                .with_signal(StartDocking::descriptor())
                .with_signal(FinishDocking::descriptor())
                .with_signal(CancelDocking::descriptor()),
        );
        HookRegistry::with_specs(
            harness.services.clone(),
            &CoreConfig::default(),
            &[&RAILROAD_TRACK, &RAILROAD_STATION],
        )
    }

    #[test]
    fn test_vehicle_enter_and_exit() {
        let harness = Harness::new();
        let registry = registry(&harness);
        let track = harness.objects.spawn("FGBuildableRailroadTrack", "Track");
        let train = harness.objects.spawn("FGLocomotive", "Loco");
        let (queue, context) = listener();
        registry.register("railroad_track", track, &context).unwrap();

        for signature in [RAILROAD_TRACK_VEHICLE_ENTERED, RAILROAD_TRACK_VEHICLE_EXITED] {
            let mut call = NativeCall::new(track, vec![NetworkValue::Object(train)]);
            harness
                .detours
                .invoke(&signature, &mut call, |_| NetworkValue::Nil);
        }

        let events = queue.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name(), "VehicleEnter");
        assert_eq!(events[0].values, vec![NetworkValue::Object(train)]);
        assert_eq!(events[1].name(), "VehicleExit");
    }

    #[test]
    fn test_other_tracks_are_ignored() {
        let harness = Harness::new();
        let registry = registry(&harness);
        let watched = harness.objects.spawn("FGBuildableRailroadTrack", "A");
        let other = harness.objects.spawn("FGBuildableRailroadTrack", "B");
        let (queue, context) = listener();
        registry.register("railroad_track", watched, &context).unwrap();

        let mut call = NativeCall::new(other, vec![NetworkValue::Object(watched)]);
        harness
            .detours
            .invoke(&RAILROAD_TRACK_VEHICLE_ENTERED, &mut call, |_| NetworkValue::Nil);

        assert!(queue.is_empty());
    }

    #[test]
    fn test_docking_sequence() {
        let harness = Harness::new();
        let registry = registry(&harness);
        let station = harness.objects.spawn("FGBuildableRailroadStation", "Station");
        let loco = harness.objects.spawn("FGLocomotive", "Loco");
        let (queue, context) = listener();
        registry.register("railroad_station", station, &context).unwrap();

        let mut start = NativeCall::new(
            station,
            vec![NetworkValue::Object(loco), NetworkValue::Float(2.5)],
        );
        let result = harness
            .detours
            .invoke(&RAILROAD_STATION_START_DOCKING, &mut start, |_| {
                NetworkValue::Bool(true)
            });
        assert_eq!(result, NetworkValue::Bool(true));

        let first = queue.pop().unwrap();
        assert_eq!(
            first.values,
            vec![
                NetworkValue::Bool(true),
                NetworkValue::Object(loco),
                NetworkValue::Float(2.5)
            ]
        );

        for signature in [RAILROAD_STATION_FINISH_DOCKING, RAILROAD_STATION_CANCEL_DOCKING] {
            harness.detours.invoke(
                &signature,
                &mut NativeCall::new(station, vec![]),
                |_| NetworkValue::Nil,
            );
        }
        assert_eq!(drained_names(&queue), vec!["FinishDocking", "CancelDocking"]);
    }

    #[test]
    fn test_failed_docking_is_reported() {
        let harness = Harness::new();
        let registry = registry(&harness);
        let station = harness.objects.spawn("FGBuildableRailroadStation", "Station");
        let (queue, context) = listener();
        registry.register("railroad_station", station, &context).unwrap();

        let mut start = NativeCall::new(station, vec![NetworkValue::Nil, NetworkValue::Float(0.0)]);
        harness
            .detours
            .invoke(&RAILROAD_STATION_START_DOCKING, &mut start, |_| {
                NetworkValue::Bool(false)
            });

        let event = queue.pop().unwrap();
        assert_eq!(event.values[0], NetworkValue::Bool(false));
        assert_eq!(event.values[1], NetworkValue::Object(ObjectHandle::invalid()));
    }
}
