//! Native call sites and delegates the hooks bind to
//!
//! These identify engine functions by class and method name. The argument
//! layout documented on each constant is the order in which the engine passes
//! arguments through a native call (receiver excluded).

use std::fmt;

/// Identifies one interceptable native engine function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeSignature {
    pub class: &'static str,
    pub method: &'static str,
}

impl NativeSignature {
    pub const fn new(class: &'static str, method: &'static str) -> Self {
        Self { class, method }
    }
}

impl fmt::Display for NativeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.class, self.method)
    }
}

/// `(vehicle: Object)`, no result
pub const RAILROAD_TRACK_VEHICLE_ENTERED: NativeSignature =
    NativeSignature::new("FGBuildableRailroadTrack", "OnVehicleEntered");

/// `(vehicle: Object)`, no result
pub const RAILROAD_TRACK_VEHICLE_EXITED: NativeSignature =
    NativeSignature::new("FGBuildableRailroadTrack", "OnVehicleExited");

/// `(locomotive: Object, offset: Float)` -> Bool
pub const RAILROAD_STATION_START_DOCKING: NativeSignature =
    NativeSignature::new("FGBuildableRailroadStation", "StartDocking");

/// `()`, no result
pub const RAILROAD_STATION_FINISH_DOCKING: NativeSignature =
    NativeSignature::new("FGBuildableRailroadStation", "FinishDockingSequence");

/// `()`, no result
pub const RAILROAD_STATION_CANCEL_DOCKING: NativeSignature =
    NativeSignature::new("FGBuildableRailroadStation", "CancelDockingSequence");

/// `(hyper_start: Object)` -> Bool, receiver is the character movement component
pub const CHARACTER_ENTER_PIPE_HYPER: NativeSignature =
    NativeSignature::new("FGCharacterMovementComponent", "EnterPipeHyper");

/// `(ragdoll: Bool)`, no result, receiver is the character movement component
pub const CHARACTER_PIPE_HYPER_FORCE_EXIT: NativeSignature =
    NativeSignature::new("FGCharacterMovementComponent", "PipeHyperForceExit");

/// `(out item: Item, out offset: Float, type_filter: Str)` -> Bool
///
/// May call [`FACTORY_INTERNAL_GRAB_OUTPUT`] on the same receiver.
pub const FACTORY_GRAB_OUTPUT: NativeSignature =
    NativeSignature::new("FGFactoryConnectionComponent", "Factory_GrabOutput");

/// `(out item: Item, type_filter: Str)` -> Bool
pub const FACTORY_INTERNAL_GRAB_OUTPUT: NativeSignature = NativeSignature::new(
    "FGFactoryConnectionComponent",
    "Factory_Internal_GrabOutputInventory",
);

/// `(delta_time: Float)`, no result
pub const POWER_CIRCUIT_TICK: NativeSignature =
    NativeSignature::new("FGPowerCircuit", "TickCircuit");

/// Every native signature a hook in this system may intercept
pub const NATIVE_SIGNATURES: &[NativeSignature] = &[
    RAILROAD_TRACK_VEHICLE_ENTERED,
    RAILROAD_TRACK_VEHICLE_EXITED,
    RAILROAD_STATION_START_DOCKING,
    RAILROAD_STATION_FINISH_DOCKING,
    RAILROAD_STATION_CANCEL_DOCKING,
    CHARACTER_ENTER_PIPE_HYPER,
    CHARACTER_PIPE_HYPER_FORCE_EXIT,
    FACTORY_GRAB_OUTPUT,
    FACTORY_INTERNAL_GRAB_OUTPUT,
    POWER_CIRCUIT_TICK,
];

/// Per-object delegates exposed by the engine
pub mod delegates {
    /// `(status: Int)` on buildables with production
    pub const PRODUCTION_STATUS_CHANGED: &str = "OnProductionStatusChanged";

    /// `(enabled: Bool)` on trains
    pub const SELF_DRIVING_CHANGED: &str = "OnSelfDrivingChanged";

    /// `(aspect: Int)` on railroad signals
    pub const ASPECT_CHANGED: &str = "OnAspectChanged";

    /// `(validation: Int)` on railroad signals
    pub const BLOCK_VALIDATION_CHANGED: &str = "OnBlockValidationChanged";
}

/// Object properties read by hook policies
pub mod properties {
    /// Bool on power circuits
    pub const FUSE_TRIGGERED: &str = "IsFuseTriggered";

    /// Object on character movement components while travelling a hyper tube
    pub const CONNECTION_TO_EJECT_THROUGH: &str = "ConnectionToEjectThrough";

    /// Object on pipe connections
    pub const CONNECTED_COMPONENT: &str = "ConnectedComponent";

    /// Object on components
    pub const OWNER: &str = "Owner";
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_signature_display() {
        assert_eq!(
            POWER_CIRCUIT_TICK.to_string(),
            "FGPowerCircuit::TickCircuit"
        );
    }

    #[test]
    fn test_signatures_unique() {
        let unique: HashSet<_> = NATIVE_SIGNATURES.iter().collect();
        assert_eq!(unique.len(), NATIVE_SIGNATURES.len());
    }
}
