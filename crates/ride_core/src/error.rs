use thiserror::Error;

use crate::clock::EventId;
use crate::ecs::RideId;
use crate::lifecycle::{DriverAction, DriverPhase};

/// Failures that surface to callers constructing or configuring a surface.
#[derive(Debug, Error)]
pub enum RideError {
    #[error("invalid coordinates ({lat}, {lng})")]
    InvalidCoordinates { lat: f64, lng: f64 },
    #[error("no authenticated session")]
    Unauthenticated,
    #[error("session for '{display_name}' is not a driver session")]
    NotADriver { display_name: String },
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("invalid {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

/// Failure reported by a [crate::backend::RideBackend] when a pending call resolves.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Why an action was refused. The state is never changed when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("{action:?} is not allowed while {phase:?}")]
    NotAllowed {
        action: DriverAction,
        phase: DriverPhase,
    },
    #[error("another action is still pending ({pending:?})")]
    Busy { pending: EventId },
    #[error("no pending ride request with id {0}")]
    UnknownRequest(RideId),
    #[error("pickup and dropoff must both be set")]
    MissingLocations,
    #[error("surface is closed")]
    Closed,
}
