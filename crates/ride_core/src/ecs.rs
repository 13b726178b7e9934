use std::fmt;

use bevy_ecs::prelude::{Component, Entity};
use serde::{Deserialize, Serialize};

use crate::clock::EventId;
use crate::error::BackendError;
use crate::lifecycle::DriverAction;
use crate::pricing::{FareEstimate, RateTable, RideType};
use crate::spatial::Location;

/// Opaque ride identifier, e.g. `ride-k3j9x0a2b`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RideId(pub String);

impl fmt::Display for RideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RideId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiderProfile {
    pub name: String,
    pub rating: f32,
    pub image: Option<String>,
}

/// A ride offered to a driver. Lives on its own entity until accepted or rejected.
#[derive(Debug, Clone, PartialEq, Component, Serialize, Deserialize)]
pub struct RideRequest {
    pub id: RideId,
    pub rider: RiderProfile,
    pub pickup: String,
    pub dropoff: String,
    pub distance: String,
    pub fare: u32,
    pub eta_mins: u32,
}

/// Which driver a request entity was offered to, and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub struct RequestOffer {
    pub driver: Entity,
    pub offered_at: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RideStatus {
    Enroute,
    Arrived,
    InProgress,
}

impl RideStatus {
    /// Next status in the strictly linear progression; `None` from `InProgress`.
    pub fn next(self) -> Option<RideStatus> {
        match self {
            RideStatus::Enroute => Some(RideStatus::Arrived),
            RideStatus::Arrived => Some(RideStatus::InProgress),
            RideStatus::InProgress => None,
        }
    }
}

/// An accepted ride. Replaces the [RideRequest] on the same entity.
#[derive(Debug, Clone, PartialEq, Component)]
pub struct OngoingRide {
    pub request: RideRequest,
    pub status: RideStatus,
    pub driver: Entity,
    pub accepted_at: u64,
    /// Set when the ride moves to `InProgress`.
    pub started_at: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Offline,
    Online,
    OnRide,
}

/// A backend call in flight. While present the actor is busy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAction<A> {
    pub action: A,
    pub event: EventId,
    /// Request or ride entity the action applies to.
    pub target: Option<Entity>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionFailure<A> {
    pub action: A,
    pub error: BackendError,
    pub at: u64,
}

#[derive(Debug, Clone, PartialEq, Component)]
pub struct Driver {
    pub name: String,
    pub state: DriverState,
    pub current_ride: Option<Entity>,
    pub pending: Option<PendingAction<DriverAction>>,
    /// Scheduled arrival of the next mock request, if armed.
    pub request_timer: Option<EventId>,
    pub last_failure: Option<ActionFailure<DriverAction>>,
}

impl Driver {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: DriverState::Offline,
            current_ride: None,
            pending: None,
            request_timer: None,
            last_failure: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }
}

/// Today's totals for one driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Component)]
pub struct DriverEarnings {
    pub today_earnings: u64,
    pub completed_rides: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationKind {
    Pickup,
    Dropoff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingAction {
    ResolveLocation(LocationKind),
    BookRide,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingConfirmation {
    pub ride_type: RideType,
    pub estimate: FareEstimate,
    pub booked_at: u64,
    pub message: String,
}

/// Rider-side booking state. `estimate` is always derived from the current
/// pickup, dropoff and ride type and is never set independently.
#[derive(Debug, Clone, PartialEq, Component)]
pub struct Booking {
    pub rider_name: String,
    pub ride_type: RideType,
    pub pickup: Option<Location>,
    pub dropoff: Option<Location>,
    pub estimate: Option<FareEstimate>,
    pub pending: Option<PendingAction<BookingAction>>,
    pub confirmation: Option<BookingConfirmation>,
    pub last_failure: Option<ActionFailure<BookingAction>>,
}

impl Booking {
    pub fn new(rider_name: impl Into<String>) -> Self {
        Self {
            rider_name: rider_name.into(),
            ride_type: RideType::default(),
            pickup: None,
            dropoff: None,
            estimate: None,
            pending: None,
            confirmation: None,
            last_failure: None,
        }
    }

    pub fn location(&self, kind: LocationKind) -> Option<&Location> {
        match kind {
            LocationKind::Pickup => self.pickup.as_ref(),
            LocationKind::Dropoff => self.dropoff.as_ref(),
        }
    }

    pub fn has_both_locations(&self) -> bool {
        self.pickup.is_some() && self.dropoff.is_some()
    }

    /// Replace one endpoint. Any previous quote and confirmation are discarded.
    pub fn set_location(&mut self, kind: LocationKind, location: Location, rates: &RateTable) {
        match kind {
            LocationKind::Pickup => self.pickup = Some(location),
            LocationKind::Dropoff => self.dropoff = Some(location),
        }
        self.refresh_estimate(rates);
    }

    pub fn set_ride_type(&mut self, ride_type: RideType, rates: &RateTable) {
        if self.ride_type != ride_type {
            self.ride_type = ride_type;
            self.refresh_estimate(rates);
        }
    }

    fn refresh_estimate(&mut self, rates: &RateTable) {
        self.confirmation = None;
        self.estimate = match (&self.pickup, &self.dropoff) {
            (Some(pickup), Some(dropoff)) => Some(rates.estimate(pickup, dropoff, self.ride_type)),
            _ => None,
        };
    }
}
