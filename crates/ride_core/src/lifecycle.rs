//! Transition rules for the driver ride lifecycle and the rider booking flow.
//!
//! ```text
//! Offline --go_online--> OnlineIdle --request--> RequestPending --accept--> OnRide(Enroute)
//!    ^                      |  ^                      |                         |
//!    +------go_offline------+  +--------reject--------+                    advance (x2)
//!                              ^                                                |
//!                              +--------------complete------------- OnRide(InProgress)
//! ```
//!
//! These functions only decide whether an action is legal; the systems apply it.

use crate::ecs::{Booking, Driver, DriverState, RideStatus};
use crate::error::TransitionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverAction {
    GoOnline,
    GoOffline,
    AcceptRide,
    RejectRide,
    AdvanceStatus,
    CompleteRide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverPhase {
    Offline,
    OnlineIdle,
    RequestPending,
    OnRide(RideStatus),
}

impl DriverPhase {
    /// Derive the phase from the driver component, its pending-request count and
    /// the status of its ongoing ride (if any).
    pub fn of(driver: &Driver, pending_requests: usize, ride_status: Option<RideStatus>) -> Self {
        match (driver.state, ride_status) {
            (DriverState::OnRide, Some(status)) => DriverPhase::OnRide(status),
            (DriverState::Offline, _) => DriverPhase::Offline,
            _ if pending_requests > 0 => DriverPhase::RequestPending,
            _ => DriverPhase::OnlineIdle,
        }
    }

    pub fn is_online(self) -> bool {
        !matches!(self, DriverPhase::Offline)
    }
}

/// Actions that are legal in `phase`, ignoring the busy flag.
pub fn allowed_in(phase: DriverPhase) -> &'static [DriverAction] {
    use DriverAction::*;
    match phase {
        DriverPhase::Offline => &[GoOnline],
        DriverPhase::OnlineIdle => &[GoOffline],
        DriverPhase::RequestPending => &[GoOffline, AcceptRide, RejectRide],
        DriverPhase::OnRide(RideStatus::Enroute) | DriverPhase::OnRide(RideStatus::Arrived) => {
            &[AdvanceStatus]
        }
        DriverPhase::OnRide(RideStatus::InProgress) => &[CompleteRide],
    }
}

/// Actions a surface should enable right now. Nothing is enabled while a call is pending.
pub fn enabled_actions(driver: &Driver, phase: DriverPhase) -> Vec<DriverAction> {
    if driver.is_busy() {
        return Vec::new();
    }
    allowed_in(phase).to_vec()
}

pub fn check_driver_action(
    driver: &Driver,
    phase: DriverPhase,
    action: DriverAction,
) -> Result<(), TransitionError> {
    if let Some(pending) = driver.pending {
        return Err(TransitionError::Busy {
            pending: pending.event,
        });
    }
    if !allowed_in(phase).contains(&action) {
        return Err(TransitionError::NotAllowed { action, phase });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookingPhase {
    Idle,
    LocationsSet,
    Booking,
    Confirmed,
}

impl BookingPhase {
    pub fn of(booking: &Booking) -> Self {
        use crate::ecs::BookingAction;
        match booking.pending {
            Some(pending) if pending.action == BookingAction::BookRide => BookingPhase::Booking,
            _ if booking.confirmation.is_some() => BookingPhase::Confirmed,
            _ if booking.has_both_locations() => BookingPhase::LocationsSet,
            _ => BookingPhase::Idle,
        }
    }
}

pub fn check_book_ride(booking: &Booking) -> Result<(), TransitionError> {
    if let Some(pending) = booking.pending {
        return Err(TransitionError::Busy {
            pending: pending.event,
        });
    }
    if !booking.has_both_locations() {
        return Err(TransitionError::MissingLocations);
    }
    Ok(())
}
