pub mod location_resolved;
pub mod request_inbound;
pub mod ride_accepted;
pub mod ride_booked;
pub mod ride_completed;
pub mod ride_status;
pub mod went_offline;
pub mod went_online;

use bevy_ecs::prelude::Entity;
use tracing::debug;

use crate::clock::{Event, EventKind, EventSubject, SimulationClock};
use crate::config::LatencyConfig;
use crate::ecs::{ActionFailure, Driver, DriverState, PendingAction};
use crate::error::BackendError;
use crate::lifecycle::DriverAction;

/// Take the driver's pending action if `event` is the one it is waiting on.
/// Stale or foreign events leave the driver untouched.
pub(crate) fn settle_driver_action(
    driver: &mut Driver,
    event: &Event,
    expected: DriverAction,
) -> Option<PendingAction<DriverAction>> {
    match driver.pending {
        Some(pending) if pending.event == event.id && pending.action == expected => {
            driver.pending = None;
            Some(pending)
        }
        _ => None,
    }
}

pub(crate) fn driver_subject(event: &Event) -> Option<Entity> {
    match event.subject {
        Some(EventSubject::Driver(entity)) => Some(entity),
        _ => None,
    }
}

pub(crate) fn record_driver_failure(
    driver: &mut Driver,
    action: DriverAction,
    error: BackendError,
    now: u64,
) {
    driver.last_failure = Some(ActionFailure {
        action,
        error,
        at: now,
    });
}

/// Arm the mock request timer if the driver is idle and nothing is armed yet.
pub(crate) fn arm_request_timer(
    clock: &mut SimulationClock,
    latency: &LatencyConfig,
    driver_entity: Entity,
    driver: &mut Driver,
    pending_requests: usize,
) {
    if driver.state != DriverState::Online
        || driver.current_ride.is_some()
        || pending_requests > 0
        || driver.request_timer.is_some()
    {
        return;
    }
    let id = clock.schedule_in(
        latency.request_arrival_ms,
        EventKind::RideRequestInbound,
        Some(EventSubject::Driver(driver_entity)),
    );
    debug!(driver = ?driver_entity, event = ?id, "request timer armed");
    driver.request_timer = Some(id);
}

pub(crate) fn disarm_request_timer(clock: &mut SimulationClock, driver: &mut Driver) {
    if let Some(id) = driver.request_timer.take() {
        clock.cancel(id);
        debug!(event = ?id, "request timer cancelled");
    }
}
