use bevy_ecs::prelude::{Query, Res, ResMut};
use tracing::{info, warn};

use crate::backend::{BackendCall, BackendResource};
use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::ecs::{Driver, OngoingRide, RideStatus};
use crate::lifecycle::DriverAction;
use crate::systems::{driver_subject, record_driver_failure, settle_driver_action};
use crate::telemetry::DashboardTelemetry;

/// Moves the ongoing ride one step forward: enroute -> arrived -> in_progress.
pub fn ride_status_system(
    clock: Res<SimulationClock>,
    event: Res<CurrentEvent>,
    mut backend: ResMut<BackendResource>,
    mut telemetry: ResMut<DashboardTelemetry>,
    mut drivers: Query<&mut Driver>,
    mut rides: Query<&mut OngoingRide>,
) {
    if event.0.kind != EventKind::RideStatusAdvanced {
        return;
    }
    let Some(driver_entity) = driver_subject(&event.0) else {
        return;
    };
    let Ok(mut driver) = drivers.get_mut(driver_entity) else {
        return;
    };
    let Some(pending) = settle_driver_action(&mut driver, &event.0, DriverAction::AdvanceStatus)
    else {
        return;
    };
    let Some(ride_entity) = pending.target.filter(|target| driver.current_ride == Some(*target))
    else {
        return;
    };
    let Ok(mut ride) = rides.get_mut(ride_entity) else {
        return;
    };
    let Some(next) = ride.status.next() else {
        return;
    };

    let call = BackendCall::UpdateStatus {
        ride: ride.request.id.clone(),
        status: next,
    };
    if let Err(error) = backend.commit(&call) {
        warn!(driver = %driver.name, ride = %ride.request.id, %error, "status update failed");
        telemetry.backend_failures += 1;
        record_driver_failure(&mut driver, DriverAction::AdvanceStatus, error, clock.now());
        return;
    }

    ride.status = next;
    if next == RideStatus::InProgress {
        ride.started_at = Some(clock.now());
    }
    info!(driver = %driver.name, ride = %ride.request.id, status = ?next, "ride status advanced");
}
