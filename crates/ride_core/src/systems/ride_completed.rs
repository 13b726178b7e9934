use bevy_ecs::prelude::{Commands, Query, Res, ResMut};
use tracing::{info, warn};

use crate::backend::{BackendCall, BackendResource};
use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::config::LatencyConfig;
use crate::ecs::{Driver, DriverEarnings, DriverState, OngoingRide, RideStatus};
use crate::lifecycle::DriverAction;
use crate::systems::{
    arm_request_timer, driver_subject, record_driver_failure, settle_driver_action,
};
use crate::telemetry::{CompletedRideRecord, DashboardTelemetry};

/// Completes an in-progress ride: books the fare, despawns the ride and puts the
/// driver back to idle.
pub fn ride_completed_system(
    mut clock: ResMut<SimulationClock>,
    event: Res<CurrentEvent>,
    latency: Res<LatencyConfig>,
    mut backend: ResMut<BackendResource>,
    mut telemetry: ResMut<DashboardTelemetry>,
    mut commands: Commands,
    mut drivers: Query<(&mut Driver, &mut DriverEarnings)>,
    rides: Query<&OngoingRide>,
) {
    if event.0.kind != EventKind::RideCompleted {
        return;
    }
    let Some(driver_entity) = driver_subject(&event.0) else {
        return;
    };
    let Ok((mut driver, mut earnings)) = drivers.get_mut(driver_entity) else {
        return;
    };
    let Some(pending) = settle_driver_action(&mut driver, &event.0, DriverAction::CompleteRide)
    else {
        return;
    };
    let Some(ride_entity) = pending.target.filter(|target| driver.current_ride == Some(*target))
    else {
        return;
    };
    let Ok(ride) = rides.get(ride_entity) else {
        return;
    };
    if ride.status != RideStatus::InProgress {
        return;
    }

    if let Err(error) = backend.commit(&BackendCall::CompleteRide(ride.request.id.clone())) {
        warn!(driver = %driver.name, ride = %ride.request.id, %error, "complete failed");
        telemetry.backend_failures += 1;
        record_driver_failure(&mut driver, DriverAction::CompleteRide, error, clock.now());
        return;
    }

    let now = clock.now();
    earnings.today_earnings += u64::from(ride.request.fare);
    earnings.completed_rides += 1;
    telemetry.completed_rides.push(CompletedRideRecord {
        ride_id: ride.request.id.clone(),
        driver: driver_entity,
        fare: ride.request.fare,
        accepted_at: ride.accepted_at,
        started_at: ride.started_at.unwrap_or(ride.accepted_at),
        completed_at: now,
    });
    commands.entity(ride_entity).despawn();

    driver.state = DriverState::Online;
    driver.current_ride = None;
    info!(
        driver = %driver.name,
        ride = %ride.request.id,
        fare = ride.request.fare,
        today_earnings = earnings.today_earnings,
        completed_rides = earnings.completed_rides,
        "ride completed"
    );
    arm_request_timer(&mut clock, &latency, driver_entity, &mut driver, 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::prelude::{Entity, Schedule, World};

    use crate::feed::RequestFeed;
    use crate::systems::test_world::{driver_world, fire_pending};

    fn on_ride(world: &mut World, driver_entity: Entity, status: RideStatus) -> Entity {
        let request = world.resource_mut::<RequestFeed>().next_request();
        let ride = world
            .spawn(OngoingRide {
                request,
                status,
                driver: driver_entity,
                accepted_at: 0,
                started_at: Some(0),
            })
            .id();
        let mut driver = world.get_mut::<Driver>(driver_entity).expect("driver");
        driver.state = DriverState::OnRide;
        driver.current_ride = Some(ride);
        ride
    }

    fn complete(world: &mut World, driver_entity: Entity, ride: Entity) {
        fire_pending(
            world,
            driver_entity,
            DriverAction::CompleteRide,
            EventKind::RideCompleted,
            Some(ride),
        );
        let mut schedule = Schedule::default();
        schedule.add_systems(ride_completed_system);
        schedule.run(world);
    }

    #[test]
    fn completion_books_fare_once_and_clears_ride() {
        let (mut world, driver_entity) = driver_world();
        let ride = on_ride(&mut world, driver_entity, RideStatus::InProgress);

        complete(&mut world, driver_entity, ride);

        let earnings = *world.get::<DriverEarnings>(driver_entity).expect("earnings");
        assert_eq!(earnings.today_earnings, 210);
        assert_eq!(earnings.completed_rides, 1);
        assert!(world.get_entity(ride).is_none(), "ride entity despawned");

        let driver = world.get::<Driver>(driver_entity).expect("driver");
        assert_eq!(driver.state, DriverState::Online);
        assert!(driver.current_ride.is_none());
        assert!(driver.request_timer.is_some(), "idle driver waits for the next request");

        let telemetry = world.resource::<DashboardTelemetry>();
        assert_eq!(telemetry.completed_rides.len(), 1);
        assert_eq!(telemetry.completed_rides[0].ride_duration(), 100);
    }

    #[test]
    fn arrived_ride_cannot_complete() {
        let (mut world, driver_entity) = driver_world();
        let ride = on_ride(&mut world, driver_entity, RideStatus::Arrived);

        complete(&mut world, driver_entity, ride);

        let earnings = *world.get::<DriverEarnings>(driver_entity).expect("earnings");
        assert_eq!(earnings, DriverEarnings::default());
        assert!(world.get::<OngoingRide>(ride).is_some());
        assert_eq!(
            world.get::<Driver>(driver_entity).expect("driver").state,
            DriverState::OnRide
        );
    }
}
