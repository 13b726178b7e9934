use bevy_ecs::prelude::{Commands, Entity, Query, Res, ResMut};
use tracing::{info, warn};

use crate::backend::{BackendCall, BackendResource};
use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::ecs::{Driver, DriverState, OngoingRide, RequestOffer, RideRequest, RideStatus};
use crate::lifecycle::DriverAction;
use crate::systems::{
    disarm_request_timer, driver_subject, record_driver_failure, settle_driver_action,
};
use crate::telemetry::DashboardTelemetry;

/// Promotes the accepted request into the driver's ongoing ride and clears
/// every other offer.
pub fn ride_accepted_system(
    mut clock: ResMut<SimulationClock>,
    event: Res<CurrentEvent>,
    mut backend: ResMut<BackendResource>,
    mut telemetry: ResMut<DashboardTelemetry>,
    mut commands: Commands,
    mut drivers: Query<&mut Driver>,
    requests: Query<(Entity, &RideRequest, &RequestOffer)>,
) {
    if event.0.kind != EventKind::RideAccepted {
        return;
    }
    let Some(driver_entity) = driver_subject(&event.0) else {
        return;
    };
    let Ok(mut driver) = drivers.get_mut(driver_entity) else {
        return;
    };
    let Some(pending) = settle_driver_action(&mut driver, &event.0, DriverAction::AcceptRide)
    else {
        return;
    };
    if driver.state != DriverState::Online || driver.current_ride.is_some() {
        return;
    }
    let Some(request_entity) = pending.target else {
        return;
    };
    let Ok((_, request, offer)) = requests.get(request_entity) else {
        return;
    };
    if offer.driver != driver_entity {
        return;
    }

    if let Err(error) = backend.commit(&BackendCall::AcceptRide(request.id.clone())) {
        warn!(driver = %driver.name, ride = %request.id, %error, "accept failed");
        telemetry.backend_failures += 1;
        record_driver_failure(&mut driver, DriverAction::AcceptRide, error, clock.now());
        return;
    }

    let now = clock.now();
    commands
        .entity(request_entity)
        .remove::<(RideRequest, RequestOffer)>()
        .insert(OngoingRide {
            request: request.clone(),
            status: RideStatus::Enroute,
            driver: driver_entity,
            accepted_at: now,
            started_at: None,
        });
    for (other, _, other_offer) in requests.iter() {
        if other != request_entity && other_offer.driver == driver_entity {
            commands.entity(other).despawn();
        }
    }

    driver.state = DriverState::OnRide;
    driver.current_ride = Some(request_entity);
    disarm_request_timer(&mut clock, &mut driver);
    info!(driver = %driver.name, ride = %request.id, at = now, "ride accepted");
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::prelude::Schedule;

    use crate::feed::RequestFeed;
    use crate::systems::test_world::{driver_world, fire_pending};

    #[test]
    fn accepting_promotes_request_to_enroute_ride() {
        let (mut world, driver_entity) = driver_world();
        world.get_mut::<Driver>(driver_entity).expect("driver").state = DriverState::Online;
        let request = world.resource_mut::<RequestFeed>().next_request();
        let ride_id = request.id.clone();
        let request_entity = world
            .spawn((
                request,
                RequestOffer {
                    driver: driver_entity,
                    offered_at: 0,
                },
            ))
            .id();

        fire_pending(
            &mut world,
            driver_entity,
            DriverAction::AcceptRide,
            EventKind::RideAccepted,
            Some(request_entity),
        );
        let mut schedule = Schedule::default();
        schedule.add_systems(ride_accepted_system);
        schedule.run(&mut world);

        let driver = world.get::<Driver>(driver_entity).expect("driver");
        assert_eq!(driver.state, DriverState::OnRide);
        assert_eq!(driver.current_ride, Some(request_entity));

        let ride = world.get::<OngoingRide>(request_entity).expect("ongoing ride");
        assert_eq!(ride.status, RideStatus::Enroute);
        assert_eq!(ride.request.id, ride_id);
        assert_eq!(ride.accepted_at, 100);
        assert!(world.get::<RideRequest>(request_entity).is_none());
        assert_eq!(world.query::<&RideRequest>().iter(&world).count(), 0);
    }

    #[test]
    fn accepting_a_vanished_request_changes_nothing() {
        let (mut world, driver_entity) = driver_world();
        world.get_mut::<Driver>(driver_entity).expect("driver").state = DriverState::Online;
        let gone = world.spawn_empty().id();
        world.despawn(gone);

        fire_pending(
            &mut world,
            driver_entity,
            DriverAction::AcceptRide,
            EventKind::RideAccepted,
            Some(gone),
        );
        let mut schedule = Schedule::default();
        schedule.add_systems(ride_accepted_system);
        schedule.run(&mut world);

        let driver = world.get::<Driver>(driver_entity).expect("driver");
        assert_eq!(driver.state, DriverState::Online);
        assert!(driver.current_ride.is_none());
        assert!(!driver.is_busy());
    }
}
