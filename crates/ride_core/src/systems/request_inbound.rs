use bevy_ecs::prelude::{Commands, Query, Res, ResMut};
use tracing::info;

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::ecs::{Driver, DriverState, RequestOffer};
use crate::feed::RequestFeed;
use crate::systems::driver_subject;
use crate::telemetry::DashboardTelemetry;

/// Offers one mock request to an idle online driver. At most one request is
/// ever pending per driver.
pub fn request_inbound_system(
    clock: Res<SimulationClock>,
    event: Res<CurrentEvent>,
    mut feed: ResMut<RequestFeed>,
    mut telemetry: ResMut<DashboardTelemetry>,
    mut commands: Commands,
    mut drivers: Query<&mut Driver>,
    offers: Query<&RequestOffer>,
) {
    if event.0.kind != EventKind::RideRequestInbound {
        return;
    }
    let Some(driver_entity) = driver_subject(&event.0) else {
        return;
    };
    let Ok(mut driver) = drivers.get_mut(driver_entity) else {
        return;
    };
    if driver.request_timer != Some(event.0.id) {
        return;
    }
    driver.request_timer = None;

    let already_offered = offers.iter().any(|offer| offer.driver == driver_entity);
    if driver.state != DriverState::Online || driver.current_ride.is_some() || already_offered {
        return;
    }

    let request = feed.next_request();
    info!(
        driver = %driver.name,
        ride = %request.id,
        fare = request.fare,
        "ride request inbound"
    );
    commands.spawn((
        request,
        RequestOffer {
            driver: driver_entity,
            offered_at: clock.now(),
        },
    ));
    telemetry.requests_offered += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::prelude::Schedule;

    use crate::clock::EventSubject;
    use crate::ecs::RideRequest;
    use crate::systems::test_world::driver_world;

    fn arm_and_fire(world: &mut bevy_ecs::prelude::World, driver_entity: bevy_ecs::prelude::Entity) {
        let id = world.resource_mut::<SimulationClock>().schedule_in(
            5000,
            EventKind::RideRequestInbound,
            Some(EventSubject::Driver(driver_entity)),
        );
        world.get_mut::<Driver>(driver_entity).expect("driver").request_timer = Some(id);
        let event = world
            .resource_mut::<SimulationClock>()
            .pop_next()
            .expect("event");
        world.insert_resource(CurrentEvent(event));
    }

    #[test]
    fn idle_online_driver_receives_exactly_one_request() {
        let (mut world, driver_entity) = driver_world();
        world.get_mut::<Driver>(driver_entity).expect("driver").state = DriverState::Online;

        let mut schedule = Schedule::default();
        schedule.add_systems(request_inbound_system);

        arm_and_fire(&mut world, driver_entity);
        schedule.run(&mut world);
        arm_and_fire(&mut world, driver_entity);
        schedule.run(&mut world);

        let requests: Vec<_> = world.query::<&RideRequest>().iter(&world).cloned().collect();
        assert_eq!(requests.len(), 1, "second arrival must not queue another request");
        assert!(requests[0].id.0.starts_with("ride-"));
        assert_eq!(world.resource::<DashboardTelemetry>().requests_offered, 1);
        assert!(world.get::<Driver>(driver_entity).expect("driver").request_timer.is_none());
    }

    #[test]
    fn offline_driver_receives_nothing() {
        let (mut world, driver_entity) = driver_world();
        arm_and_fire(&mut world, driver_entity);

        let mut schedule = Schedule::default();
        schedule.add_systems(request_inbound_system);
        schedule.run(&mut world);

        assert_eq!(world.query::<&RideRequest>().iter(&world).count(), 0);
    }
}
