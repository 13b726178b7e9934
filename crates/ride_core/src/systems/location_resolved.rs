use bevy_ecs::prelude::{Query, Res, ResMut};
use tracing::{debug, warn};

use crate::backend::{BackendCall, BackendResource};
use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::ecs::{ActionFailure, Booking, BookingAction};
use crate::feed::LocationPicker;
use crate::pricing::RateTable;
use crate::telemetry::BookingTelemetry;

/// Drops the picked pin into the booking and re-quotes.
pub fn location_resolved_system(
    clock: Res<SimulationClock>,
    event: Res<CurrentEvent>,
    rates: Res<RateTable>,
    mut picker: ResMut<LocationPicker>,
    mut backend: ResMut<BackendResource>,
    mut telemetry: ResMut<BookingTelemetry>,
    mut bookings: Query<&mut Booking>,
) {
    if event.0.kind != EventKind::LocationResolved {
        return;
    }
    let Some(EventSubject::Booking(booking_entity)) = event.0.subject else {
        return;
    };
    let Ok(mut booking) = bookings.get_mut(booking_entity) else {
        return;
    };
    let kind = match booking.pending {
        Some(pending) if pending.event == event.0.id => match pending.action {
            BookingAction::ResolveLocation(kind) => kind,
            BookingAction::BookRide => return,
        },
        _ => return,
    };
    booking.pending = None;

    if let Err(error) = backend.commit(&BackendCall::ResolveLocation(kind)) {
        warn!(rider = %booking.rider_name, ?kind, %error, "location lookup failed");
        telemetry.backend_failures += 1;
        booking.last_failure = Some(ActionFailure {
            action: BookingAction::ResolveLocation(kind),
            error,
            at: clock.now(),
        });
        return;
    }
    let Some(location) = picker.pick(kind) else {
        return;
    };

    debug!(
        rider = %booking.rider_name,
        ?kind,
        lat = location.lat(),
        lng = location.lng(),
        "location resolved"
    );
    booking.set_location(kind, location, &rates);
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::prelude::{Entity, Schedule, World};

    use crate::config::PickerConfig;
    use crate::ecs::{LocationKind, PendingAction};

    fn booking_world() -> (World, Entity) {
        let mut world = World::new();
        world.insert_resource(SimulationClock::default());
        world.insert_resource(RateTable::default());
        world.insert_resource(BackendResource::default());
        world.insert_resource(BookingTelemetry::default());
        world.insert_resource(
            LocationPicker::new(Some(9), &PickerConfig::default()).expect("picker"),
        );
        let booking = world.spawn(Booking::new("John Doe")).id();
        (world, booking)
    }

    fn resolve(world: &mut World, booking: Entity, kind: LocationKind) {
        let id = world.resource_mut::<SimulationClock>().schedule_in(
            1000,
            EventKind::LocationResolved,
            Some(EventSubject::Booking(booking)),
        );
        world.get_mut::<Booking>(booking).expect("booking").pending = Some(PendingAction {
            action: BookingAction::ResolveLocation(kind),
            event: id,
            target: None,
        });
        let event = world
            .resource_mut::<SimulationClock>()
            .pop_next()
            .expect("event");
        world.insert_resource(CurrentEvent(event));
        let mut schedule = Schedule::default();
        schedule.add_systems(location_resolved_system);
        schedule.run(world);
    }

    #[test]
    fn estimate_appears_once_both_pins_are_set() {
        let (mut world, booking) = booking_world();

        resolve(&mut world, booking, LocationKind::Pickup);
        let state = world.get::<Booking>(booking).expect("booking");
        assert!(state.pickup.is_some());
        assert!(state.estimate.is_none());
        assert!(state.pending.is_none());

        resolve(&mut world, booking, LocationKind::Dropoff);
        let state = world.get::<Booking>(booking).expect("booking");
        let estimate = state.estimate.expect("estimate");
        assert!(estimate.fare >= 50);
        assert_eq!(
            state.dropoff.as_ref().and_then(|l| l.address.as_deref()),
            Some("456 Mumbai Road, New Delhi")
        );
    }
}
