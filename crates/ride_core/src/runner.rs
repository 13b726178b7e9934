//! Surface runner: advances the clock and routes events into the ECS.
//!
//! Each step pops the next event from [SimulationClock], inserts it as
//! [CurrentEvent], then runs the surface schedule. Only the system matching the
//! event kind runs.

use bevy_ecs::prelude::{Res, Schedule, World};
use bevy_ecs::schedule::IntoSystemConfigs;

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::systems::{
    location_resolved::location_resolved_system, request_inbound::request_inbound_system,
    ride_accepted::ride_accepted_system, ride_booked::ride_booked_system,
    ride_completed::ride_completed_system, ride_status::ride_status_system,
    went_offline::went_offline_system, went_online::went_online_system,
};

fn is_went_online(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::WentOnline)
        .unwrap_or(false)
}

fn is_went_offline(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::WentOffline)
        .unwrap_or(false)
}

fn is_ride_request_inbound(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::RideRequestInbound)
        .unwrap_or(false)
}

fn is_ride_accepted(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::RideAccepted)
        .unwrap_or(false)
}

fn is_ride_status_advanced(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::RideStatusAdvanced)
        .unwrap_or(false)
}

fn is_ride_completed(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::RideCompleted)
        .unwrap_or(false)
}

fn is_location_resolved(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::LocationResolved)
        .unwrap_or(false)
}

fn is_ride_booked(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::RideBooked)
        .unwrap_or(false)
}

/// Schedule for the driver dashboard world.
pub fn driver_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems((
        went_online_system.run_if(is_went_online),
        went_offline_system.run_if(is_went_offline),
        request_inbound_system.run_if(is_ride_request_inbound),
        ride_accepted_system.run_if(is_ride_accepted),
        ride_status_system.run_if(is_ride_status_advanced),
        ride_completed_system.run_if(is_ride_completed),
    ));
    schedule
}

/// Schedule for the rider booking world.
pub fn booking_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems((
        location_resolved_system.run_if(is_location_resolved),
        ride_booked_system.run_if(is_ride_booked),
    ));
    schedule
}

/// Runs one step: pops the next event, inserts it as [CurrentEvent], then runs the schedule.
/// Returns `false` if the clock was empty.
pub fn run_next_event(world: &mut World, schedule: &mut Schedule) -> bool {
    let event = match world.resource_mut::<SimulationClock>().pop_next() {
        Some(e) => e,
        None => return false,
    };
    world.insert_resource(CurrentEvent(event));
    schedule.run(world);
    true
}

/// Runs until the queue is empty or `max_steps` is reached. Returns the number of steps executed.
pub fn run_until_empty(world: &mut World, schedule: &mut Schedule, max_steps: usize) -> usize {
    let mut steps = 0;
    while steps < max_steps {
        if !run_next_event(world, schedule) {
            break;
        }
        steps += 1;
    }
    steps
}

/// Fires every event due at or before `until_ms`, then moves the clock to `until_ms`.
/// Returns the number of events processed.
pub fn run_until(world: &mut World, schedule: &mut Schedule, until_ms: u64) -> usize {
    let mut steps = 0;
    loop {
        let due = world
            .resource::<SimulationClock>()
            .next_event_time()
            .is_some_and(|ts| ts <= until_ms);
        if !due || !run_next_event(world, schedule) {
            break;
        }
        steps += 1;
    }
    world.resource_mut::<SimulationClock>().advance_to(until_ms);
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendResource;
    use crate::clock::EventSubject;
    use crate::config::LatencyConfig;
    use crate::ecs::{Driver, DriverEarnings, DriverState, PendingAction};
    use crate::feed::RequestFeed;
    use crate::lifecycle::DriverAction;
    use crate::telemetry::DashboardTelemetry;

    #[test]
    fn run_until_stops_before_future_events() {
        let mut world = World::new();
        world.insert_resource(SimulationClock::default());
        world.insert_resource(LatencyConfig::default());
        world.insert_resource(BackendResource::default());
        world.insert_resource(DashboardTelemetry::default());
        world.insert_resource(RequestFeed::new(Some(1), Vec::new()));
        let driver = world
            .spawn((Driver::new("Driver Demo"), DriverEarnings::default()))
            .id();
        let id = world.resource_mut::<SimulationClock>().schedule_in(
            1500,
            EventKind::WentOnline,
            Some(EventSubject::Driver(driver)),
        );
        world.get_mut::<Driver>(driver).expect("driver").pending = Some(PendingAction {
            action: DriverAction::GoOnline,
            event: id,
            target: None,
        });

        let mut schedule = driver_schedule();
        assert_eq!(run_until(&mut world, &mut schedule, 1000), 0);
        assert_eq!(world.resource::<SimulationClock>().now(), 1000);
        assert_eq!(
            world.get::<Driver>(driver).expect("driver").state,
            DriverState::Offline
        );

        assert_eq!(run_until(&mut world, &mut schedule, 1500), 1);
        assert_eq!(
            world.get::<Driver>(driver).expect("driver").state,
            DriverState::Online
        );

        // The request timer fires 5s after going online.
        assert_eq!(run_until(&mut world, &mut schedule, 6500), 1);
        assert_eq!(world.resource::<DashboardTelemetry>().requests_offered, 1);
        assert_eq!(run_until_empty(&mut world, &mut schedule, 10), 0);
    }
}
