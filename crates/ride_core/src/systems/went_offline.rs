use bevy_ecs::prelude::{Commands, Entity, Query, Res, ResMut};
use tracing::{info, warn};

use crate::backend::{BackendCall, BackendResource};
use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::ecs::{Driver, DriverState, RequestOffer};
use crate::lifecycle::DriverAction;
use crate::systems::{
    disarm_request_timer, driver_subject, record_driver_failure, settle_driver_action,
};
use crate::telemetry::DashboardTelemetry;

pub fn went_offline_system(
    mut clock: ResMut<SimulationClock>,
    event: Res<CurrentEvent>,
    mut backend: ResMut<BackendResource>,
    mut telemetry: ResMut<DashboardTelemetry>,
    mut commands: Commands,
    mut drivers: Query<&mut Driver>,
    offers: Query<(Entity, &RequestOffer)>,
) {
    if event.0.kind != EventKind::WentOffline {
        return;
    }
    let Some(driver_entity) = driver_subject(&event.0) else {
        return;
    };
    let Ok(mut driver) = drivers.get_mut(driver_entity) else {
        return;
    };
    if settle_driver_action(&mut driver, &event.0, DriverAction::GoOffline).is_none() {
        return;
    }
    // Never offline mid-ride, whatever the surface allowed.
    if driver.state != DriverState::Online || driver.current_ride.is_some() {
        return;
    }

    if let Err(error) = backend.commit(&BackendCall::GoOffline) {
        warn!(driver = %driver.name, %error, "go offline failed");
        telemetry.backend_failures += 1;
        record_driver_failure(&mut driver, DriverAction::GoOffline, error, clock.now());
        return;
    }

    driver.state = DriverState::Offline;
    disarm_request_timer(&mut clock, &mut driver);
    let mut discarded = 0;
    for (request_entity, offer) in offers.iter() {
        if offer.driver == driver_entity {
            commands.entity(request_entity).despawn();
            discarded += 1;
        }
    }
    info!(driver = %driver.name, at = clock.now(), discarded, "driver offline");
}
