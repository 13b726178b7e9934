use bevy_ecs::prelude::{Query, Res, ResMut};
use tracing::{info, warn};

use crate::backend::{BackendCall, BackendResource};
use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::config::LatencyConfig;
use crate::ecs::{Driver, DriverState};
use crate::lifecycle::DriverAction;
use crate::systems::{arm_request_timer, driver_subject, record_driver_failure, settle_driver_action};
use crate::telemetry::DashboardTelemetry;

pub fn went_online_system(
    mut clock: ResMut<SimulationClock>,
    event: Res<CurrentEvent>,
    latency: Res<LatencyConfig>,
    mut backend: ResMut<BackendResource>,
    mut telemetry: ResMut<DashboardTelemetry>,
    mut drivers: Query<&mut Driver>,
) {
    if event.0.kind != EventKind::WentOnline {
        return;
    }
    let Some(driver_entity) = driver_subject(&event.0) else {
        return;
    };
    let Ok(mut driver) = drivers.get_mut(driver_entity) else {
        return;
    };
    if settle_driver_action(&mut driver, &event.0, DriverAction::GoOnline).is_none() {
        return;
    }
    if driver.state != DriverState::Offline {
        return;
    }

    if let Err(error) = backend.commit(&BackendCall::GoOnline) {
        warn!(driver = %driver.name, %error, "go online failed");
        telemetry.backend_failures += 1;
        record_driver_failure(&mut driver, DriverAction::GoOnline, error, clock.now());
        return;
    }

    driver.state = DriverState::Online;
    info!(driver = %driver.name, at = clock.now(), "driver online");
    arm_request_timer(&mut clock, &latency, driver_entity, &mut driver, 0);
}
