//! Driver dashboard surface: owns one driver's world and exposes the ride
//! lifecycle as plain method calls.
//!
//! Every call that represents a backend round-trip schedules a clock event and
//! marks the driver busy; the effect lands when time is driven past it with
//! [DriverDashboard::advance_by] or [DriverDashboard::run_until_idle]. Dropping
//! the dashboard cancels anything still scheduled.

use bevy_ecs::prelude::{Entity, Mut, Schedule, World};
use tracing::{debug, info};

use crate::backend::{BackendResource, RideBackend};
use crate::clock::{EventId, EventKind, EventSubject, SimulationClock};
use crate::config::{DashboardConfig, LatencyConfig};
use crate::ecs::{
    ActionFailure, Driver, DriverEarnings, OngoingRide, PendingAction, RequestOffer, RideId,
    RideRequest, RideStatus,
};
use crate::error::{RideError, TransitionError};
use crate::feed::RequestFeed;
use crate::lifecycle::{check_driver_action, enabled_actions, DriverAction, DriverPhase};
use crate::presentation::{availability_label, next_action, status_badge, NextAction, StatusBadge};
use crate::runner::{driver_schedule, run_until, run_until_empty};
use crate::session::Session;
use crate::systems::arm_request_timer;
use crate::telemetry::DashboardTelemetry;

/// Upper bound on events processed by one [DriverDashboard::run_until_idle].
const MAX_IDLE_STEPS: usize = 10_000;

pub struct DriverDashboard {
    world: World,
    schedule: Schedule,
    driver: Entity,
    closed: bool,
}

impl DriverDashboard {
    /// Open the dashboard for an authenticated driver session.
    pub fn open(session: &Session, config: DashboardConfig) -> Result<Self, RideError> {
        if !session.is_driver() {
            return Err(RideError::NotADriver {
                display_name: session.display_name.clone(),
            });
        }

        let mut world = World::new();
        world.insert_resource(SimulationClock::default());
        world.insert_resource(config.latency);
        world.insert_resource(BackendResource::default());
        world.insert_resource(DashboardTelemetry::default());
        world.insert_resource(RequestFeed::new(config.seed, config.request_templates));
        let driver = world
            .spawn((
                Driver::new(session.display_name.clone()),
                DriverEarnings::default(),
            ))
            .id();
        info!(driver = %session.display_name, "driver dashboard opened");

        Ok(Self {
            world,
            schedule: driver_schedule(),
            driver,
            closed: false,
        })
    }

    /// Replace the backend consulted when calls resolve.
    pub fn with_backend(mut self, backend: impl RideBackend + 'static) -> Self {
        self.world.insert_resource(BackendResource::new(backend));
        self
    }

    pub fn go_online(&mut self) -> Result<EventId, TransitionError> {
        let delay = self.latency().go_online_ms;
        self.begin(DriverAction::GoOnline, EventKind::WentOnline, delay, None)
    }

    pub fn go_offline(&mut self) -> Result<EventId, TransitionError> {
        let delay = self.latency().go_offline_ms;
        self.begin(DriverAction::GoOffline, EventKind::WentOffline, delay, None)
    }

    /// The availability switch: `true` goes online, `false` goes offline.
    pub fn set_available(&mut self, available: bool) -> Result<EventId, TransitionError> {
        if available {
            self.go_online()
        } else {
            self.go_offline()
        }
    }

    pub fn accept_ride(&mut self, id: &RideId) -> Result<EventId, TransitionError> {
        self.check(DriverAction::AcceptRide)?;
        let request = self
            .find_request(id)
            .ok_or_else(|| TransitionError::UnknownRequest(id.clone()))?;
        let delay = self.latency().accept_ms;
        self.begin(
            DriverAction::AcceptRide,
            EventKind::RideAccepted,
            delay,
            Some(request),
        )
    }

    /// Discard a pending request immediately. When the last one goes the driver
    /// is idle again and the next mock request is scheduled.
    pub fn reject_ride(&mut self, id: &RideId) -> Result<(), TransitionError> {
        self.check(DriverAction::RejectRide)?;
        let request = self
            .find_request(id)
            .ok_or_else(|| TransitionError::UnknownRequest(id.clone()))?;
        self.world.despawn(request);
        self.world.resource_mut::<DashboardTelemetry>().requests_rejected += 1;
        info!(ride = %id, "ride request rejected");

        let remaining = self.pending_requests().len();
        let latency = *self.latency();
        let driver_entity = self.driver;
        self.world
            .resource_scope(|world, mut clock: Mut<SimulationClock>| {
                if let Some(mut driver) = world.get_mut::<Driver>(driver_entity) {
                    arm_request_timer(&mut clock, &latency, driver_entity, &mut driver, remaining);
                }
            });
        Ok(())
    }

    pub fn advance_status(&mut self) -> Result<EventId, TransitionError> {
        let delay = self.latency().status_update_ms;
        let ride = self.driver_component().current_ride;
        self.begin(
            DriverAction::AdvanceStatus,
            EventKind::RideStatusAdvanced,
            delay,
            ride,
        )
    }

    pub fn complete_ride(&mut self) -> Result<EventId, TransitionError> {
        let delay = self.latency().complete_ms;
        let ride = self.driver_component().current_ride;
        self.begin(
            DriverAction::CompleteRide,
            EventKind::RideCompleted,
            delay,
            ride,
        )
    }

    /// Drive simulated time forward by `ms`, applying every effect that comes due.
    pub fn advance_by(&mut self, ms: u64) -> usize {
        let until = self.now().saturating_add(ms);
        run_until(&mut self.world, &mut self.schedule, until)
    }

    /// Process scheduled events until none remain.
    pub fn run_until_idle(&mut self) -> usize {
        run_until_empty(&mut self.world, &mut self.schedule, MAX_IDLE_STEPS)
    }

    /// Cancel every scheduled effect and clear the busy flag. Every later action
    /// is refused with [TransitionError::Closed]. Called on drop.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let dropped = self.world.resource_mut::<SimulationClock>().cancel_all();
        if let Some(mut driver) = self.world.get_mut::<Driver>(self.driver) {
            driver.pending = None;
            driver.request_timer = None;
        }
        debug!(dropped, "driver dashboard closed");
    }

    pub fn now(&self) -> u64 {
        self.world.resource::<SimulationClock>().now()
    }

    pub fn phase(&self) -> DriverPhase {
        let driver = self.driver_component();
        DriverPhase::of(
            driver,
            self.pending_requests().len(),
            self.current_ride().map(|ride| ride.status),
        )
    }

    pub fn is_busy(&self) -> bool {
        self.driver_component().is_busy()
    }

    pub fn pending_action(&self) -> Option<PendingAction<DriverAction>> {
        self.driver_component().pending
    }

    pub fn enabled_actions(&self) -> Vec<DriverAction> {
        if self.closed {
            return Vec::new();
        }
        enabled_actions(self.driver_component(), self.phase())
    }

    pub fn pending_requests(&self) -> Vec<RideRequest> {
        let mut requests: Vec<(u64, RideRequest)> = self
            .world
            .iter_entities()
            .filter_map(|entity| {
                let offer = entity.get::<RequestOffer>()?;
                let request = entity.get::<RideRequest>()?;
                (offer.driver == self.driver).then(|| (offer.offered_at, request.clone()))
            })
            .collect();
        requests.sort_by_key(|(offered_at, _)| *offered_at);
        requests.into_iter().map(|(_, request)| request).collect()
    }

    pub fn current_ride(&self) -> Option<&OngoingRide> {
        let ride = self.driver_component().current_ride?;
        self.world.get::<OngoingRide>(ride)
    }

    pub fn today_earnings(&self) -> u64 {
        self.earnings().today_earnings
    }

    pub fn completed_rides(&self) -> u32 {
        self.earnings().completed_rides
    }

    pub fn last_failure(&self) -> Option<&ActionFailure<DriverAction>> {
        self.driver_component().last_failure.as_ref()
    }

    pub fn telemetry(&self) -> &DashboardTelemetry {
        self.world.resource::<DashboardTelemetry>()
    }

    pub fn status_badge(&self) -> Option<StatusBadge> {
        status_badge(self.current_ride().map(|ride| ride.status))
    }

    pub fn next_action(&self) -> Option<NextAction> {
        next_action(self.current_ride().map(|ride| ride.status))
    }

    pub fn availability_label(&self) -> &'static str {
        availability_label(self.phase())
    }

    pub fn ride_status(&self) -> Option<RideStatus> {
        self.current_ride().map(|ride| ride.status)
    }

    fn check(&self, action: DriverAction) -> Result<(), TransitionError> {
        if self.closed {
            return Err(TransitionError::Closed);
        }
        check_driver_action(self.driver_component(), self.phase(), action)
    }

    fn begin(
        &mut self,
        action: DriverAction,
        kind: EventKind,
        delay_ms: u64,
        target: Option<Entity>,
    ) -> Result<EventId, TransitionError> {
        self.check(action)?;
        let driver_entity = self.driver;
        let event = self.world.resource_mut::<SimulationClock>().schedule_in(
            delay_ms,
            kind,
            Some(EventSubject::Driver(driver_entity)),
        );
        if let Some(mut driver) = self.world.get_mut::<Driver>(driver_entity) {
            driver.pending = Some(PendingAction {
                action,
                event,
                target,
            });
        }
        debug!(?action, ?event, delay_ms, "driver action pending");
        Ok(event)
    }

    fn find_request(&self, id: &RideId) -> Option<Entity> {
        self.world.iter_entities().find_map(|entity| {
            let offer = entity.get::<RequestOffer>()?;
            let request = entity.get::<RideRequest>()?;
            (offer.driver == self.driver && &request.id == id).then(|| entity.id())
        })
    }

    fn driver_component(&self) -> &Driver {
        self.world
            .get::<Driver>(self.driver)
            .expect("dashboard driver entity is never despawned")
    }

    fn earnings(&self) -> DriverEarnings {
        self.world
            .get::<DriverEarnings>(self.driver)
            .copied()
            .unwrap_or_default()
    }

    pub fn latency(&self) -> &LatencyConfig {
        self.world.resource::<LatencyConfig>()
    }
}

impl Drop for DriverDashboard {
    fn drop(&mut self) {
        self.close();
    }
}
