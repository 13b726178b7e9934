//! Rider booking surface: pick pickup and dropoff, get a quote, book.
//!
//! Phases run `Idle -> LocationsSet -> Booking -> Confirmed`. The quote is
//! recomputed on every change to pickup, dropoff or ride type. Changes are
//! refused while a lookup or booking is pending.

use bevy_ecs::prelude::{Entity, Schedule, World};
use tracing::{debug, info};

use crate::backend::{BackendResource, RideBackend};
use crate::clock::{EventId, EventKind, EventSubject, SimulationClock};
use crate::config::{BookingConfig, LatencyConfig};
use crate::ecs::{
    ActionFailure, Booking, BookingAction, BookingConfirmation, LocationKind, PendingAction,
};
use crate::error::{RideError, TransitionError};
use crate::feed::LocationPicker;
use crate::lifecycle::{check_book_ride, BookingPhase};
use crate::pricing::{FareEstimate, RateTable, RideType};
use crate::runner::{booking_schedule, run_until, run_until_empty};
use crate::session::Session;
use crate::spatial::Location;
use crate::telemetry::BookingTelemetry;

const MAX_IDLE_STEPS: usize = 1_000;

pub struct BookingSurface {
    world: World,
    schedule: Schedule,
    booking: Entity,
    closed: bool,
}

impl BookingSurface {
    pub fn open(session: &Session, config: BookingConfig) -> Result<Self, RideError> {
        let picker = LocationPicker::new(config.seed, &config.picker)?;

        let mut world = World::new();
        world.insert_resource(SimulationClock::default());
        world.insert_resource(config.latency);
        world.insert_resource(config.rates);
        world.insert_resource(picker);
        world.insert_resource(BackendResource::default());
        world.insert_resource(BookingTelemetry::default());
        let booking = world.spawn(Booking::new(session.display_name.clone())).id();
        info!(rider = %session.display_name, "booking surface opened");

        Ok(Self {
            world,
            schedule: booking_schedule(),
            booking,
            closed: false,
        })
    }

    /// Open from the legacy flag store; fails unless a session is present.
    pub fn open_from(session: Option<&Session>, config: BookingConfig) -> Result<Self, RideError> {
        let session = session.ok_or(RideError::Unauthenticated)?;
        Self::open(session, config)
    }

    pub fn with_backend(mut self, backend: impl RideBackend + 'static) -> Self {
        self.world.insert_resource(BackendResource::new(backend));
        self
    }

    pub fn select_ride_type(&mut self, ride_type: RideType) -> Result<(), TransitionError> {
        self.check_idle()?;
        let rates = *self.world.resource::<RateTable>();
        if let Some(mut booking) = self.world.get_mut::<Booking>(self.booking) {
            booking.set_ride_type(ride_type, &rates);
        }
        Ok(())
    }

    /// Ask the map widget stand-in for a pin; it lands after the lookup latency.
    pub fn request_location(&mut self, kind: LocationKind) -> Result<EventId, TransitionError> {
        let delay = self.world.resource::<LatencyConfig>().resolve_location_ms;
        self.begin(
            BookingAction::ResolveLocation(kind),
            EventKind::LocationResolved,
            delay,
        )
    }

    /// Accept a location from a real map widget. Applies immediately.
    pub fn set_location(
        &mut self,
        kind: LocationKind,
        location: Location,
    ) -> Result<(), TransitionError> {
        self.check_idle()?;
        let rates = *self.world.resource::<RateTable>();
        if let Some(mut booking) = self.world.get_mut::<Booking>(self.booking) {
            booking.set_location(kind, location, &rates);
        }
        Ok(())
    }

    pub fn book_ride(&mut self) -> Result<EventId, TransitionError> {
        if self.closed {
            return Err(TransitionError::Closed);
        }
        check_book_ride(self.booking_component())?;
        let delay = self.world.resource::<LatencyConfig>().book_ms;
        self.begin(BookingAction::BookRide, EventKind::RideBooked, delay)
    }

    pub fn can_book(&self) -> bool {
        !self.closed && check_book_ride(self.booking_component()).is_ok()
    }

    pub fn advance_by(&mut self, ms: u64) -> usize {
        let until = self.now().saturating_add(ms);
        run_until(&mut self.world, &mut self.schedule, until)
    }

    pub fn run_until_idle(&mut self) -> usize {
        run_until_empty(&mut self.world, &mut self.schedule, MAX_IDLE_STEPS)
    }

    /// Cancel every scheduled effect. Every later action is refused with
    /// [TransitionError::Closed].
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let dropped = self.world.resource_mut::<SimulationClock>().cancel_all();
        if let Some(mut booking) = self.world.get_mut::<Booking>(self.booking) {
            booking.pending = None;
        }
        debug!(dropped, "booking surface closed");
    }

    pub fn now(&self) -> u64 {
        self.world.resource::<SimulationClock>().now()
    }

    pub fn phase(&self) -> BookingPhase {
        BookingPhase::of(self.booking_component())
    }

    pub fn is_busy(&self) -> bool {
        self.booking_component().pending.is_some()
    }

    pub fn ride_type(&self) -> RideType {
        self.booking_component().ride_type
    }

    pub fn location(&self, kind: LocationKind) -> Option<&Location> {
        self.booking_component().location(kind)
    }

    pub fn estimate(&self) -> Option<FareEstimate> {
        self.booking_component().estimate
    }

    pub fn confirmation(&self) -> Option<&BookingConfirmation> {
        self.booking_component().confirmation.as_ref()
    }

    pub fn last_failure(&self) -> Option<&ActionFailure<BookingAction>> {
        self.booking_component().last_failure.as_ref()
    }

    pub fn telemetry(&self) -> &BookingTelemetry {
        self.world.resource::<BookingTelemetry>()
    }

    fn begin(
        &mut self,
        action: BookingAction,
        kind: EventKind,
        delay_ms: u64,
    ) -> Result<EventId, TransitionError> {
        self.check_idle()?;
        let booking_entity = self.booking;
        let event = self.world.resource_mut::<SimulationClock>().schedule_in(
            delay_ms,
            kind,
            Some(EventSubject::Booking(booking_entity)),
        );
        if let Some(mut booking) = self.world.get_mut::<Booking>(booking_entity) {
            booking.pending = Some(PendingAction {
                action,
                event,
                target: None,
            });
        }
        debug!(?action, ?event, delay_ms, "booking action pending");
        Ok(event)
    }

    fn check_idle(&self) -> Result<(), TransitionError> {
        if self.closed {
            return Err(TransitionError::Closed);
        }
        match self.booking_component().pending {
            Some(pending) => Err(TransitionError::Busy {
                pending: pending.event,
            }),
            None => Ok(()),
        }
    }

    fn booking_component(&self) -> &Booking {
        self.world
            .get::<Booking>(self.booking)
            .expect("booking entity is never despawned")
    }
}

impl Drop for BookingSurface {
    fn drop(&mut self) {
        self.close();
    }
}
