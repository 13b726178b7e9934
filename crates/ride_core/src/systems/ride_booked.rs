use bevy_ecs::prelude::{Query, Res, ResMut};
use tracing::{info, warn};

use crate::backend::{BackendCall, BackendResource};
use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::ecs::{ActionFailure, Booking, BookingAction, BookingConfirmation};
use crate::telemetry::BookingTelemetry;

/// Single-shot booking commit. No retry on failure.
pub fn ride_booked_system(
    clock: Res<SimulationClock>,
    event: Res<CurrentEvent>,
    mut backend: ResMut<BackendResource>,
    mut telemetry: ResMut<BookingTelemetry>,
    mut bookings: Query<&mut Booking>,
) {
    if event.0.kind != EventKind::RideBooked {
        return;
    }
    let Some(EventSubject::Booking(booking_entity)) = event.0.subject else {
        return;
    };
    let Ok(mut booking) = bookings.get_mut(booking_entity) else {
        return;
    };
    match booking.pending {
        Some(pending) if pending.event == event.0.id && pending.action == BookingAction::BookRide => {
            booking.pending = None;
        }
        _ => return,
    }
    let Some(estimate) = booking.estimate else {
        return;
    };

    let ride_type = booking.ride_type;
    if let Err(error) = backend.commit(&BackendCall::BookRide(ride_type)) {
        warn!(rider = %booking.rider_name, %ride_type, %error, "booking failed");
        telemetry.backend_failures += 1;
        booking.last_failure = Some(ActionFailure {
            action: BookingAction::BookRide,
            error,
            at: clock.now(),
        });
        return;
    }

    let message = format!(
        "Your {ride_type} has been booked! A driver will arrive in approximately {} minutes.",
        estimate.eta_mins
    );
    info!(
        rider = %booking.rider_name,
        %ride_type,
        fare = estimate.fare,
        eta_mins = estimate.eta_mins,
        "ride booked"
    );
    booking.confirmation = Some(BookingConfirmation {
        ride_type,
        estimate,
        booked_at: clock.now(),
        message,
    });
    telemetry.rides_booked += 1;
}
