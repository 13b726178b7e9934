//! Book a ride as a rider: drop two pins, compare car and bike, book a car.
//!
//! Run with: cargo run -p ride_core --example book_ride

use ride_core::booking::BookingSurface;
use ride_core::config::BookingConfig;
use ride_core::ecs::LocationKind;
use ride_core::error::RideError;
use ride_core::pricing::RideType;
use ride_core::session::{Session, UserType};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), RideError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let session = Session::new(UserType::Rider, "John Doe");
    let mut surface = BookingSurface::open(&session, BookingConfig::default().with_seed(11))?;
    println!("--- Booking ({}) ---", session.display_name);

    for kind in [LocationKind::Pickup, LocationKind::Dropoff] {
        if let Err(err) = surface.request_location(kind) {
            println!("location lookup refused: {err}");
        }
        surface.run_until_idle();
        if let Some(location) = surface.location(kind) {
            println!(
                "{kind:?}: ({:.4}, {:.4}) {}",
                location.lat(),
                location.lng(),
                location.address.as_deref().unwrap_or("-"),
            );
        }
    }

    for ride_type in [RideType::Bike, RideType::Car] {
        if let Err(err) = surface.select_ride_type(ride_type) {
            println!("ride type change refused: {err}");
        }
        if let Some(estimate) = surface.estimate() {
            println!(
                "{ride_type:<5} {:>5.2} km  fare {:>4}  eta {:>3} min",
                estimate.distance_km, estimate.fare, estimate.eta_mins
            );
        }
    }

    match surface.book_ride() {
        Ok(_) => {
            surface.run_until_idle();
        }
        Err(err) => println!("booking refused: {err}"),
    }
    match surface.confirmation() {
        Some(confirmation) => println!("\n{}", confirmation.message),
        None => println!("\nno confirmation ({:?})", surface.last_failure()),
    }
    Ok(())
}
