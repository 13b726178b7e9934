#![allow(dead_code)]

use ride_core::config::{RequestTemplate, LatencyConfig};
use ride_core::ecs::RiderProfile;
use ride_core::session::{Session, SessionFlags, UserType};
use ride_core::spatial::Location;
use ride_core::test_helpers::{test_dropoff, test_pickup};

pub const SEED: u64 = 42;

/// Pickup/dropoff pair 11.22 km apart.
pub fn seeded_trip() -> (Location, Location) {
    (test_pickup(), test_dropoff())
}

/// Connaught Place to Saket, roughly 11.9 km.
pub fn delhi_trip() -> (Location, Location) {
    (
        Location::new(28.6315, 77.2167).expect("connaught place"),
        Location::new(28.5245, 77.2066).expect("saket"),
    )
}

pub fn rider_session() -> Session {
    Session::new(UserType::Rider, "John Doe")
}

pub fn flags(pairs: &[(&str, &str)]) -> SessionFlags {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

/// A second request shape so tests can tell templates apart.
pub fn airport_template() -> RequestTemplate {
    RequestTemplate {
        rider: RiderProfile {
            name: "Priya Verma".to_owned(),
            rating: 4.6,
            image: Some("/placeholder.svg".to_owned()),
        },
        pickup: "Karol Bagh, New Delhi".to_owned(),
        dropoff: "IGI Airport T3, New Delhi".to_owned(),
        distance: "17.5 km".to_owned(),
        fare: 340,
        eta_mins: 7,
    }
}

/// Latencies of the demo client, spelled out for timing assertions.
pub fn demo_latency() -> LatencyConfig {
    LatencyConfig::default()
}
