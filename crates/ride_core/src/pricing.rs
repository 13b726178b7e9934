//! Fare and ETA estimation for the rider booking flow.
//!
//! `fare = round(base_fare + distance_km * per_km_rate)` and
//! `eta = round(distance_km / avg_speed_kmh * 60)`, with the distance taken as
//! the haversine great-circle distance between pickup and dropoff.

use std::fmt;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::spatial::{distance_km, Location};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RideType {
    #[default]
    Car,
    Bike,
}

impl fmt::Display for RideType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RideType::Car => f.pad("car"),
            RideType::Bike => f.pad("bike"),
        }
    }
}

/// Tariff for one ride type, in whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateCard {
    pub base_fare: f64,
    pub per_km_rate: f64,
    pub avg_speed_kmh: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Resource, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RateTable {
    pub car: RateCard,
    pub bike: RateCard,
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            car: RateCard {
                base_fare: 50.0,
                per_km_rate: 12.0,
                avg_speed_kmh: 30.0,
            },
            bike: RateCard {
                base_fare: 30.0,
                per_km_rate: 7.0,
                avg_speed_kmh: 20.0,
            },
        }
    }
}

impl RateTable {
    pub fn card(&self, ride_type: RideType) -> &RateCard {
        match ride_type {
            RideType::Car => &self.car,
            RideType::Bike => &self.bike,
        }
    }

    pub fn estimate(
        &self,
        pickup: &Location,
        dropoff: &Location,
        ride_type: RideType,
    ) -> FareEstimate {
        let card = self.card(ride_type);
        let distance_km = distance_km(pickup, dropoff);
        let fare = round_non_negative(card.base_fare + distance_km * card.per_km_rate);
        let eta_mins = if card.avg_speed_kmh > 0.0 {
            round_non_negative(distance_km / card.avg_speed_kmh * 60.0)
        } else {
            0
        };
        FareEstimate {
            ride_type,
            distance_km,
            fare,
            eta_mins,
        }
    }
}

/// Derived price and travel time for a pickup/dropoff pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FareEstimate {
    pub ride_type: RideType,
    pub distance_km: f64,
    pub fare: u32,
    pub eta_mins: u32,
}

/// Estimate with the default tariff.
pub fn estimate(pickup: &Location, dropoff: &Location, ride_type: RideType) -> FareEstimate {
    RateTable::default().estimate(pickup, dropoff, ride_type)
}

fn round_non_negative(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round().min(u32::MAX as f64) as u32
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(lat: f64, lng: f64) -> Location {
        Location::new(lat, lng).expect("location")
    }

    #[test]
    fn identical_points_cost_the_base_fare() {
        let here = loc(28.7041, 77.1025);
        let car = estimate(&here, &here, RideType::Car);
        assert_eq!(car.fare, 50);
        assert_eq!(car.eta_mins, 0);

        let bike = estimate(&here, &here, RideType::Bike);
        assert_eq!(bike.fare, 30);
        assert_eq!(bike.eta_mins, 0);
    }

    #[test]
    fn delhi_car_and_bike_quotes() {
        let pickup = loc(28.70, 77.10);
        let dropoff = loc(28.75, 77.20);

        let car = estimate(&pickup, &dropoff, RideType::Car);
        assert!((car.distance_km - 11.22).abs() < 0.01);
        assert_eq!(car.fare, 185);
        assert_eq!(car.eta_mins, 22);

        let bike = estimate(&pickup, &dropoff, RideType::Bike);
        assert_eq!(bike.fare, 109);
        assert_eq!(bike.eta_mins, 34);
    }

    #[test]
    fn estimate_is_deterministic() {
        let pickup = loc(28.6315, 77.2167);
        let dropoff = loc(28.5245, 77.2066);
        let first = estimate(&pickup, &dropoff, RideType::Car);
        let second = estimate(&pickup, &dropoff, RideType::Car);
        assert_eq!(first, second);
        assert_eq!(first.fare, 193);
        assert_eq!(first.eta_mins, 24);
    }

    #[test]
    fn zero_speed_card_yields_zero_eta() {
        let mut table = RateTable::default();
        table.car.avg_speed_kmh = 0.0;
        let quote = table.estimate(&loc(0.0, 0.0), &loc(0.0, 1.0), RideType::Car);
        assert_eq!(quote.eta_mins, 0);
        assert!(quote.fare > 50);
    }

    #[test]
    fn rate_table_overrides_from_json() {
        let table: RateTable =
            serde_json::from_str(r#"{"bike":{"base_fare":25,"per_km_rate":5,"avg_speed_kmh":18}}"#)
                .expect("rate table");
        assert_eq!(table.car, RateTable::default().car);
        assert_eq!(table.bike.base_fare, 25.0);
    }
}
