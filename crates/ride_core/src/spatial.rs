//! Geographic primitives: validated lat/lng locations and great-circle distance.

use h3o::{CellIndex, LatLng, Resolution};
use serde::{Deserialize, Serialize};

use crate::error::RideError;

/// Mean Earth radius used by the fare estimator.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point picked on the map, optionally with a resolved street address.
/// Deserialization runs the same checks as [Location::new].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLocation")]
pub struct Location {
    lat: f64,
    lng: f64,
    pub address: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLocation {
    lat: f64,
    lng: f64,
    #[serde(default)]
    address: Option<String>,
}

impl TryFrom<RawLocation> for Location {
    type Error = RideError;

    fn try_from(raw: RawLocation) -> Result<Self, Self::Error> {
        let location = Location::new(raw.lat, raw.lng)?;
        Ok(Location {
            address: raw.address,
            ..location
        })
    }
}

impl Location {
    pub fn new(lat: f64, lng: f64) -> Result<Self, RideError> {
        let invalid = || RideError::InvalidCoordinates { lat, lng };
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(invalid());
        }
        LatLng::new(lat, lng).map_err(|_| invalid())?;
        Ok(Self {
            lat,
            lng,
            address: None,
        })
    }

    /// Center of an H3 cell as a location (no address).
    pub fn from_cell(cell: CellIndex) -> Self {
        let center = LatLng::from(cell);
        Self {
            lat: center.lat(),
            lng: center.lng(),
            address: None,
        }
    }

    /// H3 cell containing this location at `resolution`.
    pub fn cell(&self, resolution: Resolution) -> Result<CellIndex, RideError> {
        let ll = LatLng::new(self.lat, self.lng).map_err(|_| RideError::InvalidCoordinates {
            lat: self.lat,
            lng: self.lng,
        })?;
        Ok(ll.to_cell(resolution))
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }
}

/// Haversine distance in km between two locations.
pub fn distance_km(a: &Location, b: &Location) -> f64 {
    let (lat1, lon1) = (a.lat.to_radians(), a.lng.to_radians());
    let (lat2, lon2) = (b.lat.to_radians(), b.lng.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    // Rounding can push `h` just past 1 for antipodal points.
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}
