//! Surface configuration: simulated latencies, request feed and tariff.
//!
//! Every struct has a `Default` matching the demo client and can be loaded from
//! JSON where any omitted field keeps its default.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::ecs::{RideId, RideRequest, RiderProfile};
use crate::error::RideError;
use crate::pricing::RateTable;

/// Artificial latency (ms) of each simulated backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Resource, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LatencyConfig {
    pub go_online_ms: u64,
    pub go_offline_ms: u64,
    pub accept_ms: u64,
    pub status_update_ms: u64,
    pub complete_ms: u64,
    /// Delay between becoming idle and the next mock request arriving.
    pub request_arrival_ms: u64,
    pub resolve_location_ms: u64,
    pub book_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            go_online_ms: 1500,
            go_offline_ms: 1500,
            accept_ms: 2000,
            status_update_ms: 1500,
            complete_ms: 2000,
            request_arrival_ms: 5000,
            resolve_location_ms: 1000,
            book_ms: 2000,
        }
    }
}

/// Shape of a mock request produced by the feed; the id is generated per offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestTemplate {
    pub rider: RiderProfile,
    pub pickup: String,
    pub dropoff: String,
    pub distance: String,
    pub fare: u32,
    pub eta_mins: u32,
}

impl RequestTemplate {
    pub fn to_request(&self, id: RideId) -> RideRequest {
        RideRequest {
            id,
            rider: self.rider.clone(),
            pickup: self.pickup.clone(),
            dropoff: self.dropoff.clone(),
            distance: self.distance.clone(),
            fare: self.fare,
            eta_mins: self.eta_mins,
        }
    }
}

impl Default for RequestTemplate {
    fn default() -> Self {
        Self {
            rider: RiderProfile {
                name: "Rahul Sharma".to_owned(),
                rating: 4.8,
                image: Some("/placeholder.svg".to_owned()),
            },
            pickup: "Connaught Place, New Delhi".to_owned(),
            dropoff: "Saket, New Delhi".to_owned(),
            distance: "8.2 km".to_owned(),
            fare: 210,
            eta_mins: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub seed: Option<u64>,
    pub latency: LatencyConfig,
    /// Cycled in order; an empty list falls back to the default template.
    pub request_templates: Vec<RequestTemplate>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            seed: None,
            latency: LatencyConfig::default(),
            request_templates: vec![RequestTemplate::default()],
        }
    }
}

impl DashboardConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, RideError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_latency(mut self, latency: LatencyConfig) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_request_templates(mut self, templates: Vec<RequestTemplate>) -> Self {
        self.request_templates = templates;
        self
    }
}

/// Where the mock location picker drops pins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PickerConfig {
    pub center_lat: f64,
    pub center_lng: f64,
    /// H3 grid distance around the center cell that pins may land in.
    pub spread_cells: u32,
    pub pickup_address: String,
    pub dropoff_address: String,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            center_lat: 28.7041,
            center_lng: 77.1025,
            spread_cells: 3,
            pickup_address: "123 Delhi Street, New Delhi".to_owned(),
            dropoff_address: "456 Mumbai Road, New Delhi".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BookingConfig {
    pub seed: Option<u64>,
    pub latency: LatencyConfig,
    pub rates: RateTable,
    pub picker: PickerConfig,
}

impl BookingConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, RideError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_latency(mut self, latency: LatencyConfig) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_rates(mut self, rates: RateTable) -> Self {
        self.rates = rates;
        self
    }
}
