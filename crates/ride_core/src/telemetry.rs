//! Per-surface records of completed rides and failure counters.

use bevy_ecs::prelude::{Entity, Resource};

use crate::ecs::RideId;

/// One completed ride, recorded when the driver completes it.
/// Timestamps are simulation milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedRideRecord {
    pub ride_id: RideId,
    pub driver: Entity,
    pub fare: u32,
    pub accepted_at: u64,
    pub started_at: u64,
    pub completed_at: u64,
}

impl CompletedRideRecord {
    /// Time from acceptance to the rider being picked up.
    pub fn time_to_pickup(&self) -> u64 {
        self.started_at.saturating_sub(self.accepted_at)
    }

    /// Time from pickup to completion.
    pub fn ride_duration(&self) -> u64 {
        self.completed_at.saturating_sub(self.started_at)
    }
}

#[derive(Debug, Default, Resource)]
pub struct DashboardTelemetry {
    pub completed_rides: Vec<CompletedRideRecord>,
    pub requests_offered: u64,
    pub requests_rejected: u64,
    pub backend_failures: u64,
}

#[derive(Debug, Default, Resource)]
pub struct BookingTelemetry {
    pub rides_booked: u64,
    pub backend_failures: u64,
}
