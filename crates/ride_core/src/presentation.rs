//! Labels and controls a dashboard renders for the current ride status.

use crate::ecs::RideStatus;
use crate::lifecycle::{DriverAction, DriverPhase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeVariant {
    Warning,
    Brand,
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusBadge {
    pub label: &'static str,
    pub variant: BadgeVariant,
}

/// The single control offered for a ride status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextAction {
    pub label: &'static str,
    pub action: DriverAction,
}

pub fn status_badge(status: Option<RideStatus>) -> Option<StatusBadge> {
    let badge = match status? {
        RideStatus::Enroute => StatusBadge {
            label: "En Route to Pickup",
            variant: BadgeVariant::Warning,
        },
        RideStatus::Arrived => StatusBadge {
            label: "At Pickup Location",
            variant: BadgeVariant::Brand,
        },
        RideStatus::InProgress => StatusBadge {
            label: "Ride in Progress",
            variant: BadgeVariant::Success,
        },
    };
    Some(badge)
}

pub fn next_action(status: Option<RideStatus>) -> Option<NextAction> {
    let next = match status? {
        RideStatus::Enroute => NextAction {
            label: "I've Arrived at Pickup",
            action: DriverAction::AdvanceStatus,
        },
        RideStatus::Arrived => NextAction {
            label: "Start Ride",
            action: DriverAction::AdvanceStatus,
        },
        RideStatus::InProgress => NextAction {
            label: "Complete Ride",
            action: DriverAction::CompleteRide,
        },
    };
    Some(next)
}

pub fn availability_label(phase: DriverPhase) -> &'static str {
    if phase.is_online() {
        "Online"
    } else {
        "Offline"
    }
}
