//! Discrete-event clock that stands in for wall-clock timers.
//!
//! Every simulated backend call is an [Event] scheduled some milliseconds in the
//! future. Events can be cancelled, which is how a surface drops its pending
//! timers on teardown.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy_ecs::prelude::{Entity, Resource};

pub const ONE_SEC_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    WentOnline,
    WentOffline,
    RideRequestInbound,
    RideAccepted,
    RideStatusAdvanced,
    RideCompleted,
    LocationResolved,
    RideBooked,
}

/// What an event acts on. Mirrors the entity kinds living in a surface world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSubject {
    Driver(Entity),
    Booking(Entity),
}

/// Handle returned by [SimulationClock::schedule_in]; used to cancel the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    pub timestamp: u64,
    pub kind: EventKind,
    pub subject: Option<EventSubject>,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap by timestamp; ties pop in scheduling order.
        other
            .timestamp
            .cmp(&self.timestamp)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The event currently being routed through the schedule.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentEvent(pub Event);

#[derive(Debug, Default, Resource)]
pub struct SimulationClock {
    now: u64,
    next_id: u64,
    events: BinaryHeap<Event>,
}

impl SimulationClock {
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Schedule `kind` to fire `delay_ms` from now.
    pub fn schedule_in(
        &mut self,
        delay_ms: u64,
        kind: EventKind,
        subject: Option<EventSubject>,
    ) -> EventId {
        self.schedule_at(self.now.saturating_add(delay_ms), kind, subject)
    }

    pub fn schedule_at(
        &mut self,
        timestamp: u64,
        kind: EventKind,
        subject: Option<EventSubject>,
    ) -> EventId {
        debug_assert!(
            timestamp >= self.now,
            "event timestamp must be >= current time"
        );
        let id = EventId(self.next_id);
        self.next_id += 1;
        self.events.push(Event {
            id,
            timestamp: timestamp.max(self.now),
            kind,
            subject,
        });
        id
    }

    /// Remove a scheduled event. Returns `false` if it already fired or was never scheduled.
    pub fn cancel(&mut self, id: EventId) -> bool {
        let before = self.events.len();
        self.events.retain(|event| event.id != id);
        self.events.len() != before
    }

    /// Drop every scheduled event, returning how many were discarded.
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.events.len();
        self.events.clear();
        dropped
    }

    pub fn is_scheduled(&self, id: EventId) -> bool {
        self.events.iter().any(|event| event.id == id)
    }

    pub fn next_event_time(&self) -> Option<u64> {
        self.events.peek().map(|event| event.timestamp)
    }

    pub fn pop_next(&mut self) -> Option<Event> {
        let event = self.events.pop()?;
        self.now = event.timestamp;
        Some(event)
    }

    /// Move time forward without firing anything. Never moves backwards and never
    /// skips over a scheduled event.
    pub fn advance_to(&mut self, timestamp: u64) {
        let limit = self.next_event_time().unwrap_or(u64::MAX);
        self.now = self.now.max(timestamp.min(limit));
    }

    pub fn pending(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
