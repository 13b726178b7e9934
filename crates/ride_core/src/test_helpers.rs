//! Test helpers shared by unit tests, integration tests and benches.

use std::sync::{Arc, Mutex, PoisonError};

use crate::backend::{BackendCall, RideBackend};
use crate::config::LatencyConfig;
use crate::error::BackendError;
use crate::spatial::Location;

/// Pickup used across tests: north-west Delhi.
pub const TEST_PICKUP: (f64, f64) = (28.70, 77.10);
/// Dropoff 11.22 km from [TEST_PICKUP].
pub const TEST_DROPOFF: (f64, f64) = (28.75, 77.20);

pub fn test_pickup() -> Location {
    Location::new(TEST_PICKUP.0, TEST_PICKUP.1).expect("TEST_PICKUP should be valid")
}

pub fn test_dropoff() -> Location {
    Location::new(TEST_DROPOFF.0, TEST_DROPOFF.1).expect("TEST_DROPOFF should be valid")
}

/// Every simulated call resolves after one millisecond.
pub fn instant_latency() -> LatencyConfig {
    LatencyConfig {
        go_online_ms: 1,
        go_offline_ms: 1,
        accept_ms: 1,
        status_update_ms: 1,
        complete_ms: 1,
        request_arrival_ms: 1,
        resolve_location_ms: 1,
        book_ms: 1,
    }
}

/// Shared view of the calls a [ScriptedBackend] has seen.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<BackendCall>>>);

impl CallLog {
    pub fn calls(&self) -> Vec<BackendCall> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&self, call: BackendCall) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

type FailRule = Box<dyn Fn(&BackendCall) -> bool + Send + Sync>;

/// Backend that records every call and fails the ones matching a rule.
pub struct ScriptedBackend {
    log: CallLog,
    fail_when: FailRule,
}

impl ScriptedBackend {
    /// Succeeds on every call.
    pub fn recording() -> (Self, CallLog) {
        Self::failing_when(|_| false)
    }

    pub fn failing_when(
        rule: impl Fn(&BackendCall) -> bool + Send + Sync + 'static,
    ) -> (Self, CallLog) {
        let log = CallLog::default();
        let backend = Self {
            log: log.clone(),
            fail_when: Box::new(rule),
        };
        (backend, log)
    }
}

impl RideBackend for ScriptedBackend {
    fn commit(&mut self, call: &BackendCall) -> Result<(), BackendError> {
        self.log.push(call.clone());
        if (self.fail_when)(call) {
            return Err(BackendError::Unavailable(format!("scripted failure: {call:?}")));
        }
        Ok(())
    }
}
