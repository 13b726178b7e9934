//! Backend seam consulted when a simulated call resolves.

use bevy_ecs::prelude::Resource;

use crate::ecs::{LocationKind, RideId, RideStatus};
use crate::error::BackendError;
use crate::pricing::RideType;

/// The remote call a pending action represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    GoOnline,
    GoOffline,
    AcceptRide(RideId),
    UpdateStatus { ride: RideId, status: RideStatus },
    CompleteRide(RideId),
    ResolveLocation(LocationKind),
    BookRide(RideType),
}

pub trait RideBackend: Send + Sync {
    fn commit(&mut self, call: &BackendCall) -> Result<(), BackendError>;
}

/// Always succeeds; the latency is modelled by the clock, not here.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedBackend;

impl RideBackend for SimulatedBackend {
    fn commit(&mut self, _call: &BackendCall) -> Result<(), BackendError> {
        Ok(())
    }
}

#[derive(Resource)]
pub struct BackendResource(pub Box<dyn RideBackend>);

impl BackendResource {
    pub fn new(backend: impl RideBackend + 'static) -> Self {
        Self(Box::new(backend))
    }

    pub fn commit(&mut self, call: &BackendCall) -> Result<(), BackendError> {
        self.0.commit(call)
    }
}

impl Default for BackendResource {
    fn default() -> Self {
        Self::new(SimulatedBackend)
    }
}
