#![allow(dead_code)]

use ride_core::backend::RideBackend;
use ride_core::booking::BookingSurface;
use ride_core::config::{BookingConfig, DashboardConfig, LatencyConfig, RequestTemplate};
use ride_core::dashboard::DriverDashboard;
use ride_core::ecs::{RideId, RideStatus};
use ride_core::lifecycle::DriverPhase;
use ride_core::session::Session;

use super::fixtures::{rider_session, SEED};

/// Builds a dashboard for the demo driver with a fixed seed.
#[derive(Default)]
pub struct DashboardBuilder {
    latency: Option<LatencyConfig>,
    templates: Option<Vec<RequestTemplate>>,
    backend: Option<Box<dyn FnOnce(DriverDashboard) -> DriverDashboard>>,
}

impl DashboardBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: LatencyConfig) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn with_templates(mut self, templates: Vec<RequestTemplate>) -> Self {
        self.templates = Some(templates);
        self
    }

    pub fn with_backend(mut self, backend: impl RideBackend + 'static) -> Self {
        self.backend = Some(Box::new(move |dashboard| dashboard.with_backend(backend)));
        self
    }

    pub fn build(self) -> DriverDashboard {
        let mut config = DashboardConfig::default().with_seed(SEED);
        if let Some(latency) = self.latency {
            config = config.with_latency(latency);
        }
        if let Some(templates) = self.templates {
            config = config.with_request_templates(templates);
        }
        let dashboard =
            DriverDashboard::open(&Session::driver_demo(), config).expect("driver session");
        match self.backend {
            Some(install) => install(dashboard),
            None => dashboard,
        }
    }
}

/// Go online and wait for the first request to arrive. Returns its id.
pub fn online_with_request(dashboard: &mut DriverDashboard) -> RideId {
    dashboard.go_online().expect("go online");
    let latency = *dashboard.latency();
    dashboard.advance_by(latency.go_online_ms);
    assert_eq!(dashboard.phase(), DriverPhase::OnlineIdle);
    dashboard.advance_by(latency.request_arrival_ms);
    assert_eq!(dashboard.phase(), DriverPhase::RequestPending);
    dashboard.pending_requests()[0].id.clone()
}

/// Take the dashboard from offline to an accepted ride in `Enroute`.
pub fn on_ride(dashboard: &mut DriverDashboard) -> RideId {
    let id = online_with_request(dashboard);
    dashboard.accept_ride(&id).expect("accept");
    let accept_ms = dashboard.latency().accept_ms;
    dashboard.advance_by(accept_ms);
    assert_eq!(dashboard.phase(), DriverPhase::OnRide(RideStatus::Enroute));
    id
}

pub fn booking_surface() -> BookingSurface {
    BookingSurface::open(&rider_session(), BookingConfig::default().with_seed(SEED))
        .expect("booking surface")
}
