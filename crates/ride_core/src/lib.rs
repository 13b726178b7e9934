pub mod backend;
pub mod booking;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod ecs;
pub mod error;
pub mod feed;
pub mod lifecycle;
pub mod presentation;
pub mod pricing;
pub mod runner;
pub mod session;
pub mod spatial;
pub mod systems;
pub mod telemetry;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;
