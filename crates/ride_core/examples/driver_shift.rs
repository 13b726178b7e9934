//! Walk the demo driver through one shift: online, one ride, completion.
//!
//! Run with: cargo run -p ride_core --example driver_shift
//! Set RUST_LOG=debug to see scheduling and cancellation.

use ride_core::clock::ONE_SEC_MS;
use ride_core::config::DashboardConfig;
use ride_core::dashboard::DriverDashboard;
use ride_core::ecs::RideStatus;
use ride_core::error::RideError;
use ride_core::session::Session;
use tracing_subscriber::EnvFilter;

fn print_state(dashboard: &DriverDashboard) {
    let badge = dashboard
        .status_badge()
        .map(|badge| format!("  [{}]", badge.label))
        .unwrap_or_default();
    let next = dashboard
        .next_action()
        .map(|action| format!("  next: {}", action.label))
        .unwrap_or_default();
    println!(
        "t={:>5.1}s  {:<8} {:?}{badge}{next}",
        dashboard.now() as f64 / ONE_SEC_MS as f64,
        dashboard.availability_label(),
        dashboard.phase(),
    );
}

fn main() -> Result<(), RideError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let session = Session::driver_demo();
    let mut dashboard = DriverDashboard::open(&session, DashboardConfig::default().with_seed(7))?;
    println!("--- Driver shift ({}) ---", session.display_name);
    print_state(&dashboard);

    if let Err(err) = dashboard.go_online() {
        println!("go online refused: {err}");
    }
    let latency = *dashboard.latency();
    dashboard.advance_by(latency.go_online_ms);
    print_state(&dashboard);

    dashboard.advance_by(latency.request_arrival_ms);
    let Some(request) = dashboard.pending_requests().into_iter().next() else {
        println!("no request arrived");
        return Ok(());
    };
    println!(
        "request {}: {} ({:.1}*) {} -> {}, {}, fare {}, pickup in {} min",
        request.id,
        request.rider.name,
        request.rider.rating,
        request.pickup,
        request.dropoff,
        request.distance,
        request.fare,
        request.eta_mins,
    );
    print_state(&dashboard);

    if let Err(err) = dashboard.accept_ride(&request.id) {
        println!("accept refused: {err}");
    }
    dashboard.advance_by(latency.accept_ms);
    print_state(&dashboard);

    while dashboard.next_action().is_some() {
        let (result, wait_ms) = match dashboard.ride_status() {
            Some(RideStatus::InProgress) => (dashboard.complete_ride(), latency.complete_ms),
            _ => (dashboard.advance_status(), latency.status_update_ms),
        };
        if let Err(err) = result {
            println!("action refused: {err}");
            break;
        }
        dashboard.advance_by(wait_ms);
        print_state(&dashboard);
    }

    println!(
        "\ntoday: {} earned over {} ride(s)",
        dashboard.today_earnings(),
        dashboard.completed_rides()
    );
    for record in &dashboard.telemetry().completed_rides {
        println!(
            "  {}  fare={}  time_to_pickup={} s  ride_duration={} s",
            record.ride_id,
            record.fare,
            record.time_to_pickup() / ONE_SEC_MS,
            record.ride_duration() / ONE_SEC_MS,
        );
    }
    Ok(())
}
