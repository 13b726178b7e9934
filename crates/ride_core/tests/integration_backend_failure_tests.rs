mod support;

use std::sync::atomic::{AtomicBool, Ordering};

use ride_core::backend::BackendCall;
use ride_core::ecs::RideStatus;
use ride_core::lifecycle::{DriverAction, DriverPhase};
use ride_core::test_helpers::ScriptedBackend;

use support::surfaces::{on_ride, online_with_request, DashboardBuilder};

#[test]
fn failed_go_online_leaves_driver_offline() {
    let (backend, log) = ScriptedBackend::failing_when(|call| *call == BackendCall::GoOnline);
    let mut dashboard = DashboardBuilder::new().with_backend(backend).build();

    dashboard.go_online().expect("go online");
    dashboard.advance_by(1500);

    assert_eq!(dashboard.phase(), DriverPhase::Offline);
    assert!(!dashboard.is_busy());
    let failure = dashboard.last_failure().expect("failure recorded");
    assert_eq!(failure.action, DriverAction::GoOnline);
    assert_eq!(failure.at, 1500);
    assert_eq!(dashboard.telemetry().backend_failures, 1);
    assert_eq!(log.calls(), vec![BackendCall::GoOnline]);

    // No request timer was armed.
    assert_eq!(dashboard.run_until_idle(), 0);
    assert_eq!(dashboard.enabled_actions(), vec![DriverAction::GoOnline]);
}

#[test]
fn failed_accept_keeps_request_pending() {
    let (backend, _log) =
        ScriptedBackend::failing_when(|call| matches!(call, BackendCall::AcceptRide(_)));
    let mut dashboard = DashboardBuilder::new().with_backend(backend).build();
    let id = online_with_request(&mut dashboard);

    dashboard.accept_ride(&id).expect("accept");
    dashboard.advance_by(2000);

    assert_eq!(dashboard.phase(), DriverPhase::RequestPending);
    assert_eq!(dashboard.pending_requests()[0].id, id);
    assert!(dashboard.current_ride().is_none());
    assert_eq!(
        dashboard.last_failure().map(|f| f.action),
        Some(DriverAction::AcceptRide)
    );
    // The driver can act on the request again.
    assert_eq!(
        dashboard.enabled_actions(),
        vec![
            DriverAction::GoOffline,
            DriverAction::AcceptRide,
            DriverAction::RejectRide
        ]
    );
}

#[test]
fn completion_retry_succeeds_after_one_failure() {
    let failed_once = AtomicBool::new(false);
    let (backend, log) = ScriptedBackend::failing_when(move |call| {
        matches!(call, BackendCall::CompleteRide(_)) && !failed_once.swap(true, Ordering::SeqCst)
    });
    let mut dashboard = DashboardBuilder::new().with_backend(backend).build();
    on_ride(&mut dashboard);
    for _ in 0..2 {
        dashboard.advance_status().expect("advance");
        dashboard.run_until_idle();
    }

    dashboard.complete_ride().expect("complete");
    dashboard.advance_by(2000);
    assert_eq!(dashboard.ride_status(), Some(RideStatus::InProgress));
    assert_eq!(dashboard.today_earnings(), 0);
    assert_eq!(dashboard.completed_rides(), 0);

    dashboard.complete_ride().expect("retry");
    dashboard.advance_by(2000);
    assert_eq!(dashboard.today_earnings(), 210);
    assert_eq!(dashboard.phase(), DriverPhase::OnlineIdle);
    assert_eq!(dashboard.telemetry().backend_failures, 1);

    let completes = log
        .calls()
        .into_iter()
        .filter(|call| matches!(call, BackendCall::CompleteRide(_)))
        .count();
    assert_eq!(completes, 2);
}

#[test]
fn each_committed_action_reaches_the_backend_once() {
    let (backend, log) = ScriptedBackend::recording();
    let mut dashboard = DashboardBuilder::new().with_backend(backend).build();
    let id = on_ride(&mut dashboard);
    dashboard.advance_status().expect("advance");
    dashboard.run_until_idle();

    assert_eq!(
        log.calls(),
        vec![
            BackendCall::GoOnline,
            BackendCall::AcceptRide(id.clone()),
            BackendCall::UpdateStatus {
                ride: id,
                status: RideStatus::Arrived,
            },
        ]
    );
}
