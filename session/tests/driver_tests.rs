//! End-to-end session runs against a scripted widget.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use kycgate_nullables::NullClock;
use kycgate_session::{
    InProcessReporter, ScriptedWidget, SessionConfig, SessionDriver, SessionError, SessionEvent,
    SessionOutcome, StatusReporter,
};
use kycgate_store::MemoryStatusStore;
use kycgate_types::{KycStatus, Role, UserId};
use kycgate_verification::KycService;

#[derive(Clone, Default)]
struct RecordingReporter {
    calls: Arc<Mutex<Vec<(Role, String, String)>>>,
    fail: bool,
}

impl StatusReporter for RecordingReporter {
    async fn complete_local(
        &self,
        role: Role,
        correlation_id: &str,
        status: &str,
    ) -> Result<(), SessionError> {
        self.calls
            .lock()
            .unwrap()
            .push((role, correlation_id.to_string(), status.to_string()));
        if self.fail {
            Err(SessionError::Report("server unavailable".into()))
        } else {
            Ok(())
        }
    }
}

fn complete(id: &str, status: &str) -> SessionEvent {
    SessionEvent::Complete {
        correlation_id: id.into(),
        status: status.into(),
        fields: Default::default(),
    }
}

fn config() -> SessionConfig {
    SessionConfig::new("itmpl_buyer").unwrap()
}

#[tokio::test]
async fn completion_reports_raw_vendor_status() {
    let reporter = RecordingReporter::default();
    let widget = ScriptedWidget::new(vec![
        SessionEvent::Load,
        SessionEvent::Ready,
        SessionEvent::Event {
            name: "start".into(),
            metadata: serde_json::Value::Null,
        },
        complete("inq_1", "completed"),
    ]);
    let mut driver = SessionDriver::new(widget, reporter.clone());

    let outcome = driver.run(Role::Buyer, &config()).await.unwrap();
    assert!(matches!(outcome, SessionOutcome::Completed { .. }));
    assert_eq!(
        reporter.calls.lock().unwrap().as_slice(),
        &[(Role::Buyer, "inq_1".to_string(), "completed".to_string())]
    );
    assert_eq!(driver.widget().started(), &[config()]);
}

#[tokio::test]
async fn cancel_reports_nothing() {
    let reporter = RecordingReporter::default();
    let widget = ScriptedWidget::new(vec![SessionEvent::Load, SessionEvent::Cancel]);
    let mut driver = SessionDriver::new(widget, reporter.clone());

    let outcome = driver.run(Role::Seller, &config()).await.unwrap();
    assert_eq!(outcome, SessionOutcome::Cancelled);
    assert!(reporter.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn out_of_contract_events_are_ignored() {
    let reporter = RecordingReporter::default();
    let widget = ScriptedWidget::new(vec![
        SessionEvent::Load,
        SessionEvent::Load,
        SessionEvent::Error {
            message: "camera blocked".into(),
            fatal: false,
        },
        complete("inq_2", "approved"),
        SessionEvent::Cancel,
    ]);
    let mut driver = SessionDriver::new(widget, reporter.clone());

    let outcome = driver.run(Role::Buyer, &config()).await.unwrap();
    assert!(matches!(outcome, SessionOutcome::Completed { ref correlation_id, .. } if correlation_id == "inq_2"));
    assert_eq!(reporter.calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn fatal_error_fails_session() {
    let widget = ScriptedWidget::new(vec![SessionEvent::Error {
        message: "template not found".into(),
        fatal: true,
    }]);
    let mut driver = SessionDriver::new(widget, RecordingReporter::default());
    let outcome = driver.run(Role::Buyer, &config()).await.unwrap();
    assert_eq!(
        outcome,
        SessionOutcome::Failed {
            message: "template not found".into()
        }
    );
}

#[tokio::test]
async fn widget_going_away_fails_session() {
    let widget = ScriptedWidget::new(vec![SessionEvent::Load]);
    let mut driver = SessionDriver::new(widget, RecordingReporter::default());
    let outcome = driver.run(Role::Buyer, &config()).await.unwrap();
    assert!(matches!(outcome, SessionOutcome::Failed { .. }));
}

#[tokio::test(start_paused = true)]
async fn silent_session_times_out() {
    let widget = ScriptedWidget::new(vec![SessionEvent::Load, SessionEvent::Ready]).keep_open();
    let mut driver = SessionDriver::new(widget, RecordingReporter::default())
        .with_timeout(Duration::from_secs(60));
    let outcome = driver.run(Role::Seller, &config()).await.unwrap();
    assert_eq!(
        outcome,
        SessionOutcome::Failed {
            message: "verification session timed out".into()
        }
    );
}

#[tokio::test(start_paused = true)]
async fn slow_but_timely_session_completes() {
    let widget = ScriptedWidget::new(vec![SessionEvent::Load, complete("inq_3", "pending")])
        .with_delay(Duration::from_secs(20));
    let mut driver = SessionDriver::new(widget, RecordingReporter::default())
        .with_timeout(Duration::from_secs(60));
    let outcome = driver.run(Role::Buyer, &config()).await.unwrap();
    assert!(matches!(outcome, SessionOutcome::Completed { .. }));
}

#[tokio::test]
async fn report_failure_surfaces() {
    let reporter = RecordingReporter {
        fail: true,
        ..Default::default()
    };
    let widget = ScriptedWidget::new(vec![complete("inq_4", "approved")]);
    let mut driver = SessionDriver::new(widget, reporter);
    assert!(matches!(
        driver.run(Role::Buyer, &config()).await,
        Err(SessionError::Report(_))
    ));
}

#[tokio::test]
async fn retry_supersedes_previous_session() {
    let service = KycService::new(
        Arc::new(MemoryStatusStore::new()),
        Arc::new(NullClock::new(1_000)),
    );
    let user = UserId::demo();
    let widget = ScriptedWidget::new(vec![SessionEvent::Error {
        message: "network".into(),
        fatal: true,
    }])
    .then(vec![complete("inq_first", "pending")])
    .then(vec![complete("inq_second", "completed")]);
    let mut driver = SessionDriver::new(widget, InProcessReporter::new(service.clone(), user.clone()));

    let first = driver.run(Role::Buyer, &config()).await.unwrap();
    assert!(first.user_message().contains("try again"));
    assert_eq!(
        service.get_status(&user, Role::Buyer).unwrap().status,
        KycStatus::Unset
    );

    driver.run(Role::Buyer, &config()).await.unwrap();
    driver.run(Role::Buyer, &config()).await.unwrap();
    let record = service.get_status(&user, Role::Buyer).unwrap();
    assert_eq!(record.status, KycStatus::Approved);
    assert_eq!(record.correlation_id.unwrap().as_str(), "inq_second");

    // Script exhausted.
    assert!(matches!(
        driver.run(Role::Buyer, &config()).await,
        Err(SessionError::Widget(_))
    ));
}

#[tokio::test]
async fn unrecognized_vendor_status_is_rejected_on_report() {
    let service = KycService::new(
        Arc::new(MemoryStatusStore::new()),
        Arc::new(NullClock::new(0)),
    );
    let widget = ScriptedWidget::new(vec![complete("inq_x", "mystery")]);
    let mut driver = SessionDriver::new(widget, InProcessReporter::new(service.clone(), UserId::demo()));
    assert!(matches!(
        driver.run(Role::Seller, &config()).await,
        Err(SessionError::Report(_))
    ));
    assert_eq!(
        service.get_status(&UserId::demo(), Role::Seller).unwrap().status,
        KycStatus::Unset
    );
}
