//! Drives one verification session from start to terminal outcome.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use kycgate_types::Role;

use crate::{Session, SessionConfig, SessionError, SessionEvent, SessionOutcome, StatusReporter};

/// Sessions that produce no terminal event within this window fail.
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// An opened session: the widget's callbacks arrive on `events`.
pub struct SessionHandle {
    pub events: mpsc::Receiver<SessionEvent>,
}

/// The vendor-owned widget, seen from the application.
pub trait VerificationWidget {
    /// Open a session (modal or embedded).
    fn start(&mut self, config: &SessionConfig) -> Result<SessionHandle, SessionError>;
}

/// Runs sessions against a widget and reports completions.
pub struct SessionDriver<W, R> {
    widget: W,
    reporter: R,
    timeout: Duration,
}

impl<W, R> SessionDriver<W, R>
where
    W: VerificationWidget,
    R: StatusReporter,
{
    pub fn new(widget: W, reporter: R) -> Self {
        Self {
            widget,
            reporter,
            timeout: DEFAULT_SESSION_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    /// Run one session for `role` until it ends.
    ///
    /// Timeout and a widget that goes away without a terminal event both end
    /// the session as failed. Out-of-contract callbacks (a second `load`,
    /// anything after the end) are logged and ignored. On completion the raw
    /// vendor status is reported before returning.
    pub async fn run(
        &mut self,
        role: Role,
        config: &SessionConfig,
    ) -> Result<SessionOutcome, SessionError> {
        let mut session = Session::new();
        session.start()?;
        let mut handle = self.widget.start(config)?;
        info!(
            role = %role,
            template_id = %config.template_id,
            environment = %config.environment,
            "verification session started"
        );

        let deadline = Instant::now() + self.timeout;
        let outcome = loop {
            let event = match tokio::time::timeout_at(deadline, handle.events.recv()).await {
                Ok(Some(event)) => event,
                Ok(None) => break failed(&mut session, "verification widget closed unexpectedly"),
                Err(_) => break failed(&mut session, "verification session timed out"),
            };
            debug!(role = %role, event = event.name(), "verification widget event");
            match session.handle(event) {
                Ok(Some(outcome)) => break outcome,
                Ok(None) => {}
                Err(e) => warn!(role = %role, error = %e, "ignoring out-of-contract widget event"),
            }
        };

        match &outcome {
            SessionOutcome::Completed {
                correlation_id,
                status,
                ..
            } => {
                info!(role = %role, correlation_id = %correlation_id, status = %status, "verification session completed");
                self.reporter
                    .complete_local(role, correlation_id, status)
                    .await?;
            }
            SessionOutcome::Cancelled => info!(role = %role, "verification session cancelled"),
            SessionOutcome::Failed { message } => {
                warn!(role = %role, error = %message, "verification session failed")
            }
        }
        Ok(outcome)
    }
}

fn failed(session: &mut Session, message: &str) -> SessionOutcome {
    session.abort(message).unwrap_or_else(|| SessionOutcome::Failed {
        message: message.to_string(),
    })
}
