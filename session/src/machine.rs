//! Per-session state machine.

use crate::{SessionError, SessionEvent, SessionOutcome};

/// Where a session is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionPhase {
    #[default]
    Idle,
    Started,
    Loaded,
    Ready,
    Completed,
    Cancelled,
    Failed,
}

impl SessionPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Started | Self::Loaded | Self::Ready)
    }
}

/// Tracks one session and rejects callbacks that violate their cardinality.
#[derive(Clone, Debug, Default)]
pub struct Session {
    phase: SessionPhase,
    loaded: bool,
    ready: bool,
    recoverable_errors: u32,
    informational: u32,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn recoverable_errors(&self) -> u32 {
        self.recoverable_errors
    }

    pub fn informational_events(&self) -> u32 {
        self.informational
    }

    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Idle {
            return Err(SessionError::AlreadyStarted);
        }
        self.phase = SessionPhase::Started;
        Ok(())
    }

    /// End an active session as failed without a widget callback, e.g. on
    /// timeout. Returns `None` if the session already ended.
    pub fn abort(&mut self, message: impl Into<String>) -> Option<SessionOutcome> {
        if !self.phase.is_active() {
            return None;
        }
        self.phase = SessionPhase::Failed;
        Some(SessionOutcome::Failed {
            message: message.into(),
        })
    }

    /// Apply one widget event. Returns the outcome when the event ends the
    /// session.
    pub fn handle(&mut self, event: SessionEvent) -> Result<Option<SessionOutcome>, SessionError> {
        if self.phase == SessionPhase::Idle {
            return Err(SessionError::NotStarted);
        }
        if let SessionEvent::Event { .. } = event {
            self.informational += 1;
            return Ok(None);
        }
        if self.phase.is_terminal() {
            return Err(SessionError::AlreadyTerminated(event.name()));
        }

        match event {
            SessionEvent::Load => {
                if self.loaded {
                    return Err(SessionError::DuplicateEvent("load"));
                }
                self.loaded = true;
                if self.phase == SessionPhase::Started {
                    self.phase = SessionPhase::Loaded;
                }
                Ok(None)
            }
            SessionEvent::Ready => {
                if self.ready {
                    return Err(SessionError::DuplicateEvent("ready"));
                }
                self.ready = true;
                self.phase = SessionPhase::Ready;
                Ok(None)
            }
            SessionEvent::Complete {
                correlation_id,
                status,
                fields,
            } => {
                self.phase = SessionPhase::Completed;
                Ok(Some(SessionOutcome::Completed {
                    correlation_id,
                    status,
                    fields,
                }))
            }
            SessionEvent::Cancel => {
                self.phase = SessionPhase::Cancelled;
                Ok(Some(SessionOutcome::Cancelled))
            }
            SessionEvent::Error { message, fatal } => {
                if fatal {
                    self.phase = SessionPhase::Failed;
                    Ok(Some(SessionOutcome::Failed { message }))
                } else {
                    self.recoverable_errors += 1;
                    Ok(None)
                }
            }
            SessionEvent::Event { .. } => Ok(None),
        }
    }
}
