//! Lifecycle events emitted by the vendor widget.

use serde::{Deserialize, Serialize};

/// One widget callback, as a tagged event.
///
/// Cardinality per session: `Load` and `Ready` at most once; exactly one of
/// `Complete`, `Cancel` or a fatal `Error` ends the session; non-fatal `Error`
/// may recur; `Event` any number of times, at any time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Widget resources loaded.
    Load,
    /// Widget is interactive.
    Ready,
    /// The user finished the flow.
    ///
    /// `status` is an opaque vendor string; it does not imply approval.
    Complete {
        correlation_id: String,
        status: String,
        #[serde(default)]
        fields: serde_json::Map<String, serde_json::Value>,
    },
    /// The user abandoned the flow.
    Cancel,
    Error {
        message: String,
        #[serde(default)]
        fatal: bool,
    },
    /// Informational event.
    Event {
        name: String,
        #[serde(default)]
        metadata: serde_json::Value,
    },
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Ready => "ready",
            Self::Complete { .. } => "complete",
            Self::Cancel => "cancel",
            Self::Error { .. } => "error",
            Self::Event { .. } => "event",
        }
    }

    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Complete { .. } | Self::Cancel => true,
            Self::Error { fatal, .. } => *fatal,
            _ => false,
        }
    }
}

/// How a session ended, from the application's perspective.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionOutcome {
    Completed {
        correlation_id: String,
        status: String,
        fields: serde_json::Map<String, serde_json::Value>,
    },
    Cancelled,
    Failed { message: String },
}

impl SessionOutcome {
    /// Every outcome may be retried with a fresh session.
    pub fn user_message(&self) -> String {
        match self {
            Self::Completed { .. } => "Verification submitted".to_string(),
            Self::Cancelled => "Verification cancelled. You can start again at any time.".to_string(),
            Self::Failed { message } => {
                format!("Verification failed: {message}. Please try again.")
            }
        }
    }
}
