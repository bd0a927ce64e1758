//! Verification session adapter.
//!
//! The vendor widget is a black box observed only through its lifecycle
//! callbacks. This crate turns those callbacks into a tagged event stream
//! ([`SessionEvent`]), enforces their cardinality with an explicit state
//! machine ([`Session`]: idle → started → terminal), and drives one session
//! end to end ([`SessionDriver`]), forwarding a completed session's raw vendor
//! status to a [`StatusReporter`].

pub mod config;
pub mod driver;
pub mod error;
pub mod event;
pub mod machine;
pub mod reporter;
pub mod scripted;

pub use config::{Environment, SessionConfig};
pub use driver::{SessionDriver, SessionHandle, VerificationWidget, DEFAULT_SESSION_TIMEOUT};
pub use error::SessionError;
pub use event::{SessionEvent, SessionOutcome};
pub use machine::{Session, SessionPhase};
pub use reporter::{InProcessReporter, StatusReporter};
pub use scripted::ScriptedWidget;
