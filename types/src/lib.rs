//! Fundamental types for kycgate.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! user identities, roles, the canonical status enumeration, verification records,
//! timestamps and the shared error taxonomy.

pub mod error;
pub mod gate;
pub mod record;
pub mod status;
pub mod time;
pub mod user;

pub use error::KycError;
pub use gate::Gate;
pub use record::{
    CorrelationId, RecordSource, UserVerificationState, VerificationRecord, MAX_APPLIED_EVENTS,
};
pub use status::KycStatus;
pub use time::{Clock, SystemClock, Timestamp};
pub use user::{Role, UserId, DEMO_USER, MAX_USER_ID_LEN};
