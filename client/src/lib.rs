//! HTTP client for the verification API.
//!
//! [`ApiClient`] is what a marketplace front end uses to read and report
//! verification status. It also implements [`kycgate_session::StatusReporter`],
//! so a [`kycgate_session::SessionDriver`] can report completed sessions over
//! HTTP.

pub mod client;
pub mod error;

pub use client::{ApiClient, DEFAULT_POLL_INTERVAL};
pub use error::ClientError;
