//! Top-level error type shared across crates.

use thiserror::Error;

/// Common error type for kycgate operations.
///
/// Every variant is per-request and recoverable; none is process-fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KycError {
    /// Malformed input to a status-mutating call. No state was changed.
    #[error("validation error: {0}")]
    Validation(String),

    /// The role parameter was not one of `buyer` / `seller`.
    #[error("invalid role: {0}")]
    InvalidRole(String),

    /// Webhook signature missing or invalid. No state was changed.
    #[error("authentication error: {0}")]
    Authentication(String),

    /// Unexpected fault while processing a request.
    #[error("internal error: {0}")]
    Internal(String),
}
