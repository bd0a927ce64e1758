//! Where a completed session's outcome is reported.

use std::future::Future;

use kycgate_types::{Role, UserId};
use kycgate_verification::KycService;

use crate::SessionError;

/// Receives the raw vendor outcome of a completed session.
///
/// `status` is passed through verbatim; normalization happens on the
/// receiving side.
pub trait StatusReporter: Send + Sync {
    fn complete_local(
        &self,
        role: Role,
        correlation_id: &str,
        status: &str,
    ) -> impl Future<Output = Result<(), SessionError>> + Send;
}

/// Reports straight into a [`KycService`] in the same process.
#[derive(Clone)]
pub struct InProcessReporter {
    service: KycService,
    user: UserId,
}

impl InProcessReporter {
    pub fn new(service: KycService, user: UserId) -> Self {
        Self { service, user }
    }
}

impl StatusReporter for InProcessReporter {
    async fn complete_local(
        &self,
        role: Role,
        correlation_id: &str,
        status: &str,
    ) -> Result<(), SessionError> {
        self.service
            .complete_local(&self.user, role, correlation_id, status)
            .map(|_| ())
            .map_err(|e| SessionError::Report(e.to_string()))
    }
}
