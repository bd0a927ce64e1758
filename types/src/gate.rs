//! Purchase / onboarding gating derived from a verification status.

use serde::Serialize;

use crate::KycStatus;

/// What a gated action (checkout, finishing seller setup) should do for a
/// given verification status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Gate {
    /// Verified; the action is enabled.
    Allowed,
    /// Manual review in progress.
    UnderReview,
    /// Verification was declined.
    Blocked,
    /// No usable outcome yet; a verification session must be started.
    VerificationRequired,
}

impl Gate {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// User-facing message shown next to the gated action.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Allowed => "Verified ✓",
            Self::UnderReview => "Under review",
            Self::Blocked => "Verification declined",
            Self::VerificationRequired => "Verification required",
        }
    }
}

impl KycStatus {
    pub fn gate(&self) -> Gate {
        match self {
            Self::Approved => Gate::Allowed,
            Self::Referred => Gate::UnderReview,
            Self::Declined => Gate::Blocked,
            Self::Unset | Self::Pending => Gate::VerificationRequired,
        }
    }
}
