//! The canonical verification status enumeration.
//!
//! Vendor sessions and webhooks report free-form status strings, and different
//! callers have used "completed" and "approved" interchangeably. Every such
//! string is normalized into [`KycStatus`] once, at the boundary, so business
//! logic only ever compares canonical values.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::KycError;

/// Verification status of a single (user, role) record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KycStatus {
    /// No session has ever been reported for this record.
    #[default]
    Unset,
    /// A session started but no outcome is known yet.
    Pending,
    /// Identity verified.
    Approved,
    /// Sent to manual review.
    Referred,
    /// Identity verification failed.
    Declined,
}

impl KycStatus {
    /// Normalize a vendor-reported status string into the canonical enumeration.
    ///
    /// Matching is case-insensitive and treats `-`, `_` and spaces alike.
    /// `unset` is never a valid input: it only describes the absence of a report.
    pub fn normalize(raw: &str) -> Result<Self, KycError> {
        let key: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                other => other.to_ascii_lowercase(),
            })
            .collect();

        match key.as_str() {
            "created" | "started" | "pending" | "initiated" => Ok(Self::Pending),
            "completed" | "approved" | "passed" => Ok(Self::Approved),
            "referred" | "needs_review" | "marked_for_review" => Ok(Self::Referred),
            "declined" | "failed" | "rejected" => Ok(Self::Declined),
            _ => Err(KycError::Validation(format!(
                "unrecognized status: {raw:?}"
            ))),
        }
    }

    /// Statuses an operator may impose through a simulated decision.
    pub fn is_decision(&self) -> bool {
        matches!(self, Self::Approved | Self::Referred | Self::Declined)
    }

    /// `None` for [`KycStatus::Unset`], the status otherwise.
    pub fn reported(&self) -> Option<Self> {
        match self {
            Self::Unset => None,
            other => Some(*other),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Referred => "referred",
            Self::Declined => "declined",
        }
    }
}

impl fmt::Display for KycStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
