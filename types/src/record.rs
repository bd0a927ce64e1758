//! Verification records: one per (user, role).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{KycError, KycStatus, Role, Timestamp};

/// Opaque identifier issued by the verification vendor for one session attempt.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Rejects empty and whitespace-only identifiers.
    pub fn new(id: impl Into<String>) -> Result<Self, KycError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(KycError::Validation(
                "correlation id must not be empty".into(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CorrelationId {
    type Error = KycError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CorrelationId> for String {
    fn from(id: CorrelationId) -> Self {
        id.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who last decided the status of a record.
///
/// Ordered by authority: a later write from a lower-ranked source never
/// overwrites the status for the same correlation id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    /// Never written.
    #[default]
    None,
    /// Client-reported after a session finished. Provisional.
    Local,
    /// Vendor `inquiry.completed` webhook.
    VendorCompleted,
    /// Vendor decision webhook.
    VendorDecision,
    /// Operator-simulated decision.
    Simulated,
}

impl RecordSource {
    /// Whether the vendor (or an operator standing in for it) has decided.
    pub fn is_authoritative(&self) -> bool {
        matches!(self, Self::VendorDecision | Self::Simulated)
    }
}

/// Vendor event ids remembered per record. Older ids are dropped first.
pub const MAX_APPLIED_EVENTS: usize = 32;

/// Verification state of one (user, role).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRecord {
    pub status: KycStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<CorrelationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision_reason: Option<String>,
    #[serde(default)]
    pub source: RecordSource,
    /// Ids of vendor events already applied to the live session.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applied_events: Vec<String>,
}

impl VerificationRecord {
    /// Whether `id` is the live correlation id of this record.
    pub fn is_live(&self, id: &CorrelationId) -> bool {
        self.correlation_id.as_ref() == Some(id)
    }

    pub fn has_applied(&self, event_id: &str) -> bool {
        self.applied_events.iter().any(|id| id == event_id)
    }

    /// Remember that the vendor event `event_id` was applied.
    pub fn note_applied(&mut self, event_id: &str) {
        if self.has_applied(event_id) {
            return;
        }
        if self.applied_events.len() >= MAX_APPLIED_EVENTS {
            self.applied_events.remove(0);
        }
        self.applied_events.push(event_id.to_string());
    }
}

/// Both records of a single user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserVerificationState {
    pub buyer: VerificationRecord,
    pub seller: VerificationRecord,
}

impl UserVerificationState {
    pub fn record(&self, role: Role) -> &VerificationRecord {
        match role {
            Role::Buyer => &self.buyer,
            Role::Seller => &self.seller,
        }
    }

    pub fn record_mut(&mut self, role: Role) -> &mut VerificationRecord {
        match role {
            Role::Buyer => &mut self.buyer,
            Role::Seller => &mut self.seller,
        }
    }

    /// Roles whose live correlation id equals `id`.
    pub fn roles_matching(&self, id: &CorrelationId) -> Vec<Role> {
        Role::ALL
            .into_iter()
            .filter(|role| self.record(*role).is_live(id))
            .collect()
    }
}
