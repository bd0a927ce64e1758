//! Precedence rules between the writers of a verification record.
//!
//! Each function mutates one record in place and reports whether anything
//! changed. They are pure apart from the supplied `now`, so callers can run
//! them under whatever lock guards the record.
//!
//! Authority, lowest first: local report, vendor `completed`, vendor decision
//! or operator simulation. For the same correlation id a lower authority never
//! overwrites a higher one, and re-applying a write the record already
//! reflects is a no-op (timestamps included).

use kycgate_types::{CorrelationId, KycStatus, RecordSource, Timestamp, VerificationRecord};

use crate::event::EventPayload;

/// Kind of vendor-authoritative outcome carried by a webhook.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VendorOutcome {
    /// `inquiry.completed`: the user finished the flow.
    Completed,
    /// `inquiry.decisionMade`: the vendor (or its reviewers) decided.
    Decision,
}

impl VendorOutcome {
    pub fn source(&self) -> RecordSource {
        match self {
            Self::Completed => RecordSource::VendorCompleted,
            Self::Decision => RecordSource::VendorDecision,
        }
    }
}

/// Result of applying a local completion report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocalOutcome {
    /// A new session replaced whatever the record held.
    Started,
    /// Same session, provisional status updated.
    Updated,
    /// Same session, same status: nothing to do.
    Unchanged,
    /// The vendor or an operator already decided this session.
    Stale,
}

impl LocalOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, Self::Started | Self::Updated)
    }
}

/// Apply a client-reported session outcome.
///
/// A correlation id that differs from the live one starts a new session and
/// supersedes the old id, clearing any decision reason.
pub fn apply_local(
    record: &mut VerificationRecord,
    correlation_id: &CorrelationId,
    status: KycStatus,
    now: Timestamp,
) -> LocalOutcome {
    if !record.is_live(correlation_id) {
        *record = VerificationRecord {
            status,
            correlation_id: Some(correlation_id.clone()),
            completed_at: Some(now),
            decision_reason: None,
            source: RecordSource::Local,
            applied_events: Vec::new(),
        };
        return LocalOutcome::Started;
    }

    if record.source > RecordSource::Local {
        return LocalOutcome::Stale;
    }
    if record.status == status {
        return LocalOutcome::Unchanged;
    }

    record.status = status;
    record.completed_at = Some(now);
    record.source = RecordSource::Local;
    LocalOutcome::Updated
}

/// Apply a vendor outcome to a record whose live correlation id matches.
///
/// Returns `true` if the record changed. The caller is responsible for the
/// correlation id match. An event whose id the record has already applied is
/// skipped, so a late redelivery of an older decision never replaces a newer
/// one.
pub fn apply_vendor(
    record: &mut VerificationRecord,
    outcome: VendorOutcome,
    payload: &EventPayload,
    now: Timestamp,
) -> bool {
    if let Some(event_id) = &payload.event_id {
        if record.has_applied(event_id) {
            return false;
        }
        record.note_applied(event_id);
    }
    match outcome {
        VendorOutcome::Completed => {
            // A late `completed` never downgrades a decision.
            if record.source.is_authoritative() {
                return false;
            }
            if record.source == RecordSource::VendorCompleted && record.status == payload.status {
                return false;
            }
            record.status = payload.status;
            record.completed_at = Some(now);
            record.source = RecordSource::VendorCompleted;
            true
        }
        VendorOutcome::Decision => {
            if record.source == RecordSource::VendorDecision
                && record.status == payload.status
                && record.decision_reason == payload.decision_reason
            {
                return false;
            }
            if record.status != payload.status {
                record.completed_at = Some(now);
            }
            record.status = payload.status;
            record.decision_reason = payload.decision_reason.clone();
            record.source = RecordSource::VendorDecision;
            true
        }
    }
}

/// Apply an operator-simulated decision, keeping the live correlation id.
pub fn apply_simulation(record: &mut VerificationRecord, status: KycStatus, now: Timestamp) {
    record.status = status;
    record.completed_at = Some(now);
    record.decision_reason = Some(format!("Simulated {status} decision"));
    record.source = RecordSource::Simulated;
}
