//! Vendor webhook events.
//!
//! Wire shape:
//!
//! ```json
//! {
//!   "type": "inquiry.decision_made",
//!   "id": "evt_123",
//!   "data": {
//!     "inquiryId": "inq_abc",
//!     "status": "declined",
//!     "decisionReason": "document mismatch",
//!     "referenceId": "demo-user"
//!   }
//! }
//! ```
//!
//! `eventType` is accepted for `type`, `correlationId` for `inquiryId`.
//! Unknown event types are parsed without looking at `data`.

use serde::Deserialize;

use kycgate_types::{CorrelationId, KycError, KycStatus, UserId};

use crate::reconcile::VendorOutcome;

pub const INQUIRY_COMPLETED: &str = "inquiry.completed";
pub const INQUIRY_DECISION_MADE: &str = "inquiry.decisionMade";
const INQUIRY_DECISION_MADE_SNAKE: &str = "inquiry.decision_made";

/// The part of a known event that reconciliation acts on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventPayload {
    pub correlation_id: CorrelationId,
    pub status: KycStatus,
    pub decision_reason: Option<String>,
    /// User the session was started for, when the vendor echoes it back.
    pub reference_id: Option<UserId>,
    /// Delivery id of the event. Redeliveries carry the same id.
    pub event_id: Option<String>,
}

/// A parsed webhook event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WebhookEvent {
    Vendor {
        outcome: VendorOutcome,
        payload: EventPayload,
    },
    /// Acknowledged and otherwise ignored.
    Unknown {
        id: Option<String>,
        event_type: String,
    },
}

#[derive(Deserialize)]
struct RawEvent {
    #[serde(rename = "type", alias = "eventType")]
    event_type: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPayload {
    #[serde(alias = "correlationId")]
    inquiry_id: String,
    status: String,
    #[serde(default)]
    decision_reason: Option<String>,
    #[serde(default)]
    reference_id: Option<String>,
}

impl WebhookEvent {
    /// Parse an authenticated request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, KycError> {
        let raw: RawEvent = serde_json::from_slice(body)
            .map_err(|e| KycError::Validation(format!("malformed webhook event: {e}")))?;

        let outcome = match raw.event_type.as_str() {
            INQUIRY_COMPLETED => VendorOutcome::Completed,
            INQUIRY_DECISION_MADE | INQUIRY_DECISION_MADE_SNAKE => VendorOutcome::Decision,
            _ => {
                return Ok(Self::Unknown {
                    id: raw.id,
                    event_type: raw.event_type,
                })
            }
        };

        let data: RawPayload = serde_json::from_value(raw.data).map_err(|e| {
            KycError::Validation(format!("malformed {} payload: {e}", raw.event_type))
        })?;

        let reference_id = match data.reference_id {
            Some(id) if !id.trim().is_empty() => Some(UserId::new(id)?),
            _ => None,
        };

        Ok(Self::Vendor {
            outcome,
            payload: EventPayload {
                correlation_id: CorrelationId::new(data.inquiry_id)?,
                status: KycStatus::normalize(&data.status)?,
                decision_reason: data.decision_reason,
                reference_id,
                event_id: raw.id,
            },
        })
    }

    pub fn event_id(&self) -> Option<&str> {
        match self {
            Self::Vendor { payload, .. } => payload.event_id.as_deref(),
            Self::Unknown { id, .. } => id.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decision_with_both_spellings() {
        for event_type in ["inquiry.decision_made", "inquiry.decisionMade"] {
            let body = format!(
                r#"{{"type":"{event_type}","data":{{"inquiryId":"abc123","status":"declined","decisionReason":"mismatch"}}}}"#
            );
            let event = WebhookEvent::from_slice(body.as_bytes()).unwrap();
            let WebhookEvent::Vendor { outcome, payload, .. } = event else {
                panic!("expected vendor event");
            };
            assert_eq!(outcome, VendorOutcome::Decision);
            assert_eq!(payload.correlation_id.as_str(), "abc123");
            assert_eq!(payload.status, KycStatus::Declined);
            assert_eq!(payload.decision_reason.as_deref(), Some("mismatch"));
            assert!(payload.reference_id.is_none());
        }
    }

    #[test]
    fn accepts_field_aliases() {
        let body = br#"{"eventType":"inquiry.completed","id":"evt_9","data":{"correlationId":"inq_1","status":"completed","referenceId":"alice"}}"#;
        let event = WebhookEvent::from_slice(body).unwrap();
        assert_eq!(event.event_id(), Some("evt_9"));
        let WebhookEvent::Vendor { outcome, payload, .. } = event else {
            panic!("expected vendor event");
        };
        assert_eq!(outcome, VendorOutcome::Completed);
        assert_eq!(payload.status, KycStatus::Approved);
        assert_eq!(payload.reference_id, Some(UserId::new("alice").unwrap()));
    }

    #[test]
    fn unknown_types_skip_payload() {
        let body = br#"{"type":"inquiry.expired","data":"not an object"}"#;
        assert_eq!(
            WebhookEvent::from_slice(body).unwrap(),
            WebhookEvent::Unknown {
                id: None,
                event_type: "inquiry.expired".into()
            }
        );
    }

    #[test]
    fn rejects_malformed_bodies() {
        assert!(matches!(
            WebhookEvent::from_slice(b"not json"),
            Err(KycError::Validation(_))
        ));
        assert!(matches!(
            WebhookEvent::from_slice(br#"{"type":"inquiry.completed","data":{"status":"approved"}}"#),
            Err(KycError::Validation(_))
        ));
        assert!(matches!(
            WebhookEvent::from_slice(
                br#"{"type":"inquiry.completed","data":{"inquiryId":"","status":"approved"}}"#
            ),
            Err(KycError::Validation(_))
        ));
        assert!(matches!(
            WebhookEvent::from_slice(
                br#"{"type":"inquiry.completed","data":{"inquiryId":"x","status":"weird"}}"#
            ),
            Err(KycError::Validation(_))
        ));
    }

    #[test]
    fn blank_reference_id_is_ignored() {
        let body = br#"{"type":"inquiry.completed","data":{"inquiryId":"x","status":"approved","referenceId":" "}}"#;
        let WebhookEvent::Vendor { payload, .. } = WebhookEvent::from_slice(body).unwrap() else {
            panic!("expected vendor event");
        };
        assert!(payload.reference_id.is_none());
    }
}
