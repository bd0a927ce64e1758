//! Broadcast feed of effective status changes.

use serde::Serialize;
use tokio::sync::broadcast;

use kycgate_types::{CorrelationId, KycStatus, Role, Timestamp, UserId, VerificationRecord};

/// What caused a record to change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeCause {
    LocalCompletion,
    Webhook,
    Simulation,
}

/// One record after an effective change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub user: UserId,
    pub role: Role,
    pub status: KycStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<CorrelationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision_reason: Option<String>,
    pub cause: ChangeCause,
    pub at: Timestamp,
}

impl StatusChange {
    pub fn from_record(
        user: &UserId,
        role: Role,
        record: &VerificationRecord,
        cause: ChangeCause,
        at: Timestamp,
    ) -> Self {
        Self {
            user: user.clone(),
            role,
            status: record.status,
            correlation_id: record.correlation_id.clone(),
            decision_reason: record.decision_reason.clone(),
            cause,
            at,
        }
    }
}

/// Fan-out of [`StatusChange`]s to any number of subscribers.
///
/// Publishing never blocks; slow subscribers observe a lag error and skip.
#[derive(Clone)]
pub struct StatusFeed {
    tx: broadcast::Sender<StatusChange>,
}

impl StatusFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusChange> {
        self.tx.subscribe()
    }

    pub fn publish(&self, change: StatusChange) {
        // No subscribers is fine.
        let _ = self.tx.send(change);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for StatusFeed {
    fn default() -> Self {
        Self::new(256)
    }
}
