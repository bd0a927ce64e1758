//! The status query / update / reconciliation service.

use std::sync::Arc;

use tracing::{debug, info, warn};

use kycgate_store::StatusStore;
use kycgate_types::{
    Clock, CorrelationId, KycError, KycStatus, Role, Timestamp, UserId, VerificationRecord,
};

use crate::early::EarlyEvents;
use crate::event::WebhookEvent;
use crate::feed::{ChangeCause, StatusChange, StatusFeed};
use crate::reconcile::{self, LocalOutcome};

/// What a webhook event did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Records whose live correlation id matched the event.
    pub matched: Vec<(UserId, Role)>,
    /// Subset of `matched` that actually changed.
    pub changed: Vec<(UserId, Role)>,
    /// The event type is not one this service acts on.
    pub ignored: bool,
}

impl ReconcileReport {
    /// Whether the event left every record unchanged.
    pub fn is_noop(&self) -> bool {
        self.changed.is_empty()
    }
}

/// Single entry point for reading and mutating verification state.
///
/// Every read-modify-write runs inside [`StatusStore::update`], so writes to
/// the same user are serialized and none is lost.
#[derive(Clone)]
pub struct KycService {
    store: Arc<dyn StatusStore>,
    clock: Arc<dyn Clock>,
    early: Arc<EarlyEvents>,
    feed: StatusFeed,
}

impl KycService {
    pub fn new(store: Arc<dyn StatusStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            early: Arc::new(EarlyEvents::default()),
            feed: StatusFeed::default(),
        }
    }

    /// Publish changes on `feed` instead of a private one.
    pub fn with_feed(mut self, feed: StatusFeed) -> Self {
        self.feed = feed;
        self
    }

    pub fn feed(&self) -> &StatusFeed {
        &self.feed
    }

    /// Current time on the service clock.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Current record for `(user, role)`. No side effects.
    pub fn get_status(&self, user: &UserId, role: Role) -> Result<VerificationRecord, KycError> {
        Ok(self.store.get(user, role)?)
    }

    /// Record a client-reported session outcome.
    ///
    /// The vendor status string is normalized here; an empty correlation id or
    /// an unrecognized status is a validation error and changes nothing. The
    /// report is provisional: once the vendor has decided the same session,
    /// the report is accepted but ignored.
    pub fn complete_local(
        &self,
        user: &UserId,
        role: Role,
        correlation_id: &str,
        status: &str,
    ) -> Result<LocalOutcome, KycError> {
        let correlation_id = CorrelationId::new(correlation_id)?;
        let status = KycStatus::normalize(status)?;
        let now = self.clock.now();

        let mut outcome = LocalOutcome::Unchanged;
        let mut reconciled = false;
        let state = self.store.update(user, &mut |state| {
            let record = state.record_mut(role);
            outcome = reconcile::apply_local(record, &correlation_id, status, now);
            if outcome != LocalOutcome::Started {
                return;
            }
            let Some(early) = self.early.take(&correlation_id) else {
                return;
            };
            let foreign = early
                .payload
                .reference_id
                .as_ref()
                .is_some_and(|owner| owner != user);
            if foreign {
                self.early.restore(early);
                return;
            }
            reconciled = reconcile::apply_vendor(record, early.outcome, &early.payload, now);
            for event_id in &early.seen {
                record.note_applied(event_id);
            }
        })?;

        let record = state.record(role);
        info!(
            user = %user,
            role = %role,
            correlation_id = %correlation_id,
            reported = %status,
            stored = %record.status,
            ?outcome,
            reconciled,
            "local verification completion"
        );

        if outcome.changed() || reconciled {
            self.feed.publish(StatusChange::from_record(
                user,
                role,
                record,
                ChangeCause::LocalCompletion,
                now,
            ));
        }
        Ok(outcome)
    }

    /// Impose an operator decision. Must only be reachable in non-production
    /// deployments; gating is the caller's job.
    pub fn simulate_decision(
        &self,
        user: &UserId,
        role: Role,
        status: &str,
    ) -> Result<VerificationRecord, KycError> {
        let status = KycStatus::normalize(status)?;
        if !status.is_decision() {
            return Err(KycError::Validation(format!(
                "cannot simulate a {status} decision, expected approved, declined or referred"
            )));
        }
        let now = self.clock.now();

        let state = self.store.update(user, &mut |state| {
            reconcile::apply_simulation(state.record_mut(role), status, now);
        })?;
        let record = state.record(role).clone();

        info!(user = %user, role = %role, status = %status, "simulated verification decision");
        self.feed.publish(StatusChange::from_record(
            user,
            role,
            &record,
            ChangeCause::Simulation,
            now,
        ));
        Ok(record)
    }

    /// Apply an authenticated vendor webhook event.
    ///
    /// Matches every (user, role) whose live correlation id equals the
    /// event's. Matching nothing is not an error. Unknown event types are
    /// acknowledged and ignored. Applying the same event twice leaves the same
    /// state as applying it once.
    pub fn apply_webhook(&self, event: &WebhookEvent) -> Result<ReconcileReport, KycError> {
        let (outcome, payload) = match event {
            WebhookEvent::Unknown { event_type, id } => {
                debug!(event_type = %event_type, event_id = ?id, "ignoring unhandled webhook event type");
                return Ok(ReconcileReport {
                    ignored: true,
                    ..Default::default()
                });
            }
            WebhookEvent::Vendor {
                outcome, payload, ..
            } => (*outcome, payload),
        };

        // Remember first: a local report racing with this scan either is seen
        // by the scan or finds the outcome here.
        self.early.remember(outcome, payload);

        let users = match &payload.reference_id {
            Some(user) => vec![user.clone()],
            None => self.store.users()?,
        };

        let now = self.clock.now();
        let mut report = ReconcileReport::default();
        for user in users {
            let mut matched = Vec::new();
            let mut changed = Vec::new();
            let state = self.store.update(&user, &mut |state| {
                for role in state.roles_matching(&payload.correlation_id) {
                    matched.push(role);
                    if reconcile::apply_vendor(state.record_mut(role), outcome, payload, now) {
                        changed.push(role);
                    }
                }
            })?;

            for role in &changed {
                self.feed.publish(StatusChange::from_record(
                    &user,
                    *role,
                    state.record(*role),
                    ChangeCause::Webhook,
                    now,
                ));
            }
            report
                .matched
                .extend(matched.into_iter().map(|role| (user.clone(), role)));
            report
                .changed
                .extend(changed.into_iter().map(|role| (user.clone(), role)));
        }

        if report.matched.is_empty() {
            warn!(
                correlation_id = %payload.correlation_id,
                event_id = ?event.event_id(),
                "webhook matched no verification record"
            );
        } else {
            // Reached a live session, so it is no longer early.
            self.early.take(&payload.correlation_id);
            info!(
                correlation_id = %payload.correlation_id,
                event_id = ?event.event_id(),
                ?outcome,
                status = %payload.status,
                matched = report.matched.len(),
                changed = report.changed.len(),
                "webhook reconciled"
            );
        }
        Ok(report)
    }
}
