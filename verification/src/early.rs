//! Vendor outcomes that arrived before any record carried their correlation id.
//!
//! The vendor can deliver a webhook before the client has reported the local
//! completion that introduces the correlation id. Such an event matches no
//! record and leaves every record unchanged, but its outcome is remembered here
//! so the local report can be reconciled against it as soon as it arrives.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use kycgate_types::{CorrelationId, MAX_APPLIED_EVENTS};

use crate::event::EventPayload;
use crate::reconcile::VendorOutcome;

/// Default number of correlation ids remembered.
pub const DEFAULT_EARLY_EVENT_CAPACITY: usize = 1024;

/// The strongest outcome seen for one correlation id, plus the ids of every
/// delivery folded into it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EarlyEvent {
    pub outcome: VendorOutcome,
    pub payload: EventPayload,
    pub seen: Vec<String>,
}

impl EarlyEvent {
    fn note_seen(&mut self, event_id: String) {
        if self.seen.contains(&event_id) {
            return;
        }
        if self.seen.len() >= MAX_APPLIED_EVENTS {
            self.seen.remove(0);
        }
        self.seen.push(event_id);
    }
}

#[derive(Default)]
struct Inner {
    order: VecDeque<CorrelationId>,
    events: HashMap<CorrelationId, EarlyEvent>,
}

/// Bounded FIFO of early vendor outcomes, keyed by correlation id.
pub struct EarlyEvents {
    capacity: usize,
    inner: Mutex<Inner>,
}

impl EarlyEvents {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Remember a freshly delivered outcome for its correlation id.
    ///
    /// A decision is never replaced by a `completed` outcome for the same id,
    /// and a redelivery of an event already folded in changes nothing.
    pub fn remember(&self, outcome: VendorOutcome, payload: &EventPayload) {
        let event = EarlyEvent {
            outcome,
            payload: payload.clone(),
            seen: payload.event_id.iter().cloned().collect(),
        };
        self.insert(event, true);
    }

    /// Put back an outcome taken by [`take`](Self::take) that turned out to
    /// belong to someone else. Anything delivered in the meantime wins.
    pub fn restore(&self, event: EarlyEvent) {
        self.insert(event, false);
    }

    fn insert(&self, event: EarlyEvent, newer: bool) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let id = event.payload.correlation_id.clone();

        if let Some(existing) = inner.events.get_mut(&id) {
            let redelivery = event
                .payload
                .event_id
                .as_ref()
                .is_some_and(|event_id| existing.seen.contains(event_id));
            let replaces = if newer {
                event.outcome >= existing.outcome
            } else {
                event.outcome > existing.outcome
            };
            if !redelivery && replaces {
                existing.outcome = event.outcome;
                existing.payload = event.payload;
            }
            for event_id in event.seen {
                existing.note_seen(event_id);
            }
            return;
        }

        while inner.events.len() >= self.capacity {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            inner.events.remove(&oldest);
        }
        inner.order.push_back(id.clone());
        inner.events.insert(id, event);
    }

    /// Remove and return the outcome remembered for `id`.
    pub fn take(&self, id: &CorrelationId) -> Option<EarlyEvent> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let found = inner.events.remove(id)?;
        inner.order.retain(|queued| queued != id);
        Some(found)
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .events
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EarlyEvents {
    fn default() -> Self {
        Self::new(DEFAULT_EARLY_EVENT_CAPACITY)
    }
}
