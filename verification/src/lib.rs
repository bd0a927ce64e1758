//! Verification status tracking and webhook reconciliation.
//!
//! [`KycService`] is the single entry point for every status mutation:
//! - `get_status`: read a (user, role) record
//! - `complete_local`: provisional, client-reported session outcome
//! - `simulate_decision`: operator-imposed decision (non-production only)
//! - `apply_webhook`: vendor-authoritative outcome, matched by correlation id
//!
//! The precedence rules between those writers live in [`reconcile`] as pure
//! functions over a single record; the service applies them under the store's
//! per-user lock and publishes every effective change on a [`StatusFeed`].

pub mod early;
pub mod event;
pub mod feed;
pub mod reconcile;
pub mod service;

pub use early::{EarlyEvent, EarlyEvents};
pub use event::{EventPayload, WebhookEvent};
pub use feed::{ChangeCause, StatusChange, StatusFeed};
pub use reconcile::{LocalOutcome, VendorOutcome};
pub use service::{KycService, ReconcileReport};
