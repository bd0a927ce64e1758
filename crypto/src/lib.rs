//! Cryptographic primitives for kycgate.
//!
//! - **HMAC-SHA256** over the raw webhook body, keyed by the shared vendor secret
//! - Signature header format `sha256=<hex>`; several comma-separated entries
//!   are accepted so the vendor can rotate secrets without downtime

pub mod webhook;

pub use webhook::{
    parse_signature_header, sign_webhook_payload, verify_webhook_signature, SignatureError,
    WebhookSecret, SIGNATURE_SCHEME,
};
