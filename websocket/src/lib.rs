//! WebSocket server for real-time status updates.
//!
//! Clients connect to `/ws` and subscribe to status changes, optionally
//! filtered by user and role. This is the push alternative to polling
//! `GET /api/kyc/status`.

pub mod server;
pub mod subscriptions;

pub use server::{WebSocketError, WebSocketServer};
pub use subscriptions::{ClientMessage, ServerMessage, SubscriptionFilter};
