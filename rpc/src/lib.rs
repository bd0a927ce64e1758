//! HTTP API for the verification demo backend.
//!
//! Provides endpoints for:
//! - Status queries per (user, role)
//! - Client-reported session completion
//! - Simulated decisions (development only)
//! - Signed vendor webhooks
//! - Health checks

pub mod config;
pub mod error;
pub mod handlers;
pub mod server;

pub use config::ServerConfig;
pub use error::RpcError;
pub use server::{routes, AppState, RpcServer, USER_HEADER};
