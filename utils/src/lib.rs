//! Shared utilities for kycgate.

pub mod logging;

pub use logging::{init_logging, LogFormat};
