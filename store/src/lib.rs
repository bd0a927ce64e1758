//! Verification status storage for kycgate.
//!
//! Every storage backend (in-memory today, anything durable tomorrow) implements
//! [`StatusStore`]. The rest of the codebase depends only on the trait.

pub mod error;
pub mod memory;
pub mod status;

pub use error::StoreError;
pub use memory::MemoryStatusStore;
pub use status::StatusStore;
