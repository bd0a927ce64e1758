use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("lock poisoned for user {0}")]
    LockPoisoned(String),
}

impl From<StoreError> for kycgate_types::KycError {
    fn from(e: StoreError) -> Self {
        kycgate_types::KycError::Internal(e.to_string())
    }
}
