//! Nullable store: a backend that always fails, for exercising fault paths.

use kycgate_store::{StatusStore, StoreError};
use kycgate_types::{Role, UserId, UserVerificationState, VerificationRecord};

/// A [`StatusStore`] whose every operation returns a backend error.
#[derive(Debug, Clone)]
pub struct FailingStore {
    message: String,
}

impl FailingStore {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn fail<T>(&self) -> Result<T, StoreError> {
        Err(StoreError::Backend(self.message.clone()))
    }
}

impl Default for FailingStore {
    fn default() -> Self {
        Self::new("storage unavailable")
    }
}

impl StatusStore for FailingStore {
    fn get(&self, _user: &UserId, _role: Role) -> Result<VerificationRecord, StoreError> {
        self.fail()
    }

    fn set(&self, _user: &UserId, _role: Role, _record: VerificationRecord) -> Result<(), StoreError> {
        self.fail()
    }

    fn update(
        &self,
        _user: &UserId,
        _apply: &mut dyn FnMut(&mut UserVerificationState),
    ) -> Result<UserVerificationState, StoreError> {
        self.fail()
    }

    fn users(&self) -> Result<Vec<UserId>, StoreError> {
        self.fail()
    }
}
