//! Verification status storage trait.

use crate::StoreError;
use kycgate_types::{Role, UserId, UserVerificationState, VerificationRecord};

/// Trait for storing per-user verification state.
///
/// A user that was never written reads as both records at `unset`; only
/// writes create state, so reads never grow the store. Implementations must serialize
/// [`StatusStore::update`] per user so concurrent read-modify-write sequences
/// on the same user never lose an update, while unrelated users proceed
/// independently.
pub trait StatusStore: Send + Sync {
    /// Current record for `(user, role)`. Never fails for an unknown user and
    /// never creates state for one.
    fn get(&self, user: &UserId, role: Role) -> Result<VerificationRecord, StoreError>;

    /// Replace the full record for `(user, role)`.
    fn set(&self, user: &UserId, role: Role, record: VerificationRecord) -> Result<(), StoreError>;

    /// Run `apply` against the user's state under the user's lock and return
    /// the state as left by `apply`.
    fn update(
        &self,
        user: &UserId,
        apply: &mut dyn FnMut(&mut UserVerificationState),
    ) -> Result<UserVerificationState, StoreError>;

    /// Every user that has been written.
    fn users(&self) -> Result<Vec<UserId>, StoreError>;
}
