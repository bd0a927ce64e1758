//! Process-lifetime, in-memory [`StatusStore`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use kycgate_types::{Role, UserId, UserVerificationState, VerificationRecord};

use crate::{StatusStore, StoreError};

type Slot = Arc<Mutex<UserVerificationState>>;

/// In-memory store with one mutex per user.
///
/// The outer map lock is held only long enough to find or create a user's
/// slot, so a long update on one user never blocks another.
#[derive(Default)]
pub struct MemoryStatusStore {
    users: RwLock<HashMap<UserId, Slot>>,
}

impl MemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn existing(&self, user: &UserId) -> Result<Option<Slot>, StoreError> {
        let users = self
            .users
            .read()
            .map_err(|_| StoreError::LockPoisoned("<index>".into()))?;
        Ok(users.get(user).map(Arc::clone))
    }

    fn slot(&self, user: &UserId) -> Result<Slot, StoreError> {
        if let Some(slot) = self.existing(user)? {
            return Ok(slot);
        }

        let mut users = self
            .users
            .write()
            .map_err(|_| StoreError::LockPoisoned("<index>".into()))?;
        let slot = users.entry(user.clone()).or_insert_with(|| {
            tracing::debug!(user = %user, "creating verification state");
            Arc::new(Mutex::new(UserVerificationState::default()))
        });
        Ok(Arc::clone(slot))
    }
}

impl StatusStore for MemoryStatusStore {
    fn get(&self, user: &UserId, role: Role) -> Result<VerificationRecord, StoreError> {
        let Some(slot) = self.existing(user)? else {
            return Ok(VerificationRecord::default());
        };
        let state = slot
            .lock()
            .map_err(|_| StoreError::LockPoisoned(user.to_string()))?;
        Ok(state.record(role).clone())
    }

    fn set(&self, user: &UserId, role: Role, record: VerificationRecord) -> Result<(), StoreError> {
        let slot = self.slot(user)?;
        let mut state = slot
            .lock()
            .map_err(|_| StoreError::LockPoisoned(user.to_string()))?;
        *state.record_mut(role) = record;
        Ok(())
    }

    fn update(
        &self,
        user: &UserId,
        apply: &mut dyn FnMut(&mut UserVerificationState),
    ) -> Result<UserVerificationState, StoreError> {
        let slot = self.slot(user)?;
        let mut state = slot
            .lock()
            .map_err(|_| StoreError::LockPoisoned(user.to_string()))?;
        apply(&mut state);
        Ok(state.clone())
    }

    fn users(&self) -> Result<Vec<UserId>, StoreError> {
        let users = self
            .users
            .read()
            .map_err(|_| StoreError::LockPoisoned("<index>".into()))?;
        let mut ids: Vec<UserId> = users.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kycgate_types::{CorrelationId, KycStatus};
    use std::thread;

    fn user(name: &str) -> UserId {
        UserId::new(name).unwrap()
    }

    #[test]
    fn unknown_user_reads_as_unset() {
        let store = MemoryStatusStore::new();
        let record = store.get(&user("alice"), Role::Buyer).unwrap();
        assert_eq!(record.status, KycStatus::Unset);
        assert!(record.correlation_id.is_none());
        // Reads leave no trace.
        assert_eq!(store.get(&user("alice"), Role::Buyer).unwrap(), record);
        assert!(store.users().unwrap().is_empty());
    }

    #[test]
    fn set_overwrites_only_one_role() {
        let store = MemoryStatusStore::new();
        let alice = user("alice");
        let record = VerificationRecord {
            status: KycStatus::Approved,
            correlation_id: Some(CorrelationId::new("inq_1").unwrap()),
            ..Default::default()
        };
        store.set(&alice, Role::Seller, record.clone()).unwrap();

        assert_eq!(store.get(&alice, Role::Seller).unwrap(), record);
        assert_eq!(
            store.get(&alice, Role::Buyer).unwrap().status,
            KycStatus::Unset
        );
    }

    #[test]
    fn users_are_isolated() {
        let store = MemoryStatusStore::new();
        store
            .update(&user("alice"), &mut |s| s.buyer.status = KycStatus::Declined)
            .unwrap();
        assert_eq!(
            store.get(&user("bob"), Role::Buyer).unwrap().status,
            KycStatus::Unset
        );
        assert_eq!(store.users().unwrap(), vec![user("alice")]);

        store.set(&user("bob"), Role::Seller, VerificationRecord::default()).unwrap();
        assert_eq!(store.users().unwrap(), vec![user("alice"), user("bob")]);
    }

    #[test]
    fn update_returns_resulting_state() {
        let store = MemoryStatusStore::new();
        let after = store
            .update(&user("carol"), &mut |s| s.seller.status = KycStatus::Pending)
            .unwrap();
        assert_eq!(after.seller.status, KycStatus::Pending);
        assert_eq!(after.buyer.status, KycStatus::Unset);
    }

    #[test]
    fn concurrent_updates_are_not_lost() {
        let store = Arc::new(MemoryStatusStore::new());
        let shared = user("shared");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let shared = shared.clone();
                thread::spawn(move || {
                    for _ in 0..200 {
                        store
                            .update(&shared, &mut |s| {
                                s.buyer.decision_reason.get_or_insert_with(String::new).push('x');
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let reason = store.get(&shared, Role::Buyer).unwrap().decision_reason.unwrap();
        assert_eq!(reason.len(), 8 * 200);
    }
}
