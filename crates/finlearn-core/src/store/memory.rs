//! In-memory repository backed by `BTreeMap`.
//!
//! The default backend for tests and ephemeral dev servers. Replaces the
//! process-wide user map of earlier iterations with an owned value that has
//! an explicit lifecycle.

use super::{ProfileRepository, StoreError};
use crate::primitives::UserId;
use crate::profile::Profile;
use std::collections::BTreeMap;

/// First identifier handed out by a fresh repository.
const FIRST_USER_ID: u64 = 1;

/// `BTreeMap`-backed profile storage with an email index.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    profiles: BTreeMap<UserId, Profile>,
    emails: BTreeMap<String, UserId>,
    next_id: u64,
}

impl MemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            profiles: BTreeMap::new(),
            emails: BTreeMap::new(),
            next_id: FIRST_USER_ID,
        }
    }
}

impl ProfileRepository for MemoryRepository {
    fn create(
        &mut self,
        username: &str,
        email: &str,
        credential: Vec<u8>,
        now_ms: i64,
    ) -> Result<Profile, StoreError> {
        if self.emails.contains_key(email) {
            return Err(StoreError::EmailTaken(email.to_string()));
        }

        let id = UserId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);

        let profile = Profile::new(id, username, email, credential, now_ms);
        self.emails.insert(email.to_string(), id);
        self.profiles.insert(id, profile.clone());

        Ok(profile)
    }

    fn get(&self, id: UserId) -> Result<Option<Profile>, StoreError> {
        Ok(self.profiles.get(&id).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Profile>, StoreError> {
        let Some(id) = self.emails.get(email) else {
            return Ok(None);
        };
        Ok(self.profiles.get(id).cloned())
    }

    fn save(&mut self, profile: &Profile) -> Result<(), StoreError> {
        self.profiles.insert(profile.id, profile.clone());
        Ok(())
    }

    fn all(&self) -> Result<Vec<Profile>, StoreError> {
        Ok(self.profiles.values().cloned().collect())
    }

    fn count(&self) -> Result<u64, StoreError> {
        Ok(self.profiles.len() as u64)
    }
}

// =============================================================================
// TESTS
// =============================================================================
