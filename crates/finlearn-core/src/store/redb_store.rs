//! Disk-backed repository using redb.
//!
//! Three tables: profile records keyed by numeric id, an email index, and a
//! metadata table carrying the id counter. Every mutation runs inside a
//! single write transaction, so id allocation, the uniqueness check, and the
//! record write commit together or not at all.

use super::{decode_profile, encode_profile, ProfileRepository, StoreError};
use crate::primitives::UserId;
use crate::profile::Profile;
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::path::Path;

const PROFILES: TableDefinition<u64, &[u8]> = TableDefinition::new("profiles");
const EMAILS: TableDefinition<&str, u64> = TableDefinition::new("emails");
const META: TableDefinition<&str, u64> = TableDefinition::new("meta");

/// Metadata key for the next unallocated user id.
const NEXT_USER_ID: &str = "next_user_id";

/// First identifier handed out by a fresh database.
const FIRST_USER_ID: u64 = 1;

/// redb-backed profile storage.
pub struct RedbRepository {
    db: Database,
}

impl RedbRepository {
    /// Create or open the database at `path` and ensure all tables exist.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let db = Database::create(path)?;

        // Opening a table inside a write transaction creates it if missing,
        // so readers never hit a nonexistent table afterwards.
        let txn = db.begin_write()?;
        {
            txn.open_table(PROFILES)?;
            txn.open_table(EMAILS)?;
            txn.open_table(META)?;
        }
        txn.commit()?;

        Ok(Self { db })
    }
}

impl ProfileRepository for RedbRepository {
    fn create(
        &mut self,
        username: &str,
        email: &str,
        credential: Vec<u8>,
        now_ms: i64,
    ) -> Result<Profile, StoreError> {
        let txn = self.db.begin_write()?;

        let profile = {
            let mut emails = txn.open_table(EMAILS)?;
            if emails.get(email)?.is_some() {
                return Err(StoreError::EmailTaken(email.to_string()));
            }

            let mut meta = txn.open_table(META)?;
            let id = meta
                .get(NEXT_USER_ID)?
                .map(|guard| guard.value())
                .unwrap_or(FIRST_USER_ID);
            meta.insert(NEXT_USER_ID, id.saturating_add(1))?;

            let profile = Profile::new(UserId(id), username, email, credential, now_ms);
            let record = encode_profile(&profile)?;

            let mut profiles = txn.open_table(PROFILES)?;
            profiles.insert(id, record.as_slice())?;
            emails.insert(email, id)?;

            profile
        };

        txn.commit()?;
        Ok(profile)
    }

    fn get(&self, id: UserId) -> Result<Option<Profile>, StoreError> {
        let txn = self.db.begin_read()?;
        let profiles = txn.open_table(PROFILES)?;

        let Some(guard) = profiles.get(id.0)? else {
            return Ok(None);
        };
        Ok(Some(decode_profile(guard.value())?))
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Profile>, StoreError> {
        let txn = self.db.begin_read()?;
        let emails = txn.open_table(EMAILS)?;

        let Some(id_guard) = emails.get(email)? else {
            return Ok(None);
        };
        let id = id_guard.value();

        let profiles = txn.open_table(PROFILES)?;
        let Some(guard) = profiles.get(id)? else {
            return Ok(None);
        };
        Ok(Some(decode_profile(guard.value())?))
    }

    fn save(&mut self, profile: &Profile) -> Result<(), StoreError> {
        let record = encode_profile(profile)?;

        let txn = self.db.begin_write()?;
        {
            let mut profiles = txn.open_table(PROFILES)?;
            profiles.insert(profile.id.0, record.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    fn all(&self) -> Result<Vec<Profile>, StoreError> {
        let txn = self.db.begin_read()?;
        let profiles = txn.open_table(PROFILES)?;

        let mut result = Vec::new();
        for entry in profiles.iter()? {
            let (_, value) = entry?;
            result.push(decode_profile(value.value())?);
        }
        Ok(result)
    }

    fn count(&self) -> Result<u64, StoreError> {
        let txn = self.db.begin_read()?;
        let profiles = txn.open_table(PROFILES)?;
        Ok(profiles.len()?)
    }
}
