//! # Profile Store
//!
//! The repository seam between the progression engine and persistence.
//!
//! Handlers depend on the [`ProfileRepository`] trait only; the backend is
//! chosen at startup and injected. Two implementations ship:
//! - [`MemoryRepository`]: `BTreeMap`-backed, for tests and ephemeral runs
//! - [`RedbRepository`]: redb-backed (ACID transactions, crash safety)
//!
//! Profiles persist as postcard bytes behind a one-byte format version so
//! a stale database fails loudly instead of decoding garbage.

mod memory;
mod redb_store;

pub use memory::MemoryRepository;
pub use redb_store::RedbRepository;

use crate::primitives::UserId;
use crate::profile::Profile;
use thiserror::Error;

// =============================================================================
// ERRORS
// =============================================================================

/// Failures surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered: {0}")]
    EmailTaken(String),

    #[error("unsupported profile format version {found}, expected {expected}")]
    FormatVersion { found: u8, expected: u8 },

    #[error("profile record is empty")]
    EmptyRecord,

    #[error("profile codec error: {0}")]
    Codec(#[from] postcard::Error),

    #[error("database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("commit error: {0}")]
    Commit(#[from] redb::CommitError),
}

// =============================================================================
// REPOSITORY TRAIT
// =============================================================================

/// Persistence operations the app layer is allowed to perform.
///
/// Implementations own identifier allocation and enforce email uniqueness.
/// Each mutation is atomic within the backend; callers serialize
/// read-modify-write sequences themselves.
pub trait ProfileRepository: Send {
    /// Allocate an id and persist a fresh profile.
    /// Fails with [`StoreError::EmailTaken`] on a duplicate email.
    fn create(
        &mut self,
        username: &str,
        email: &str,
        credential: Vec<u8>,
        now_ms: i64,
    ) -> Result<Profile, StoreError>;

    /// Fetch a profile by id.
    fn get(&self, id: UserId) -> Result<Option<Profile>, StoreError>;

    /// Fetch a profile by exact email.
    fn find_by_email(&self, email: &str) -> Result<Option<Profile>, StoreError>;

    /// Write back a modified profile (upsert by id).
    fn save(&mut self, profile: &Profile) -> Result<(), StoreError>;

    /// All profiles, ordered by id.
    fn all(&self) -> Result<Vec<Profile>, StoreError>;

    /// Number of stored profiles.
    fn count(&self) -> Result<u64, StoreError>;
}

// =============================================================================
// RECORD CODEC
// =============================================================================

/// Version prefix written before every postcard-encoded profile.
pub const PROFILE_FORMAT_VERSION: u8 = 1;

/// Encode a profile as `[version, postcard...]`.
pub fn encode_profile(profile: &Profile) -> Result<Vec<u8>, StoreError> {
    let body = postcard::to_allocvec(profile)?;
    let mut record = Vec::with_capacity(body.len() + 1);
    record.push(PROFILE_FORMAT_VERSION);
    record.extend_from_slice(&body);
    Ok(record)
}

/// Decode a `[version, postcard...]` record back into a profile.
pub fn decode_profile(record: &[u8]) -> Result<Profile, StoreError> {
    let Some((version, body)) = record.split_first() else {
        return Err(StoreError::EmptyRecord);
    };
    if *version != PROFILE_FORMAT_VERSION {
        return Err(StoreError::FormatVersion {
            found: *version,
            expected: PROFILE_FORMAT_VERSION,
        });
    }
    Ok(postcard::from_bytes(body)?)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const T: i64 = 1_700_000_000_000;

    #[test]
    fn codec_roundtrips_a_profile() {
        let mut profile = Profile::new(UserId(7), "alice", "alice@example.com", vec![1, 2, 3], T);
        profile.xp = 475;
        profile.level = 4;
        profile
            .completed_lessons
            .insert(crate::primitives::LessonId::new("budgeting_1"));

        let encoded = encode_profile(&profile);
        assert!(encoded.is_ok());
        let decoded = encoded.and_then(|bytes| decode_profile(&bytes));
        assert_eq!(decoded.ok(), Some(profile));
    }

    #[test]
    fn codec_rejects_unknown_version() {
        let profile = Profile::new(UserId(1), "bob", "bob@example.com", Vec::new(), T);
        let tampered = encode_profile(&profile).map(|mut bytes| {
            bytes[0] = 99;
            bytes
        });

        let result = tampered.and_then(|bytes| decode_profile(&bytes));
        assert!(matches!(
            result,
            Err(StoreError::FormatVersion { found: 99, .. })
        ));
    }

    #[test]
    fn codec_rejects_empty_record() {
        assert!(matches!(decode_profile(&[]), Err(StoreError::EmptyRecord)));
    }
}
