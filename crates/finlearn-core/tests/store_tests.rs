//! Integration tests for the profile repositories.
//!
//! Uses tempfile so every redb database lives in its own scratch directory.

#![allow(clippy::unwrap_used, clippy::panic)]

use finlearn_core::{
    LessonId, MemoryRepository, Profile, ProfileRepository, RedbRepository, StoreError, UserId,
};
use std::path::PathBuf;
use tempfile::TempDir;

const T: i64 = 1_700_000_000_000;

fn temp_db(dir: &TempDir) -> PathBuf {
    dir.path().join("profiles.redb")
}

// =============================================================================
// REDB BACKEND
// =============================================================================

#[test]
fn redb_create_and_fetch_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = RedbRepository::open(&temp_db(&dir)).unwrap();

    let created = repo
        .create("alice", "alice@example.com", vec![1, 2, 3], T)
        .unwrap();
    assert_eq!(created.id, UserId(1));

    let by_id = repo.get(created.id).unwrap();
    assert_eq!(by_id, Some(created.clone()));

    let by_email = repo.find_by_email("alice@example.com").unwrap();
    assert_eq!(by_email, Some(created));

    assert_eq!(repo.get(UserId(99)).unwrap(), None);
    assert_eq!(repo.find_by_email("ghost@example.com").unwrap(), None);
}

#[test]
fn redb_rejects_duplicate_email() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = RedbRepository::open(&temp_db(&dir)).unwrap();

    repo.create("alice", "alice@example.com", Vec::new(), T)
        .unwrap();
    let dup = repo.create("impostor", "alice@example.com", Vec::new(), T);

    assert!(matches!(dup, Err(StoreError::EmailTaken(_))));
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn redb_save_persists_progress_mutations() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = RedbRepository::open(&temp_db(&dir)).unwrap();

    let mut profile = repo
        .create("alice", "alice@example.com", Vec::new(), T)
        .unwrap();
    profile.xp = 475;
    profile.level = 4;
    profile.completed_lessons.insert(LessonId::new("budgeting_1"));
    repo.save(&profile).unwrap();

    let reloaded = repo.get(profile.id).unwrap().unwrap();
    assert_eq!(reloaded.xp, 475);
    assert_eq!(reloaded.level, 4);
    assert!(reloaded.completed_lessons.contains(&LessonId::new("budgeting_1")));
}

#[test]
fn redb_data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_db(&dir);

    {
        let mut repo = RedbRepository::open(&path).unwrap();
        repo.create("alice", "alice@example.com", Vec::new(), T)
            .unwrap();
    }

    let repo = RedbRepository::open(&path).unwrap();
    assert_eq!(repo.count().unwrap(), 1);
    let profile = repo.find_by_email("alice@example.com").unwrap();
    assert_eq!(profile.map(|p| p.username), Some("alice".to_string()));
}

#[test]
fn redb_id_counter_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_db(&dir);

    {
        let mut repo = RedbRepository::open(&path).unwrap();
        repo.create("alice", "alice@example.com", Vec::new(), T)
            .unwrap();
        repo.create("bob", "bob@example.com", Vec::new(), T).unwrap();
    }

    let mut repo = RedbRepository::open(&path).unwrap();
    let third = repo
        .create("carol", "carol@example.com", Vec::new(), T)
        .unwrap();
    assert_eq!(third.id, UserId(3));
}

#[test]
fn redb_all_orders_by_id() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = RedbRepository::open(&temp_db(&dir)).unwrap();

    repo.create("zed", "zed@example.com", Vec::new(), T).unwrap();
    repo.create("alice", "alice@example.com", Vec::new(), T)
        .unwrap();
    repo.create("mia", "mia@example.com", Vec::new(), T).unwrap();

    let ids: Vec<UserId> = repo.all().unwrap().into_iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![UserId(1), UserId(2), UserId(3)]);
}

// =============================================================================
// BACKEND PARITY
// =============================================================================

/// Both backends must behave identically through the trait object.
fn exercise_repository(repo: &mut dyn ProfileRepository) {
    let created = repo
        .create("alice", "alice@example.com", Vec::new(), T)
        .unwrap();
    assert_eq!(created.id, UserId(1));
    assert_eq!(created.level, 1);

    let mut profile = repo.get(created.id).unwrap().unwrap();
    profile.xp = 150;
    repo.save(&profile).unwrap();

    assert_eq!(repo.count().unwrap(), 1);
    assert_eq!(
        repo.find_by_email("alice@example.com")
            .unwrap()
            .map(|p| p.xp),
        Some(150)
    );
}

#[test]
fn memory_and_redb_agree_through_the_trait() {
    let mut memory = MemoryRepository::new();
    exercise_repository(&mut memory);

    let dir = tempfile::tempdir().unwrap();
    let mut redb = RedbRepository::open(&temp_db(&dir)).unwrap();
    exercise_repository(&mut redb);
}

#[test]
fn stored_profiles_roundtrip_every_field() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = RedbRepository::open(&temp_db(&dir)).unwrap();

    let mut profile: Profile = repo
        .create("alice", "alice@example.com", vec![9, 9, 9], T)
        .unwrap();
    profile.coins = 42;
    profile.streak.days = 6;
    profile.streak.last_active_ms = T + 1;
    profile
        .completed_challenges
        .insert(finlearn_core::ChallengeId::new("weekly_streak"));
    profile.updated_ms = T + 2;
    repo.save(&profile).unwrap();

    let reloaded = repo.get(profile.id).unwrap();
    assert_eq!(reloaded, Some(profile));
}
