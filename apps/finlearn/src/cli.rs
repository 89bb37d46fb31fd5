//! # CLI Commands
//!
//! Offline operations against the profile store plus the level-table
//! reference printer. Each `cmd_*` function backs one subcommand and is
//! independently testable; `main` only parses arguments and dispatches.

use std::path::Path;

use finlearn_core::{
    level_table, MemoryRepository, Profile, ProfileRepository, RedbRepository, StoreError,
};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::api::auth::hash_credential;
use crate::api::now_ms;

pub const DEMO_EMAIL: &str = "demo@finlearn.dev";
pub const DEMO_PASSWORD: &str = "demo123";
pub const DEMO_USERNAME: &str = "DemoUser";

const DEFAULT_LEVEL_ROWS: u32 = 15;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Error)]
pub enum CliError {
    #[error("unknown backend '{0}', expected 'memory' or 'redb'")]
    UnknownBackend(String),

    #[error("database already exists at {0} (use --force to recreate)")]
    AlreadyInitialized(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// BACKEND SELECTION
// =============================================================================

/// Open the profile repository named by `backend`.
///
/// `memory` starts empty every run; `redb` persists at `path`.
pub fn open_repository(
    path: &Path,
    backend: &str,
) -> Result<Box<dyn ProfileRepository>, CliError> {
    match backend {
        "memory" => Ok(Box::new(MemoryRepository::new())),
        "redb" => Ok(Box::new(RedbRepository::open(path)?)),
        other => Err(CliError::UnknownBackend(other.to_string())),
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

/// `finlearn init` - create a fresh redb store.
pub fn cmd_init(path: &Path, force: bool) -> Result<(), CliError> {
    if path.exists() {
        if !force {
            return Err(CliError::AlreadyInitialized(path.display().to_string()));
        }
        std::fs::remove_file(path)?;
    }

    let repo = RedbRepository::open(path)?;
    let users = repo.count()?;
    info!(path = %path.display(), "database initialized");
    println!("Initialized database at {} ({users} users)", path.display());
    Ok(())
}

/// `finlearn seed` - ensure the demo account exists.
pub fn cmd_seed(path: &Path, backend: &str) -> Result<(), CliError> {
    let mut repo = open_repository(path, backend)?;

    if let Some(existing) = repo.find_by_email(DEMO_EMAIL)? {
        println!("Demo user already present: {DEMO_EMAIL} (id {})", existing.id);
        return Ok(());
    }

    let credential = hash_credential(DEMO_PASSWORD);
    let profile = repo.create(DEMO_USERNAME, DEMO_EMAIL, credential, now_ms())?;
    info!(user = profile.id.0, "demo user seeded");
    println!("Seeded demo user {DEMO_EMAIL} (id {})", profile.id);
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusReport {
    backend: String,
    users: u64,
    total_xp: u64,
    total_coins: u64,
    top_level: u32,
    best_streak: u32,
}

impl StatusReport {
    fn from_profiles(backend: &str, count: u64, profiles: &[Profile]) -> Self {
        Self {
            backend: backend.to_string(),
            users: count,
            total_xp: profiles.iter().fold(0, |t, p| t.saturating_add(p.xp)),
            total_coins: profiles.iter().fold(0, |t, p| t.saturating_add(p.coins)),
            top_level: profiles.iter().map(|p| p.level).max().unwrap_or(0),
            best_streak: profiles.iter().map(|p| p.streak.days).max().unwrap_or(0),
        }
    }
}

/// `finlearn status` - aggregate store statistics.
pub fn cmd_status(path: &Path, backend: &str, json: bool) -> Result<(), CliError> {
    let repo = open_repository(path, backend)?;
    let profiles = repo.all()?;
    let report = StatusReport::from_profiles(backend, repo.count()?, &profiles);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("FinLearn store status ({backend})");
        println!("  users:       {}", report.users);
        println!("  total XP:    {}", report.total_xp);
        println!("  total coins: {}", report.total_coins);
        println!("  top level:   {}", report.top_level);
        println!("  best streak: {}", report.best_streak);
    }
    Ok(())
}

/// `finlearn levels` - print the reference level table.
pub fn cmd_levels(count: Option<u32>, json: bool) -> Result<(), CliError> {
    let rows = level_table(count.unwrap_or(DEFAULT_LEVEL_ROWS));

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        println!("{:>5}  {:>12}  {:>12}", "level", "requirement", "cumulative");
        for row in &rows {
            println!(
                "{:>5}  {:>12}  {:>12}",
                row.level, row.requirement, row.cumulative
            );
        }
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_backend_is_rejected() {
        let result = open_repository(Path::new("unused.redb"), "sqlite");
        assert!(matches!(result, Err(CliError::UnknownBackend(_))));
    }

    #[test]
    fn memory_backend_opens_without_touching_disk() {
        let repo = open_repository(Path::new("does-not-exist.redb"), "memory");
        assert!(repo.is_ok());
    }

    #[test]
    fn status_report_aggregates_maxima_and_sums() {
        let mut first = Profile::new(finlearn_core::UserId(1), "a", "a@x.y", Vec::new(), 0);
        first.xp = 300;
        first.coins = 40;
        first.level = 3;
        first.streak.days = 5;
        let mut second = Profile::new(finlearn_core::UserId(2), "b", "b@x.y", Vec::new(), 0);
        second.xp = 120;
        second.coins = 10;
        second.level = 2;
        second.streak.days = 9;

        let report = StatusReport::from_profiles("memory", 2, &[first, second]);
        assert_eq!(report.users, 2);
        assert_eq!(report.total_xp, 420);
        assert_eq!(report.total_coins, 50);
        assert_eq!(report.top_level, 3);
        assert_eq!(report.best_streak, 9);
    }

    #[test]
    fn empty_store_reports_zeroes() {
        let report = StatusReport::from_profiles("memory", 0, &[]);
        assert_eq!(report.top_level, 0);
        assert_eq!(report.best_streak, 0);
    }
}
