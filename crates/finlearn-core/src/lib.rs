//! # FinLearn Core
//!
//! The deterministic progression engine: leveling formula, reward policy,
//! streak tracking, the lesson catalog, and the profile repository.
//!
//! This crate is THE LOGIC. It is pure and synchronous, uses `BTreeMap`
//! collections exclusively, performs no floating-point arithmetic, and never
//! reads the clock; timestamps arrive as epoch-millisecond parameters. The
//! HTTP server and CLI live in the app crate and consume this one.
//!
//! The level curve is defined in exactly one place ([`progression`]) so any
//! display layer can reproduce it bit-for-bit; see [`progression::level_table`]
//! for the reference view.

pub mod catalog;
pub mod primitives;
pub mod profile;
pub mod progression;
pub mod rewards;
pub mod store;
pub mod streak;

// Flat re-exports for app-layer convenience.
pub use catalog::{Catalog, Challenge, Lesson, World};
pub use primitives::{
    ChallengeId, LessonId, UserId, WorldId, DEFAULT_LEADERBOARD_LIMIT, MAX_LEADERBOARD_LIMIT,
};
pub use profile::{
    rank_leaderboard, ChallengeCompletion, CheckIn, GrantOutcome, LeaderboardEntry,
    LessonCompletion, Profile,
};
pub use progression::{
    cumulative_xp_for, level_for_xp, level_table, progress_for_xp, xp_requirement, LevelProgress,
    LevelStep, BASE_XP_REQUIREMENT,
};
pub use rewards::{CompletionVerdict, Reward, RewardPolicy, PASS_SCORE, PERFECT_SCORE};
pub use store::{
    decode_profile, encode_profile, MemoryRepository, ProfileRepository, RedbRepository,
    StoreError, PROFILE_FORMAT_VERSION,
};
pub use streak::{classify_gap, DayGap, Streak, MILLIS_PER_DAY};
