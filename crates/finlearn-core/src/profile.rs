//! # User Profiles
//!
//! The progression state carried per user, plus the reward-granting
//! operations that mutate it.
//!
//! XP is the authoritative value; the stored level is a cache recomputed on
//! every grant. Credentials are opaque bytes here: hashing and verification
//! belong to the app layer.

use crate::primitives::{ChallengeId, LessonId, UserId, MAX_LEADERBOARD_LIMIT};
use crate::progression::{level_for_xp, progress_for_xp, LevelProgress};
use crate::rewards::{CompletionVerdict, Reward, RewardPolicy};
use crate::streak::{DayGap, Streak};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// PROFILE RECORD
// =============================================================================

/// Everything the engine tracks for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// Opaque credential blob produced and verified by the app layer.
    pub credential: Vec<u8>,
    /// Lifetime XP. Monotonically non-decreasing.
    pub xp: u64,
    /// Lifetime coins. Independent currency, never derived from XP.
    pub coins: u64,
    /// Cached level; recomputed from XP on every grant.
    pub level: u32,
    pub streak: Streak,
    pub completed_lessons: BTreeSet<LessonId>,
    pub completed_challenges: BTreeSet<ChallengeId>,
    pub created_ms: i64,
    pub updated_ms: i64,
}

impl Profile {
    /// Fresh profile: zero XP and coins, level 1, empty completion sets.
    #[must_use]
    pub fn new(
        id: UserId,
        username: impl Into<String>,
        email: impl Into<String>,
        credential: Vec<u8>,
        now_ms: i64,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
            credential,
            xp: 0,
            coins: 0,
            level: 1,
            streak: Streak::starting(now_ms),
            completed_lessons: BTreeSet::new(),
            completed_challenges: BTreeSet::new(),
            created_ms: now_ms,
            updated_ms: now_ms,
        }
    }

    /// Current position on the level curve, derived from XP.
    #[must_use]
    pub fn progress(&self) -> LevelProgress {
        progress_for_xp(self.xp)
    }

    #[must_use]
    pub fn has_completed(&self, lesson: &LessonId) -> bool {
        self.completed_lessons.contains(lesson)
    }

    /// Integer percent of the catalog completed, in `0..=100`.
    #[must_use]
    pub fn completion_percentage(&self, total_lessons: usize) -> u8 {
        if total_lessons == 0 {
            return 0;
        }
        let completed = self.completed_lessons.len().min(total_lessons) as u128;
        ((completed * 100) / total_lessons as u128) as u8
    }

    /// Apply a reward to the running totals and refresh the level cache.
    fn grant(&mut self, reward: Reward) -> GrantOutcome {
        let level_before = level_for_xp(self.xp);

        self.xp = self.xp.saturating_add(reward.xp);
        self.coins = self.coins.saturating_add(reward.coins);

        let progress = progress_for_xp(self.xp);
        self.level = progress.level;

        GrantOutcome {
            granted: reward,
            total_xp: self.xp,
            total_coins: self.coins,
            progress,
            leveled_up: progress.level != level_before,
        }
    }
}

// =============================================================================
// GRANT OUTCOMES
// =============================================================================

/// Result of applying a reward to a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantOutcome {
    /// The deltas actually applied (zero for no-ops).
    pub granted: Reward,
    pub total_xp: u64,
    pub total_coins: u64,
    /// Position on the curve after the grant.
    pub progress: LevelProgress,
    /// True when the grant crossed a level threshold.
    pub leveled_up: bool,
}

/// Result of a lesson completion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonCompletion {
    pub verdict: CompletionVerdict,
    pub outcome: GrantOutcome,
}

/// Result of a challenge completion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChallengeCompletion {
    /// False when the challenge was already completed (no-op).
    pub first_completion: bool,
    pub outcome: GrantOutcome,
}

/// Result of a daily check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckIn {
    pub gap: DayGap,
    /// Streak days after the transition.
    pub streak_days: u32,
    /// Streak bonus grant; zero unless the streak extended.
    pub outcome: GrantOutcome,
}

// =============================================================================
// REWARD-GRANTING OPERATIONS
// =============================================================================

impl Profile {
    /// Complete a lesson with the given score.
    ///
    /// Rewards are at-most-once per lesson: replays yield zero deltas. A
    /// score below the pass mark grants nothing and does not mark the
    /// lesson completed, so it can be retried for full credit.
    pub fn complete_lesson(
        &mut self,
        lesson: &LessonId,
        lesson_reward: Reward,
        score: u8,
        policy: &RewardPolicy,
        now_ms: i64,
    ) -> LessonCompletion {
        let verdict = policy.evaluate(score, self.has_completed(lesson));
        let reward = policy.completion_reward(lesson_reward, verdict);

        if matches!(verdict, CompletionVerdict::Passed { .. }) {
            self.completed_lessons.insert(lesson.clone());
        }

        let outcome = self.grant(reward);
        self.updated_ms = now_ms;

        LessonCompletion { verdict, outcome }
    }

    /// Complete a challenge. At-most-once per challenge per user.
    pub fn complete_challenge(
        &mut self,
        challenge: &ChallengeId,
        challenge_reward: Reward,
        now_ms: i64,
    ) -> ChallengeCompletion {
        let first_completion = self.completed_challenges.insert(challenge.clone());
        let reward = if first_completion {
            challenge_reward
        } else {
            Reward::ZERO
        };

        let outcome = self.grant(reward);
        self.updated_ms = now_ms;

        ChallengeCompletion {
            first_completion,
            outcome,
        }
    }

    /// Observe daily activity: run the streak transition and grant the
    /// streak bonus when the streak extends by exactly one day.
    pub fn check_in(&mut self, policy: &RewardPolicy, now_ms: i64) -> CheckIn {
        let gap = self.streak.observe(now_ms);
        let reward = match gap {
            DayGap::NextDay => policy.streak_bonus,
            DayGap::SameDay | DayGap::Lapsed => Reward::ZERO,
        };

        let outcome = self.grant(reward);
        self.updated_ms = now_ms;

        CheckIn {
            gap,
            streak_days: self.streak.days,
            outcome,
        }
    }
}

// =============================================================================
// LEADERBOARD RANKING
// =============================================================================

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user: UserId,
    pub username: String,
    pub level: u32,
    pub xp: u64,
    pub streak_days: u32,
}

/// Rank profiles by XP, descending, with username as the deterministic
/// tiebreak. `limit` is clamped to `1..=MAX_LEADERBOARD_LIMIT`.
#[must_use]
pub fn rank_leaderboard(profiles: &[Profile], limit: usize) -> Vec<LeaderboardEntry> {
    let limit = limit.clamp(1, MAX_LEADERBOARD_LIMIT);

    let mut ordered: Vec<&Profile> = profiles.iter().collect();
    ordered.sort_by(|a, b| b.xp.cmp(&a.xp).then_with(|| a.username.cmp(&b.username)));

    ordered
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(idx, profile)| LeaderboardEntry {
            rank: (idx as u32).saturating_add(1),
            user: profile.id,
            username: profile.username.clone(),
            level: level_for_xp(profile.xp),
            xp: profile.xp,
            streak_days: profile.streak.days,
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const T: i64 = 1_700_000_000_000;

    fn sample_profile() -> Profile {
        Profile::new(UserId(1), "alice", "alice@example.com", Vec::new(), T)
    }

    #[test]
    fn new_profile_starts_at_zero() {
        let profile = sample_profile();
        assert_eq!(profile.xp, 0);
        assert_eq!(profile.coins, 0);
        assert_eq!(profile.level, 1);
        assert_eq!(profile.streak.days, 0);
        assert!(profile.completed_lessons.is_empty());
    }

    #[test]
    fn passing_completion_grants_and_records() {
        let mut profile = sample_profile();
        let lesson = LessonId::new("budgeting_1");
        let policy = RewardPolicy::default();

        let result = profile.complete_lesson(&lesson, Reward::new(50, 10), 85, &policy, T);

        assert_eq!(result.outcome.granted, Reward::new(50, 10));
        assert_eq!(profile.xp, 50);
        assert_eq!(profile.coins, 10);
        assert!(profile.has_completed(&lesson));
    }

    #[test]
    fn perfect_completion_adds_the_bonus() {
        let mut profile = sample_profile();
        let lesson = LessonId::new("budgeting_1");
        let policy = RewardPolicy::default();

        let result = profile.complete_lesson(&lesson, Reward::new(50, 10), 100, &policy, T);

        assert_eq!(result.outcome.granted, Reward::new(75, 15));
        assert_eq!(result.verdict, CompletionVerdict::Passed { perfect: true });
    }

    #[test]
    fn repeat_completion_is_a_zero_delta_noop() {
        let mut profile = sample_profile();
        let lesson = LessonId::new("budgeting_1");
        let policy = RewardPolicy::default();

        profile.complete_lesson(&lesson, Reward::new(50, 10), 85, &policy, T);
        let replay = profile.complete_lesson(&lesson, Reward::new(50, 10), 100, &policy, T);

        assert_eq!(replay.verdict, CompletionVerdict::AlreadyCompleted);
        assert_eq!(replay.outcome.granted, Reward::ZERO);
        assert_eq!(profile.xp, 50);
        assert_eq!(profile.coins, 10);
    }

    #[test]
    fn failing_score_grants_nothing_and_allows_retry() {
        let mut profile = sample_profile();
        let lesson = LessonId::new("budgeting_1");
        let policy = RewardPolicy::default();

        let failed = profile.complete_lesson(&lesson, Reward::new(50, 10), 42, &policy, T);
        assert_eq!(failed.verdict, CompletionVerdict::BelowPassMark);
        assert_eq!(profile.xp, 0);
        assert!(!profile.has_completed(&lesson));

        // The retry earns full credit, including the perfect bonus.
        let retry = profile.complete_lesson(&lesson, Reward::new(50, 10), 100, &policy, T);
        assert_eq!(retry.outcome.granted, Reward::new(75, 15));
    }

    #[test]
    fn leveled_up_flags_threshold_crossings() {
        let mut profile = sample_profile();
        let policy = RewardPolicy::default();
        profile.xp = 95;

        let crossing = profile.complete_lesson(
            &LessonId::new("budgeting_1"),
            Reward::new(50, 10),
            85,
            &policy,
            T,
        );
        assert!(crossing.outcome.leveled_up);
        assert_eq!(crossing.outcome.progress.level, 2);
        assert_eq!(crossing.outcome.total_xp, 145);

        // 145 + 50 = 195, still level 2.
        let within = profile.complete_lesson(
            &LessonId::new("budgeting_2"),
            Reward::new(50, 10),
            85,
            &policy,
            T,
        );
        assert!(!within.outcome.leveled_up);
        assert_eq!(within.outcome.progress.level, 2);
    }

    #[test]
    fn level_cache_follows_xp() {
        let mut profile = sample_profile();
        let policy = RewardPolicy::default();

        profile.complete_lesson(
            &LessonId::new("budgeting_3"),
            Reward::new(120, 0),
            90,
            &policy,
            T,
        );
        assert_eq!(profile.level, 2);
        assert_eq!(profile.level, level_for_xp(profile.xp));
    }

    #[test]
    fn challenge_completion_is_at_most_once() {
        let mut profile = sample_profile();
        let challenge = ChallengeId::new("weekly_streak");

        let first = profile.complete_challenge(&challenge, Reward::new(100, 50), T);
        assert!(first.first_completion);
        assert_eq!(profile.xp, 100);

        let second = profile.complete_challenge(&challenge, Reward::new(100, 50), T);
        assert!(!second.first_completion);
        assert_eq!(second.outcome.granted, Reward::ZERO);
        assert_eq!(profile.xp, 100);
    }

    #[test]
    fn check_in_grants_bonus_only_on_extension() {
        use crate::streak::MILLIS_PER_DAY;

        let mut profile = sample_profile();
        let policy = RewardPolicy::default();

        // Same day: no bonus.
        let same = profile.check_in(&policy, T + 1000);
        assert_eq!(same.gap, DayGap::SameDay);
        assert_eq!(same.outcome.granted, Reward::ZERO);
        assert_eq!(profile.xp, 0);

        // Next day: streak extends and the bonus lands.
        let next = profile.check_in(&policy, T + MILLIS_PER_DAY + 1000);
        assert_eq!(next.gap, DayGap::NextDay);
        assert_eq!(next.streak_days, 1);
        assert_eq!(next.outcome.granted, policy.streak_bonus);
        assert_eq!(profile.xp, policy.streak_bonus.xp);

        // Lapse: counter restarts, no bonus.
        let lapsed = profile.check_in(&policy, T + 10 * MILLIS_PER_DAY);
        assert_eq!(lapsed.gap, DayGap::Lapsed);
        assert_eq!(lapsed.streak_days, 1);
        assert_eq!(lapsed.outcome.granted, Reward::ZERO);
    }

    #[test]
    fn completion_percentage_is_integer_floor() {
        let mut profile = sample_profile();
        profile.completed_lessons.insert(LessonId::new("a"));
        assert_eq!(profile.completion_percentage(3), 33);
        assert_eq!(profile.completion_percentage(0), 0);

        profile.completed_lessons.insert(LessonId::new("b"));
        profile.completed_lessons.insert(LessonId::new("c"));
        assert_eq!(profile.completion_percentage(3), 100);
    }

    #[test]
    fn leaderboard_orders_by_xp_then_username() {
        let mut a = sample_profile();
        a.username = "aria".into();
        a.xp = 500;

        let mut b = Profile::new(UserId(2), "zed", "zed@example.com", Vec::new(), T);
        b.xp = 500;

        let mut c = Profile::new(UserId(3), "casey", "casey@example.com", Vec::new(), T);
        c.xp = 900;

        let board = rank_leaderboard(&[a, b, c], 10);
        let names: Vec<&str> = board.iter().map(|e| e.username.as_str()).collect();
        assert_eq!(names, vec!["casey", "aria", "zed"]);
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[0].level, level_for_xp(900));
    }

    #[test]
    fn leaderboard_limit_is_clamped() {
        let profiles: Vec<Profile> = (0..5)
            .map(|i| {
                Profile::new(
                    UserId(i),
                    format!("user{i}"),
                    format!("user{i}@example.com"),
                    Vec::new(),
                    T,
                )
            })
            .collect();

        assert_eq!(rank_leaderboard(&profiles, 0).len(), 1);
        assert_eq!(rank_leaderboard(&profiles, 3).len(), 3);
        assert_eq!(rank_leaderboard(&profiles, 10_000).len(), 5);
    }
}
