//! # Reward Policy
//!
//! XP and coin grants for completed learning activities.
//!
//! Every threshold and bonus lives here as a named constant on
//! [`RewardPolicy`]; nothing downstream hardcodes reward numbers. The
//! evaluation itself is a pure function so the same policy can be applied
//! by any caller and tested in isolation.

use serde::{Deserialize, Serialize};

// =============================================================================
// POLICY CONSTANTS
// =============================================================================

/// Minimum score that counts as passing a lesson.
pub const PASS_SCORE: u8 = 70;

/// Score that earns the perfect-completion bonus.
pub const PERFECT_SCORE: u8 = 100;

/// Bonus granted on top of the lesson reward for a perfect score.
pub const PERFECT_BONUS: Reward = Reward { xp: 25, coins: 5 };

/// Bonus granted when a learning streak extends by one day.
pub const STREAK_BONUS: Reward = Reward { xp: 10, coins: 2 };

// =============================================================================
// REWARD AMOUNTS
// =============================================================================

/// A pair of XP and coin amounts. Coins are an independent currency and are
/// never derived from XP.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub xp: u64,
    pub coins: u64,
}

impl Reward {
    /// The empty grant.
    pub const ZERO: Self = Self { xp: 0, coins: 0 };

    #[must_use]
    pub const fn new(xp: u64, coins: u64) -> Self {
        Self { xp, coins }
    }

    /// Component-wise saturating sum.
    #[must_use]
    pub fn saturating_add(self, other: Self) -> Self {
        Self {
            xp: self.xp.saturating_add(other.xp),
            coins: self.coins.saturating_add(other.coins),
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.xp == 0 && self.coins == 0
    }
}

// =============================================================================
// REWARD POLICY
// =============================================================================

/// The configurable completion policy.
///
/// Defaults reproduce the production values: pass at 70, perfect at 100
/// with +25 XP / +5 coins, streak extension worth +10 XP / +2 coins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPolicy {
    pub pass_score: u8,
    pub perfect_score: u8,
    pub perfect_bonus: Reward,
    pub streak_bonus: Reward,
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self {
            pass_score: PASS_SCORE,
            perfect_score: PERFECT_SCORE,
            perfect_bonus: PERFECT_BONUS,
            streak_bonus: STREAK_BONUS,
        }
    }
}

// =============================================================================
// COMPLETION EVALUATION
// =============================================================================

/// Outcome classes for a lesson completion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionVerdict {
    /// The lesson was completed before; rewards are at-most-once.
    AlreadyCompleted,
    /// The score did not reach the pass mark; nothing is recorded.
    BelowPassMark,
    /// First passing completion; `perfect` marks a bonus-earning score.
    Passed { perfect: bool },
}

impl RewardPolicy {
    /// Classify a completion attempt.
    ///
    /// A repeat completion short-circuits before the score is considered,
    /// so replays grant nothing regardless of score.
    #[must_use]
    pub fn evaluate(&self, score: u8, already_completed: bool) -> CompletionVerdict {
        if already_completed {
            return CompletionVerdict::AlreadyCompleted;
        }
        if score < self.pass_score {
            return CompletionVerdict::BelowPassMark;
        }
        CompletionVerdict::Passed {
            perfect: score >= self.perfect_score,
        }
    }

    /// Reward due for a verdict, given the lesson's configured amounts.
    #[must_use]
    pub fn completion_reward(&self, lesson_reward: Reward, verdict: CompletionVerdict) -> Reward {
        match verdict {
            CompletionVerdict::AlreadyCompleted | CompletionVerdict::BelowPassMark => Reward::ZERO,
            CompletionVerdict::Passed { perfect: false } => lesson_reward,
            CompletionVerdict::Passed { perfect: true } => {
                lesson_reward.saturating_add(self.perfect_bonus)
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
