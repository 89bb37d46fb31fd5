//! # Progression Engine
//!
//! The leveling formula for FinLearn CORE.
//!
//! All arithmetic is exact integer arithmetic so that any independent
//! implementation of the same formula (e.g. a client-side progress bar)
//! agrees with this crate bit-for-bit on every input. Floats are banned
//! workspace-wide.

use serde::{Deserialize, Serialize};

// =============================================================================
// FORMULA CONSTANTS
// =============================================================================

/// XP required to advance from level 1 to level 2.
pub const BASE_XP_REQUIREMENT: u64 = 100;

/// Per-level growth factor numerator (the curve multiplies by 3/2 each level).
pub const GROWTH_NUMERATOR: u128 = 3;

// =============================================================================
// PER-LEVEL REQUIREMENT
// =============================================================================

/// XP required to advance from `level` to `level + 1`.
///
/// The curve is `floor(100 * 1.5^(level-1))`, evaluated exactly as
/// `(100 * 3^(level-1)) >> (level-1)` in 128-bit arithmetic. The single
/// final floor matters: re-flooring each step (`floor(prev * 1.5)`) drifts
/// below the closed form from level 5 onward (505 instead of 506).
///
/// Levels below 1 are treated as level 1. Once the exact product no longer
/// fits 128 bits (beyond level 77) the requirement saturates to `u64::MAX`;
/// the cumulative threshold at that point already exceeds any reachable
/// XP total, so the saturation is unobservable in practice.
#[must_use]
pub fn xp_requirement(level: u32) -> u64 {
    let exp = level.saturating_sub(1);

    let Some(power) = GROWTH_NUMERATOR.checked_pow(exp) else {
        return u64::MAX;
    };
    let Some(scaled) = power.checked_mul(u128::from(BASE_XP_REQUIREMENT)) else {
        return u64::MAX;
    };

    u64::try_from(scaled >> exp).unwrap_or(u64::MAX)
}

/// Cumulative XP at which `level` begins (0 for level 1).
///
/// This is the sum of `xp_requirement(1..level)`, saturating on overflow.
#[must_use]
pub fn cumulative_xp_for(level: u32) -> u64 {
    let mut total: u64 = 0;
    for step in 1..level {
        total = total.saturating_add(xp_requirement(step));
    }
    total
}

// =============================================================================
// PROGRESS SNAPSHOT
// =============================================================================

/// Snapshot of a user's position on the level curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    /// Current level (>= 1).
    pub level: u32,
    /// XP earned since the current level began.
    pub xp_in_level: u64,
    /// XP needed to finish the current level (> 0).
    pub xp_required_for_next: u64,
    /// Integer percent of the current level completed, always in `0..100`.
    pub percentage: u8,
}

/// Compute the full progress snapshot for a lifetime XP total.
///
/// The level is the largest `L` whose cumulative threshold does not exceed
/// `total_xp`. The loop advances one level per iteration and terminates in
/// O(log XP) steps because the requirement grows geometrically.
///
/// Deterministic and idempotent: equal inputs always produce equal outputs.
#[must_use]
pub fn progress_for_xp(total_xp: u64) -> LevelProgress {
    let mut level: u32 = 1;
    let mut threshold: u64 = 0;
    let mut requirement = xp_requirement(level);

    while let Some(next_threshold) = threshold.checked_add(requirement) {
        if next_threshold > total_xp {
            break;
        }
        threshold = next_threshold;
        level = level.saturating_add(1);
        requirement = xp_requirement(level);
    }

    let xp_in_level = total_xp - threshold;
    // Widened so the multiply cannot overflow; requirement is never zero.
    let percentage = ((u128::from(xp_in_level) * 100) / u128::from(requirement)) as u8;

    LevelProgress {
        level,
        xp_in_level,
        xp_required_for_next: requirement,
        percentage,
    }
}

/// Level for a lifetime XP total. Shorthand for `progress_for_xp(xp).level`.
#[must_use]
pub fn level_for_xp(total_xp: u64) -> u32 {
    progress_for_xp(total_xp).level
}

// =============================================================================
// LEVEL TABLE
// =============================================================================

/// One row of the level table: the reference view of the curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelStep {
    pub level: u32,
    /// XP required to advance past this level.
    pub requirement: u64,
    /// Cumulative XP at which this level begins.
    pub cumulative: u64,
}

/// Build the first `count` rows of the level table.
///
/// Used by display layers as the oracle against which any re-implementation
/// of the curve can be checked.
#[must_use]
pub fn level_table(count: u32) -> Vec<LevelStep> {
    let mut rows = Vec::new();
    let mut cumulative: u64 = 0;

    for level in 1..=count {
        let requirement = xp_requirement(level);
        rows.push(LevelStep {
            level,
            requirement,
            cumulative,
        });
        cumulative = cumulative.saturating_add(requirement);
    }

    rows
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Closed-form requirements, computed independently by hand:
    /// 100 * 1.5^k floored once at the end.
    const REQUIREMENTS: [u64; 15] = [
        100, 150, 225, 337, 506, 759, 1139, 1708, 2562, 3844, 5766, 8649, 12974, 19461, 29192,
    ];

    /// Cumulative thresholds derived from the table above.
    const THRESHOLDS: [u64; 10] = [0, 100, 250, 475, 812, 1318, 2077, 3216, 4924, 7486];

    #[test]
    fn requirement_matches_closed_form_table() {
        for (idx, expected) in REQUIREMENTS.iter().enumerate() {
            let level = (idx as u32) + 1;
            assert_eq!(xp_requirement(level), *expected, "level {level}");
        }
    }

    #[test]
    fn requirement_level_five_floors_once() {
        // Re-flooring every step gives 505 here; the closed form gives 506.
        assert_eq!(xp_requirement(5), 506);
    }

    #[test]
    fn requirement_level_zero_behaves_like_level_one() {
        assert_eq!(xp_requirement(0), BASE_XP_REQUIREMENT);
    }

    #[test]
    fn requirement_strictly_increases() {
        for level in 1..60 {
            assert!(xp_requirement(level + 1) > xp_requirement(level), "level {level}");
        }
    }

    #[test]
    fn requirement_saturates_instead_of_overflowing() {
        assert_eq!(xp_requirement(100), u64::MAX);
        assert_eq!(xp_requirement(u32::MAX), u64::MAX);
    }

    #[test]
    fn cumulative_matches_threshold_table() {
        for (idx, expected) in THRESHOLDS.iter().enumerate() {
            let level = (idx as u32) + 1;
            assert_eq!(cumulative_xp_for(level), *expected, "level {level}");
        }
    }

    #[test]
    fn zero_xp_is_level_one() {
        let progress = progress_for_xp(0);
        assert_eq!(progress.level, 1);
        assert_eq!(progress.xp_in_level, 0);
        assert_eq!(progress.xp_required_for_next, 100);
        assert_eq!(progress.percentage, 0);
    }

    #[test]
    fn level_boundaries_are_exact() {
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(249), 2);
        assert_eq!(level_for_xp(250), 3);
        assert_eq!(level_for_xp(474), 3);
        assert_eq!(level_for_xp(475), 4);
        assert_eq!(level_for_xp(812), 5);
        assert_eq!(level_for_xp(1318), 6);
    }

    #[test]
    fn xp_in_level_resets_at_each_boundary() {
        let progress = progress_for_xp(250);
        assert_eq!(progress.level, 3);
        assert_eq!(progress.xp_in_level, 0);
        assert_eq!(progress.xp_required_for_next, 225);
    }

    #[test]
    fn percentage_at_mid_level() {
        // 150 XP: level 2 began at 100, 50 of 150 earned.
        let progress = progress_for_xp(150);
        assert_eq!(progress.level, 2);
        assert_eq!(progress.xp_in_level, 50);
        assert_eq!(progress.percentage, 33);
    }

    #[test]
    fn percentage_never_reaches_one_hundred() {
        // One XP short of each of the first few boundaries.
        for threshold in [100u64, 250, 475, 812, 1318] {
            let progress = progress_for_xp(threshold - 1);
            assert!(progress.percentage < 100, "xp {}", threshold - 1);
        }
    }

    #[test]
    fn level_is_monotonic_over_a_dense_scan() {
        let mut previous = 0;
        for xp in 0..3000u64 {
            let level = level_for_xp(xp);
            assert!(level >= previous, "xp {xp}");
            previous = level;
        }
    }

    #[test]
    fn extreme_xp_does_not_panic() {
        let progress = progress_for_xp(u64::MAX);
        assert!(progress.level > 70);
        assert!(progress.percentage < 100);
    }

    #[test]
    fn level_table_rows_are_consistent() {
        let table = level_table(10);
        assert_eq!(table.len(), 10);
        for row in &table {
            assert_eq!(row.requirement, xp_requirement(row.level));
            assert_eq!(row.cumulative, cumulative_xp_for(row.level));
        }
    }
}
