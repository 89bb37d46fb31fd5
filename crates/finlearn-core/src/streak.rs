//! # Streak Tracking
//!
//! Consecutive-active-day bookkeeping as a three-state machine.
//!
//! Time never enters this crate through a clock; callers pass epoch
//! milliseconds, which keeps every transition replayable in tests.

use serde::{Deserialize, Serialize};

/// Milliseconds in one day.
pub const MILLIS_PER_DAY: i64 = 86_400_000;

// =============================================================================
// DAY GAP CLASSIFICATION
// =============================================================================

/// Whole-day gap classes between two activity timestamps.
///
/// There are exactly three transitions: same day keeps the streak,
/// the consecutive day extends it, anything longer restarts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayGap {
    /// Gap of zero whole days. Clock skew (now before last activity)
    /// lands here too and is deliberately harmless.
    SameDay,
    /// Gap of exactly one whole day.
    NextDay,
    /// Gap of two or more whole days.
    Lapsed,
}

/// Classify the whole-day gap between `last_active_ms` and `now_ms`.
///
/// Uses euclidean division so the floor matches on negative gaps as well.
#[must_use]
pub fn classify_gap(last_active_ms: i64, now_ms: i64) -> DayGap {
    let days = now_ms.saturating_sub(last_active_ms).div_euclid(MILLIS_PER_DAY);
    match days {
        1 => DayGap::NextDay,
        d if d > 1 => DayGap::Lapsed,
        _ => DayGap::SameDay,
    }
}

// =============================================================================
// STREAK STATE
// =============================================================================

/// A user's running streak: day counter plus last-activity timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    /// Consecutive active days. Zero until the first extension.
    pub days: u32,
    /// Epoch milliseconds of the most recent observed activity.
    pub last_active_ms: i64,
}

impl Streak {
    /// Fresh streak anchored at account-creation time.
    #[must_use]
    pub fn starting(now_ms: i64) -> Self {
        Self {
            days: 0,
            last_active_ms: now_ms,
        }
    }

    /// Record activity at `now_ms` and apply the matching transition.
    ///
    /// The last-active timestamp is updated on every call, whichever
    /// branch is taken.
    pub fn observe(&mut self, now_ms: i64) -> DayGap {
        let gap = classify_gap(self.last_active_ms, now_ms);
        match gap {
            DayGap::SameDay => {}
            DayGap::NextDay => self.days = self.days.saturating_add(1),
            DayGap::Lapsed => self.days = 1,
        }
        self.last_active_ms = now_ms;
        gap
    }
}

// =============================================================================
// TESTS
// =============================================================================
