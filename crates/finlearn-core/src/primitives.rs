//! # Core Primitives
//!
//! Identifier newtypes and shared bounds for the FinLearn progression engine.
//!
//! All identifiers are ordered so they can serve as `BTreeMap` keys, keeping
//! every collection in the crate deterministically ordered.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// BOUNDS
// =============================================================================

/// Default number of entries returned by leaderboard queries.
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

/// Upper bound on leaderboard queries. Requests above this are clamped.
pub const MAX_LEADERBOARD_LIMIT: usize = 100;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Numeric user identifier, allocated by the profile repository.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Textual lesson identifier, e.g. `budgeting_1`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LessonId(pub String);

impl LessonId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LessonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Textual world identifier, e.g. `budgeting`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldId(pub String);

impl WorldId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Textual challenge identifier, e.g. `weekly_streak`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChallengeId(pub String);

impl ChallengeId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChallengeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_ids_order_numerically() {
        assert!(UserId(2) < UserId(10));
    }

    #[test]
    fn lesson_ids_order_lexicographically() {
        let a = LessonId::new("budgeting_1");
        let b = LessonId::new("credit_1");
        assert!(a < b);
    }

    #[test]
    fn display_matches_inner_value() {
        assert_eq!(UserId(7).to_string(), "7");
        assert_eq!(WorldId::new("investing").to_string(), "investing");
    }
}
