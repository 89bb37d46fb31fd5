//! # Lesson Catalog
//!
//! Worlds, lessons, and challenges with their reward configuration.
//!
//! The catalog is collaborator data for the progression engine: handlers
//! resolve reward amounts here, never from inline literals. Lookup goes
//! through a `BTreeMap` index; iteration follows world order, so every
//! listing is deterministic.

use crate::primitives::{ChallengeId, LessonId, WorldId};
use crate::rewards::Reward;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// CONTENT TYPES
// =============================================================================

/// One lesson: metadata plus its configured completion reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: LessonId,
    pub title: String,
    pub description: String,
    /// 1 = introductory, 3 = advanced.
    pub difficulty: u8,
    pub reward: Reward,
    pub estimated_minutes: u32,
}

/// A themed group of lessons on the learning map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct World {
    pub id: WorldId,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub accent: String,
    /// Position on the map, 1-based.
    pub order: u32,
    /// Level at which the world unlocks.
    pub required_level: u32,
    /// Announced but not yet playable; never unlocks.
    pub coming_soon: bool,
    pub lessons: Vec<Lesson>,
}

impl World {
    /// Sum of the estimated minutes of all lessons.
    #[must_use]
    pub fn total_minutes(&self) -> u32 {
        self.lessons
            .iter()
            .fold(0, |total, lesson| total.saturating_add(lesson.estimated_minutes))
    }

    /// Whether a user at `level` can enter this world.
    #[must_use]
    pub fn unlocked_at(&self, level: u32) -> bool {
        !self.coming_soon && level >= self.required_level
    }
}

/// A long-running goal with a one-time reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: ChallengeId,
    pub title: String,
    pub description: String,
    /// Streak length the challenge asks for.
    pub target_days: u32,
    pub reward: Reward,
}

// =============================================================================
// CATALOG
// =============================================================================

/// The full content inventory with a lesson lookup index.
#[derive(Debug, Clone)]
pub struct Catalog {
    worlds: Vec<World>,
    challenges: Vec<Challenge>,
    /// LessonId -> (world index, lesson index).
    lesson_index: BTreeMap<LessonId, (usize, usize)>,
}

impl Catalog {
    /// Build a catalog from explicit content, indexing every lesson.
    #[must_use]
    pub fn new(mut worlds: Vec<World>, challenges: Vec<Challenge>) -> Self {
        worlds.sort_by_key(|world| world.order);

        let mut lesson_index = BTreeMap::new();
        for (world_idx, world) in worlds.iter().enumerate() {
            for (lesson_idx, lesson) in world.lessons.iter().enumerate() {
                lesson_index.insert(lesson.id.clone(), (world_idx, lesson_idx));
            }
        }

        Self {
            worlds,
            challenges,
            lesson_index,
        }
    }

    /// Worlds in map order.
    #[must_use]
    pub fn worlds(&self) -> &[World] {
        &self.worlds
    }

    #[must_use]
    pub fn world(&self, id: &WorldId) -> Option<&World> {
        self.worlds.iter().find(|world| &world.id == id)
    }

    /// Resolve a lesson together with the world it belongs to.
    #[must_use]
    pub fn lesson(&self, id: &LessonId) -> Option<(&World, &Lesson)> {
        let (world_idx, lesson_idx) = *self.lesson_index.get(id)?;
        let world = self.worlds.get(world_idx)?;
        let lesson = world.lessons.get(lesson_idx)?;
        Some((world, lesson))
    }

    /// Total number of lessons across all worlds.
    #[must_use]
    pub fn lesson_count(&self) -> usize {
        self.lesson_index.len()
    }

    #[must_use]
    pub fn challenges(&self) -> &[Challenge] {
        &self.challenges
    }

    #[must_use]
    pub fn challenge(&self, id: &ChallengeId) -> Option<&Challenge> {
        self.challenges.iter().find(|challenge| &challenge.id == id)
    }

    /// IDs of the worlds a user at `level` has unlocked, in map order.
    #[must_use]
    pub fn unlocked_world_ids(&self, level: u32) -> Vec<WorldId> {
        self.worlds
            .iter()
            .filter(|world| world.unlocked_at(level))
            .map(|world| world.id.clone())
            .collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

// =============================================================================
// BUILT-IN CONTENT
// =============================================================================

fn lesson(
    id: &str,
    title: &str,
    description: &str,
    difficulty: u8,
    xp: u64,
    coins: u64,
    minutes: u32,
) -> Lesson {
    Lesson {
        id: LessonId::new(id),
        title: title.into(),
        description: description.into(),
        difficulty,
        reward: Reward::new(xp, coins),
        estimated_minutes: minutes,
    }
}

impl Catalog {
    /// The shipped learning map: the financial-mountain curriculum.
    #[must_use]
    pub fn builtin() -> Self {
        let budgeting = World {
            id: WorldId::new("budgeting"),
            title: "Budget Base Camp".into(),
            description: "Start your financial journey at the foundation of money management"
                .into(),
            icon: "🏕️".into(),
            accent: "emerald".into(),
            order: 1,
            required_level: 1,
            coming_soon: false,
            lessons: vec![
                lesson(
                    "budgeting_1",
                    "Base Camp Basics: Your Financial Foundation",
                    "Learn the fundamentals of budgeting at Base Camp",
                    1,
                    50,
                    10,
                    4,
                ),
                lesson(
                    "budgeting_2",
                    "Trail Mapping: Income vs Expenses",
                    "Navigate the flowing streams of income and the rocky paths of expenses",
                    1,
                    60,
                    15,
                    5,
                ),
                lesson(
                    "budgeting_3",
                    "The 50/30/20 Mountain Trail Rule",
                    "Master the legendary trail allocation method",
                    2,
                    80,
                    20,
                    6,
                ),
                lesson(
                    "budgeting_4",
                    "Fixed vs Variable: Steady Rocks vs Shifting Weather",
                    "Distinguish steady foundations from changing weather patterns",
                    2,
                    70,
                    18,
                    5,
                ),
                lesson(
                    "budgeting_5",
                    "Emergency Shelter: Building Your Financial Safety Net",
                    "Construct an emergency shelter for unexpected storms",
                    2,
                    90,
                    25,
                    7,
                ),
                lesson(
                    "budgeting_6",
                    "Trail Tracking: Following Your Financial Footsteps",
                    "Master expense tracking to stay on the path",
                    3,
                    85,
                    22,
                    6,
                ),
            ],
        };

        let credit = World {
            id: WorldId::new("credit"),
            title: "Credit Cliff Climbing".into(),
            description: "Scale the challenging terrain of credit scores and debt management"
                .into(),
            icon: "🧗".into(),
            accent: "blue".into(),
            order: 2,
            required_level: 1,
            coming_soon: false,
            lessons: vec![
                lesson(
                    "credit_1",
                    "Credit Cliff Introduction: Understanding the Ledge",
                    "The basics of credit, a tool that can elevate or endanger your climb",
                    1,
                    60,
                    15,
                    5,
                ),
                lesson(
                    "credit_2",
                    "Credit Score Compass: Your Financial Navigation Tool",
                    "Master the 300-850 scale that guides your climbing opportunities",
                    1,
                    70,
                    18,
                    6,
                ),
            ],
        };

        let investing = World {
            id: WorldId::new("investing"),
            title: "Investment Peak Expedition".into(),
            description: "Reach new heights by growing your wealth through smart investments"
                .into(),
            icon: "⛰️".into(),
            accent: "purple".into(),
            order: 3,
            required_level: 2,
            coming_soon: false,
            lessons: vec![lesson(
                "investing_1",
                "Investment Peak Preparation: Why Climb Higher?",
                "Why investing makes your money grow while you sleep",
                1,
                75,
                20,
                6,
            )],
        };

        let saving = World {
            id: WorldId::new("saving"),
            title: "Savings Summit".into(),
            description: "Build lasting saving habits on the climb to financial freedom".into(),
            icon: "🏔️".into(),
            accent: "teal".into(),
            order: 4,
            required_level: 2,
            coming_soon: false,
            lessons: vec![lesson(
                "saving_1",
                "Savings Base Camp: Building Your Financial Foundation",
                "Establish your base camp with smart saving strategies",
                1,
                65,
                16,
                5,
            )],
        };

        let taxes = World {
            id: WorldId::new("taxes"),
            title: "Tax Territory Trek".into(),
            description: "Navigate the complex mountain paths of tax optimization".into(),
            icon: "🗺️".into(),
            accent: "orange".into(),
            order: 5,
            required_level: u32::MAX,
            coming_soon: true,
            lessons: Vec::new(),
        };

        let challenges = vec![Challenge {
            id: ChallengeId::new("weekly_streak"),
            title: "7-Day Learning Streak".into(),
            description: "Complete at least one lesson every day for 7 days".into(),
            target_days: 7,
            reward: Reward::new(100, 50),
        }];

        Self::new(vec![budgeting, credit, investing, saving, taxes], challenges)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_indexed() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.worlds().len(), 5);
        assert_eq!(catalog.lesson_count(), 10);
    }

    #[test]
    fn lesson_lookup_resolves_world_and_reward() {
        let catalog = Catalog::builtin();
        let found = catalog.lesson(&LessonId::new("budgeting_3"));

        assert!(found.is_some());
        let world_id = found.map(|(world, _)| world.id.clone());
        let reward = found.map(|(_, lesson)| lesson.reward);
        assert_eq!(world_id, Some(WorldId::new("budgeting")));
        assert_eq!(reward, Some(Reward::new(80, 20)));
    }

    #[test]
    fn unknown_lesson_is_none() {
        let catalog = Catalog::builtin();
        assert!(catalog.lesson(&LessonId::new("no_such_lesson")).is_none());
    }

    #[test]
    fn worlds_iterate_in_map_order() {
        let catalog = Catalog::builtin();
        let orders: Vec<u32> = catalog.worlds().iter().map(|w| w.order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn unlock_rule_follows_required_level() {
        let catalog = Catalog::builtin();

        let at_one: Vec<String> = catalog
            .unlocked_world_ids(1)
            .into_iter()
            .map(|id| id.0)
            .collect();
        assert_eq!(at_one, vec!["budgeting", "credit"]);

        let at_two = catalog.unlocked_world_ids(2);
        assert_eq!(at_two.len(), 4);
    }

    #[test]
    fn coming_soon_world_never_unlocks() {
        let catalog = Catalog::builtin();
        let taxes = catalog.world(&WorldId::new("taxes"));
        assert_eq!(taxes.map(|w| w.unlocked_at(u32::MAX)), Some(false));
    }

    #[test]
    fn world_minutes_sum_lessons() {
        let catalog = Catalog::builtin();
        let budgeting = catalog.world(&WorldId::new("budgeting"));
        assert_eq!(budgeting.map(World::total_minutes), Some(33));
    }

    #[test]
    fn challenge_lookup_by_id() {
        let catalog = Catalog::builtin();
        let challenge = catalog.challenge(&ChallengeId::new("weekly_streak"));
        assert_eq!(challenge.map(|c| c.reward), Some(Reward::new(100, 50)));
        assert!(catalog.challenge(&ChallengeId::new("nope")).is_none());
    }
}
