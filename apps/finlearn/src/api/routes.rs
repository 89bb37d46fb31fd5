//! # REST Routes
//!
//! The world map, lesson flow, per-user progress, daily check-in,
//! leaderboard, and challenges. DTOs here are the wire contract: camelCase
//! field names, with the envelope added by [`super::error`].

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use finlearn_core::{
    rank_leaderboard, ChallengeId, CompletionVerdict, DayGap, GrantOutcome, LeaderboardEntry,
    Lesson, LessonId, LevelProgress, Profile, RewardPolicy, World, WorldId,
    DEFAULT_LEADERBOARD_LIMIT,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::auth::AuthedUser;
use super::error::{ok, ApiEnvelope, ApiError};
use super::{now_ms, AppState};

// =============================================================================
// ROUTE TABLES
// =============================================================================

pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/api/health", get(health))
}

pub fn world_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/worlds", get(list_worlds))
        .route("/api/worlds/{id}/lessons", get(list_world_lessons))
        .route("/api/lessons/{id}", get(lesson_detail))
        .route("/api/lessons/{id}/complete", post(complete_lesson))
}

pub fn user_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/user/progress", get(user_progress))
        .route("/api/user/stats", get(user_stats))
        .route("/api/user/check-in", post(check_in))
}

pub fn gamification_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/gamification/leaderboard", get(leaderboard))
        .route("/api/gamification/challenges", get(list_challenges))
        .route(
            "/api/gamification/challenges/{id}/complete",
            post(complete_challenge),
        )
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthDto {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldSummaryDto {
    pub id: WorldId,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub accent: String,
    pub order: u32,
    pub required_level: u32,
    pub coming_soon: bool,
    pub lessons_count: usize,
    pub estimated_minutes: u32,
}

impl WorldSummaryDto {
    fn from_world(world: &World) -> Self {
        Self {
            id: world.id.clone(),
            title: world.title.clone(),
            description: world.description.clone(),
            icon: world.icon.clone(),
            accent: world.accent.clone(),
            order: world.order,
            required_level: world.required_level,
            coming_soon: world.coming_soon,
            lessons_count: world.lessons.len(),
            estimated_minutes: world.total_minutes(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonDto {
    pub id: LessonId,
    pub world_id: WorldId,
    pub title: String,
    pub description: String,
    pub difficulty: u8,
    pub xp_reward: u64,
    pub coin_reward: u64,
    pub estimated_minutes: u32,
}

impl LessonDto {
    fn from_lesson(world: &World, lesson: &Lesson) -> Self {
        Self {
            id: lesson.id.clone(),
            world_id: world.id.clone(),
            title: lesson.title.clone(),
            description: lesson.description.clone(),
            difficulty: lesson.difficulty,
            xp_reward: lesson.reward.xp,
            coin_reward: lesson.reward.coins,
            estimated_minutes: lesson.estimated_minutes,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CompleteLessonRequest {
    pub score: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionDto {
    pub xp_gained: u64,
    pub coins_gained: u64,
    #[serde(rename = "newXP")]
    pub new_xp: u64,
    pub new_coins: u64,
    pub new_level: u32,
    pub leveled_up: bool,
    pub message: String,
}

impl CompletionDto {
    fn from_outcome(outcome: &GrantOutcome, message: String) -> Self {
        Self {
            xp_gained: outcome.granted.xp,
            coins_gained: outcome.granted.coins,
            new_xp: outcome.total_xp,
            new_coins: outcome.total_coins,
            new_level: outcome.progress.level,
            leveled_up: outcome.leveled_up,
            message,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgressDto {
    pub level: u32,
    pub xp_in_level: u64,
    pub xp_required_for_next: u64,
    pub percentage: u8,
}

impl LevelProgressDto {
    fn from_progress(progress: LevelProgress) -> Self {
        Self {
            level: progress.level,
            xp_in_level: progress.xp_in_level,
            xp_required_for_next: progress.xp_required_for_next,
            percentage: progress.percentage,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgressDto {
    pub xp: u64,
    pub coins: u64,
    pub level: u32,
    pub progress: LevelProgressDto,
    pub streak: u32,
    pub completed_lessons: Vec<LessonId>,
    pub unlocked_worlds: Vec<WorldId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsDto {
    pub lessons_completed: usize,
    pub total_lessons: usize,
    pub completion_percentage: u8,
    pub challenges_completed: usize,
    pub streak: u32,
    pub level: u32,
    pub xp: u64,
    pub coins: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInDto {
    pub gap: &'static str,
    pub streak: u32,
    pub xp_gained: u64,
    pub coins_gained: u64,
    #[serde(rename = "newXP")]
    pub new_xp: u64,
    pub new_coins: u64,
    pub new_level: u32,
    pub leveled_up: bool,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntryDto {
    pub rank: u32,
    pub user_id: u64,
    pub username: String,
    pub level: u32,
    pub xp: u64,
    pub streak: u32,
}

impl LeaderboardEntryDto {
    fn from_entry(entry: LeaderboardEntry) -> Self {
        Self {
            rank: entry.rank,
            user_id: entry.user.0,
            username: entry.username,
            level: entry.level,
            xp: entry.xp,
            streak: entry.streak_days,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeDto {
    pub id: ChallengeId,
    pub title: String,
    pub description: String,
    pub target_days: u32,
    pub xp_reward: u64,
    pub coin_reward: u64,
}

// =============================================================================
// HELPERS
// =============================================================================

fn validate_score(score: Option<i64>) -> Result<u8, ApiError> {
    match score {
        Some(value) if (0..=100).contains(&value) => Ok(value as u8),
        _ => Err(ApiError::Validation(
            "Score must be between 0 and 100".to_string(),
        )),
    }
}

fn completion_message(verdict: CompletionVerdict, leveled_up: bool, policy: &RewardPolicy) -> String {
    match verdict {
        CompletionVerdict::AlreadyCompleted => "Lesson already completed".to_string(),
        CompletionVerdict::BelowPassMark => format!(
            "Keep practicing! Score {} or higher to pass.",
            policy.pass_score
        ),
        CompletionVerdict::Passed { .. } if leveled_up => {
            "Congratulations! You leveled up!".to_string()
        }
        CompletionVerdict::Passed { .. } => "Lesson completed!".to_string(),
    }
}

fn gap_label(gap: DayGap) -> &'static str {
    match gap {
        DayGap::SameDay => "same_day",
        DayGap::NextDay => "next_day",
        DayGap::Lapsed => "lapsed",
    }
}

/// Fetch the caller's profile under the repository lock.
async fn load_profile(state: &AppState, user: AuthedUser) -> Result<Profile, ApiError> {
    let repo = state.repo.lock().await;
    repo.get(user.0)?.ok_or(ApiError::InvalidToken)
}

// =============================================================================
// HANDLERS
// =============================================================================

async fn health(State(state): State<Arc<AppState>>) -> Json<ApiEnvelope<HealthDto>> {
    ok(HealthDto {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339(),
        uptime_seconds: state.started.elapsed().as_secs(),
    })
}

async fn list_worlds(
    State(state): State<Arc<AppState>>,
) -> Json<ApiEnvelope<Vec<WorldSummaryDto>>> {
    let worlds = state
        .catalog
        .worlds()
        .iter()
        .map(WorldSummaryDto::from_world)
        .collect();
    ok(worlds)
}

async fn list_world_lessons(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiEnvelope<Vec<LessonDto>>>, ApiError> {
    let world = state
        .catalog
        .world(&WorldId::new(id))
        .ok_or(ApiError::NotFound("World"))?;
    let lessons = world
        .lessons
        .iter()
        .map(|lesson| LessonDto::from_lesson(world, lesson))
        .collect();
    Ok(ok(lessons))
}

async fn lesson_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiEnvelope<LessonDto>>, ApiError> {
    let (world, lesson) = state
        .catalog
        .lesson(&LessonId::new(id))
        .ok_or(ApiError::NotFound("Lesson"))?;
    Ok(ok(LessonDto::from_lesson(world, lesson)))
}

async fn complete_lesson(
    user: AuthedUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<CompleteLessonRequest>,
) -> Result<Json<ApiEnvelope<CompletionDto>>, ApiError> {
    let score = validate_score(req.score)?;
    let lesson_id = LessonId::new(id);
    let (_, lesson) = state
        .catalog
        .lesson(&lesson_id)
        .ok_or(ApiError::NotFound("Lesson"))?;

    let completion = {
        let mut repo = state.repo.lock().await;
        let mut profile = repo.get(user.0)?.ok_or(ApiError::InvalidToken)?;
        let completion =
            profile.complete_lesson(&lesson_id, lesson.reward, score, &state.policy, now_ms());
        repo.save(&profile)?;
        completion
    };

    info!(
        user = user.0 .0,
        lesson = lesson_id.as_str(),
        score,
        xp = completion.outcome.granted.xp,
        "lesson completion"
    );

    let message =
        completion_message(completion.verdict, completion.outcome.leveled_up, &state.policy);
    Ok(ok(CompletionDto::from_outcome(&completion.outcome, message)))
}

async fn user_progress(
    user: AuthedUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiEnvelope<UserProgressDto>>, ApiError> {
    let profile = load_profile(&state, user).await?;
    let progress = profile.progress();

    Ok(ok(UserProgressDto {
        xp: profile.xp,
        coins: profile.coins,
        level: progress.level,
        progress: LevelProgressDto::from_progress(progress),
        streak: profile.streak.days,
        completed_lessons: profile.completed_lessons.iter().cloned().collect(),
        unlocked_worlds: state.catalog.unlocked_world_ids(progress.level),
    }))
}

async fn user_stats(
    user: AuthedUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiEnvelope<UserStatsDto>>, ApiError> {
    let profile = load_profile(&state, user).await?;
    let total_lessons = state.catalog.lesson_count();

    Ok(ok(UserStatsDto {
        lessons_completed: profile.completed_lessons.len(),
        total_lessons,
        completion_percentage: profile.completion_percentage(total_lessons),
        challenges_completed: profile.completed_challenges.len(),
        streak: profile.streak.days,
        level: profile.level,
        xp: profile.xp,
        coins: profile.coins,
    }))
}

async fn check_in(
    user: AuthedUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiEnvelope<CheckInDto>>, ApiError> {
    let check_in = {
        let mut repo = state.repo.lock().await;
        let mut profile = repo.get(user.0)?.ok_or(ApiError::InvalidToken)?;
        let check_in = profile.check_in(&state.policy, now_ms());
        repo.save(&profile)?;
        check_in
    };

    info!(
        user = user.0 .0,
        gap = gap_label(check_in.gap),
        streak = check_in.streak_days,
        "check-in"
    );

    Ok(ok(CheckInDto {
        gap: gap_label(check_in.gap),
        streak: check_in.streak_days,
        xp_gained: check_in.outcome.granted.xp,
        coins_gained: check_in.outcome.granted.coins,
        new_xp: check_in.outcome.total_xp,
        new_coins: check_in.outcome.total_coins,
        new_level: check_in.outcome.progress.level,
        leveled_up: check_in.outcome.leveled_up,
    }))
}

async fn leaderboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<ApiEnvelope<Vec<LeaderboardEntryDto>>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT);
    let profiles = {
        let repo = state.repo.lock().await;
        repo.all()?
    };

    let entries = rank_leaderboard(&profiles, limit)
        .into_iter()
        .map(LeaderboardEntryDto::from_entry)
        .collect();
    Ok(ok(entries))
}

async fn list_challenges(
    State(state): State<Arc<AppState>>,
) -> Json<ApiEnvelope<Vec<ChallengeDto>>> {
    let challenges = state
        .catalog
        .challenges()
        .iter()
        .map(|challenge| ChallengeDto {
            id: challenge.id.clone(),
            title: challenge.title.clone(),
            description: challenge.description.clone(),
            target_days: challenge.target_days,
            xp_reward: challenge.reward.xp,
            coin_reward: challenge.reward.coins,
        })
        .collect();
    ok(challenges)
}

async fn complete_challenge(
    user: AuthedUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiEnvelope<CompletionDto>>, ApiError> {
    let challenge_id = ChallengeId::new(id);
    let challenge = state
        .catalog
        .challenge(&challenge_id)
        .ok_or(ApiError::NotFound("Challenge"))?;

    let completion = {
        let mut repo = state.repo.lock().await;
        let mut profile = repo.get(user.0)?.ok_or(ApiError::InvalidToken)?;
        let completion = profile.complete_challenge(&challenge_id, challenge.reward, now_ms());
        repo.save(&profile)?;
        completion
    };

    let message = if completion.first_completion {
        "Challenge completed!".to_string()
    } else {
        "Challenge already completed".to_string()
    };
    Ok(ok(CompletionDto::from_outcome(&completion.outcome, message)))
}

// =============================================================================
// TESTS
// =============================================================================
