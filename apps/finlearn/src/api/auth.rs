//! # Authentication
//!
//! Register / login / me plus the bearer-token extractor used by every
//! protected route. Credentials are stored as `salt || SHA-256(salt || password)`
//! and compared in constant time; tokens are random 256-bit values kept in an
//! in-memory session table.
//!
//! Logging in counts as daily activity: the login handler runs the same
//! check-in transition as `POST /api/user/check-in`, so streaks extend (and
//! the streak bonus lands) without a separate call.

use std::sync::Arc;

use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use finlearn_core::{Profile, UserId};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::info;

use super::error::{ok, ok_with_message, ApiEnvelope, ApiError};
use super::{now_ms, AppState};

// =============================================================================
// CREDENTIALS AND TOKENS
// =============================================================================

const SALT_LEN: usize = 16;
const DIGEST_LEN: usize = 32;
const TOKEN_LEN: usize = 32;
const MIN_PASSWORD_LEN: usize = 6;
const MIN_USERNAME_LEN: usize = 2;

/// Hash a password into the stored credential blob.
#[must_use]
pub fn hash_credential(password: &str) -> Vec<u8> {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);

    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();

    let mut blob = Vec::with_capacity(SALT_LEN + DIGEST_LEN);
    blob.extend_from_slice(&salt);
    blob.extend_from_slice(&digest);
    blob
}

/// Constant-time check of a password against a stored credential blob.
#[must_use]
pub fn verify_credential(stored: &[u8], password: &str) -> bool {
    if stored.len() != SALT_LEN + DIGEST_LEN {
        return false;
    }
    let (salt, expected) = stored.split_at(SALT_LEN);

    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();

    expected.ct_eq(digest.as_slice()).into()
}

/// Mint an opaque bearer token.
#[must_use]
pub fn issue_token() -> String {
    let mut bytes = [0u8; TOKEN_LEN];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// =============================================================================
// EXTRACTOR
// =============================================================================

/// Identity of the caller, resolved from the `Authorization: Bearer` header.
#[derive(Debug, Clone, Copy)]
pub struct AuthedUser(pub UserId);

impl FromRequestParts<Arc<AppState>> for AuthedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::MissingToken)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::MissingToken)?;

        let sessions = state.sessions.lock().await;
        let id = sessions.get(token).copied().ok_or(ApiError::InvalidToken)?;
        Ok(Self(id))
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub xp: u64,
    pub coins: u64,
    pub level: u32,
    pub streak: u32,
    pub created_at: i64,
}

impl UserDto {
    pub(crate) fn from_profile(profile: &Profile) -> Self {
        Self {
            id: profile.id.0,
            username: profile.username.clone(),
            email: profile.email.clone(),
            xp: profile.xp,
            coins: profile.coins,
            level: profile.level,
            streak: profile.streak.days,
            created_at: profile.created_ms,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthData {
    pub user: UserDto,
    pub token: String,
}

// =============================================================================
// ROUTES
// =============================================================================

pub fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiEnvelope<AuthData>>), ApiError> {
    let (Some(email), Some(password), Some(username)) = (req.email, req.password, req.username)
    else {
        return Err(ApiError::Validation(
            "Email, password, and username are required".to_string(),
        ));
    };

    let email = normalize_email(&email);
    let username = username.trim().to_string();

    if !email.contains('@') {
        return Err(ApiError::Validation("A valid email is required".to_string()));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }
    if username.len() < MIN_USERNAME_LEN {
        return Err(ApiError::Validation(
            "Username must be at least 2 characters".to_string(),
        ));
    }

    let credential = hash_credential(&password);
    let profile = {
        let mut repo = state.repo.lock().await;
        repo.create(&username, &email, credential, now_ms())?
    };

    let token = issue_token();
    state.sessions.lock().await.insert(token.clone(), profile.id);
    info!(user = profile.id.0, %username, "user registered");

    let data = AuthData {
        user: UserDto::from_profile(&profile),
        token,
    };
    Ok((
        StatusCode::CREATED,
        ok_with_message(data, "User registered successfully"),
    ))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiEnvelope<AuthData>>, ApiError> {
    let (Some(email), Some(password)) = (req.email, req.password) else {
        return Err(ApiError::Validation(
            "Email and password are required".to_string(),
        ));
    };
    let email = normalize_email(&email);

    let profile = {
        let mut repo = state.repo.lock().await;
        let Some(mut profile) = repo.find_by_email(&email)? else {
            return Err(ApiError::InvalidCredentials);
        };
        if !verify_credential(&profile.credential, &password) {
            return Err(ApiError::InvalidCredentials);
        }

        // Logging in is the user's daily activity signal.
        let check_in = profile.check_in(&state.policy, now_ms());
        repo.save(&profile)?;
        info!(
            user = profile.id.0,
            streak = check_in.streak_days,
            "user logged in"
        );
        profile
    };

    let token = issue_token();
    state.sessions.lock().await.insert(token.clone(), profile.id);

    let data = AuthData {
        user: UserDto::from_profile(&profile),
        token,
    };
    Ok(ok_with_message(data, "Login successful"))
}

async fn me(
    AuthedUser(user_id): AuthedUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiEnvelope<UserDto>>, ApiError> {
    let profile = {
        let repo = state.repo.lock().await;
        repo.get(user_id)?.ok_or(ApiError::InvalidToken)?
    };
    Ok(ok(UserDto::from_profile(&profile)))
}

// =============================================================================
// TESTS
// =============================================================================
