//! # Server Configuration
//!
//! Environment-driven settings with safe defaults. A malformed value is
//! logged and replaced by its default rather than aborting startup.

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use tracing::{info, warn};

const CORS_ORIGINS_VAR: &str = "FINLEARN_CORS_ORIGINS";
const RATE_LIMIT_VAR: &str = "FINLEARN_RATE_LIMIT_PER_MINUTE";

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:3001";
const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 100;

/// Settings consumed by the HTTP layer.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Origins allowed through CORS.
    pub cors_origins: Vec<String>,
    /// Per-IP request budget per minute.
    pub rate_limit_per_minute: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            cors_origins: split_origins(DEFAULT_CORS_ORIGINS),
            rate_limit_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
        }
    }
}

impl ServerConfig {
    /// Read configuration from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        let cors_origins = match env::var(CORS_ORIGINS_VAR) {
            Ok(raw) => {
                let origins = split_origins(&raw);
                if origins.is_empty() {
                    warn!(var = CORS_ORIGINS_VAR, "empty origin list, using defaults");
                    split_origins(DEFAULT_CORS_ORIGINS)
                } else {
                    origins
                }
            }
            Err(_) => split_origins(DEFAULT_CORS_ORIGINS),
        };

        let rate_limit_per_minute = parse_var(RATE_LIMIT_VAR, DEFAULT_RATE_LIMIT_PER_MINUTE);

        info!(
            origins = cors_origins.len(),
            rate_limit_per_minute, "server configuration loaded"
        );
        Self {
            cors_origins,
            rate_limit_per_minute,
        }
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn parse_var<T>(var: &str, default: T) -> T
where
    T: FromStr + Display + Copy,
{
    match env::var(var) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(var, %raw, %default, "unparseable value, using default");
                default
            }
        },
        Err(_) => default,
    }
}
