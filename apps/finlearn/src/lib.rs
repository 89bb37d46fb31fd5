//! # FinLearn
//!
//! The application crate: an axum REST API and a clap CLI over the
//! deterministic progression engine in [`finlearn_core`]. Time, randomness,
//! and I/O all live here; the core stays pure.

pub mod api;
pub mod cli;
pub mod config;

pub use finlearn_core;
