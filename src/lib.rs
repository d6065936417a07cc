// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity Tracker: log workouts and rank users by pace
//!
//! This crate provides the backend API for an append-only fitness activity
//! log and the statistics (per-user totals, chart data and a leaderboard)
//! derived from it.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::ActivityStore;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: ActivityStore,
}
