// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Derived statistics for the dashboard charts and leaderboard.
//!
//! Nothing here is persisted; every value is recomputed from the activity
//! log on each request.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{ActivityRecord, ActivityType};

/// Running totals for one user name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserAggregate {
    pub name: String,
    /// Sum of distances (km)
    pub total_distance: f64,
    /// Sum of durations (minutes)
    pub total_duration: f64,
    pub activity_count: u32,
}

impl UserAggregate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            total_distance: 0.0,
            total_duration: 0.0,
            activity_count: 0,
        }
    }

    /// Fold one record into the totals.
    pub fn add(&mut self, record: &ActivityRecord) {
        self.total_distance += record.distance;
        self.total_duration += record.duration;
        self.activity_count += 1;
    }
}

/// Totals for one activity type (chart data).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityTypeTotals {
    pub activity_type: ActivityType,
    pub total_distance: f64,
    pub total_duration: f64,
    pub activity_count: u32,
}

impl ActivityTypeTotals {
    pub fn empty(activity_type: ActivityType) -> Self {
        Self {
            activity_type,
            total_distance: 0.0,
            total_duration: 0.0,
            activity_count: 0,
        }
    }

    pub fn add(&mut self, record: &ActivityRecord) {
        self.total_distance += record.distance;
        self.total_duration += record.duration;
        self.activity_count += 1;
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RankingEntry {
    pub name: String,
    /// Mean of the per-activity scores
    pub score: f64,
    /// Competition rank; tied scores share the best position
    pub rank: u32,
    /// Activities that contributed to the mean (zero-duration ones are skipped)
    pub scored_activities: u32,
}

/// Everything the dashboard shows for a single user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserSummary {
    pub totals: UserAggregate,
    /// Absent when none of the user's activities can be scored
    pub ranking: Option<RankingEntry>,
    pub by_activity_type: Vec<ActivityTypeTotals>,
    pub activities: Vec<ActivityRecord>,
}
