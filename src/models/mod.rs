// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod stats;

pub use activity::{ActivityRecord, ActivityType, NewActivity};
pub use stats::{ActivityTypeTotals, RankingEntry, UserAggregate, UserSummary};
