// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Logged activity model for storage and API.

use crate::error::AppError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationError};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Kind of exercise. The set is closed; the schema enforces the same values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ActivityType {
    Running,
    Cycling,
    Swimming,
    Walking,
}

impl ActivityType {
    /// Every activity type, in display order.
    pub const ALL: [ActivityType; 4] = [
        ActivityType::Running,
        ActivityType::Cycling,
        ActivityType::Swimming,
        ActivityType::Walking,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Running => "Running",
            ActivityType::Cycling => "Cycling",
            ActivityType::Swimming => "Swimming",
            ActivityType::Walking => "Walking",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActivityType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| AppError::Validation(format!("Unknown activity type: {:?}", s)))
    }
}

/// Stored activity record. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityRecord {
    /// Store-assigned ID, strictly increasing and never reused
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: i64,
    /// Free-text user name (grouping key, not unique)
    pub name: String,
    pub activity_type: ActivityType,
    /// Duration in minutes
    pub duration: f64,
    /// Distance in kilometers
    pub distance: f64,
    pub date: NaiveDate,
}

/// Upper bound on a single activity's duration. Keeps every sum of stored
/// durations finite. Mirrored by the CHECK constraint on `activities`.
pub const MAX_DURATION_MINUTES: f64 = 100_000.0;

/// Upper bound on a single activity's distance; see [`MAX_DURATION_MINUTES`].
pub const MAX_DISTANCE_KM: f64 = 100_000.0;

/// A new activity as submitted by the logging form.
///
/// The activity type stays a raw string here so that an unknown type is
/// reported as a validation error rather than a deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct NewActivity {
    pub name: String,
    #[validate(custom(function = "validate_activity_type"))]
    pub activity_type: String,
    /// Duration in minutes, at most `MAX_DURATION_MINUTES`
    #[validate(range(min = 0.0, max = 100000.0), custom(function = "validate_finite"))]
    pub duration: f64,
    /// Distance in kilometers, at most `MAX_DISTANCE_KM`
    #[validate(range(min = 0.0, max = 100000.0), custom(function = "validate_finite"))]
    pub distance: f64,
    /// Defaults to today when omitted
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl NewActivity {
    pub fn new(
        name: impl Into<String>,
        activity_type: ActivityType,
        duration: f64,
        distance: f64,
        date: Option<NaiveDate>,
    ) -> Self {
        Self {
            name: name.into(),
            activity_type: activity_type.as_str().to_string(),
            duration,
            distance,
            date,
        }
    }
}

fn validate_activity_type(value: &str) -> Result<(), ValidationError> {
    if value.parse::<ActivityType>().is_ok() {
        Ok(())
    } else {
        Err(ValidationError::new("activity_type")
            .with_message("must be one of Running, Cycling, Swimming, Walking".into()))
    }
}

fn validate_finite(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new("finite").with_message("must be a finite number".into()))
    }
}
