// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for logging activities and reading statistics.

use crate::error::{AppError, Result};
use crate::models::{
    ActivityRecord, ActivityTypeTotals, NewActivity, RankingEntry, UserAggregate, UserSummary,
};
use crate::services::ranking;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes. No authentication: names are self-reported.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/activities", get(get_activities).post(log_activity))
        .route("/api/stats/users", get(get_user_totals))
        .route("/api/stats/users/{name}", get(get_user_summary))
        .route("/api/stats/ranking", get(get_ranking))
        .route("/api/stats/activity-types", get(get_activity_type_totals))
}

// ─── Activities ──────────────────────────────────────────────

/// Response for a newly logged activity.
#[derive(Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LogActivityResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: i64,
}

/// Append a new activity to the log.
async fn log_activity(
    State(state): State<Arc<AppState>>,
    Json(activity): Json<NewActivity>,
) -> Result<(StatusCode, Json<LogActivityResponse>)> {
    let id = state.store.insert(&activity).await?;
    Ok((StatusCode::CREATED, Json(LogActivityResponse { id })))
}

#[derive(Deserialize)]
struct ActivitiesQuery {
    /// Only return activities logged under this name
    name: Option<String>,
}

#[derive(Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivitiesResponse {
    pub activities: Vec<ActivityRecord>,
    pub total: u32,
}

/// List logged activities, newest first.
async fn get_activities(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ActivitiesQuery>,
) -> Result<Json<ActivitiesResponse>> {
    tracing::debug!(name = ?params.name, "Fetching activities");

    let mut activities = match params.name.as_deref() {
        Some(name) => state.store.list_for_name(name).await?,
        None => state.store.list_all().await?,
    };
    ranking::sort_newest_first(&mut activities);

    Ok(Json(ActivitiesResponse {
        total: activities.len() as u32,
        activities,
    }))
}

// ─── Statistics ──────────────────────────────────────────────

/// Distance and duration totals per user, sorted by name.
async fn get_user_totals(State(state): State<Arc<AppState>>) -> Result<Json<Vec<UserAggregate>>> {
    let records = state.store.list_all().await?;
    Ok(Json(ranking::aggregate_by_name(&records)))
}

/// Leaderboard, best first.
async fn get_ranking(State(state): State<Arc<AppState>>) -> Result<Json<Vec<RankingEntry>>> {
    let records = state.store.list_all().await?;
    Ok(Json(ranking::rank(&records)))
}

/// Totals per activity type for the distance charts.
async fn get_activity_type_totals(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ActivityTypeTotals>>> {
    let records = state.store.list_all().await?;
    Ok(Json(ranking::totals_by_activity_type(&records)))
}

/// Everything the dashboard shows for one user.
async fn get_user_summary(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<UserSummary>> {
    // The rank is global, so the whole log is needed rather than one user's rows.
    let records = state.store.list_all().await?;
    ranking::summarize_user(&name, &records)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No activities logged for {:?}", name)))
}
