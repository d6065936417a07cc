// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SQLite-backed activity log.
//!
//! The log is append-only: records can be inserted and read back, never
//! updated or deleted. Writes go through a single async lock so that at most
//! one insert is in flight per process.

use crate::config::Config;
use crate::error::AppError;
use crate::models::{ActivityRecord, ActivityType, NewActivity};
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use validator::Validate;

type DbPool = SqlitePool;

const SELECT_ALL: &str =
    "SELECT id, name, activity_type, duration, distance, date FROM activities ORDER BY id";
const SELECT_BY_NAME: &str = "SELECT id, name, activity_type, duration, distance, date \
     FROM activities WHERE name = ?1 ORDER BY id";

/// Handle to the activity store. Cheap to clone; clones share the pool.
#[derive(Clone)]
pub struct ActivityStore {
    pool: DbPool,
    write_lock: Arc<Mutex<()>>,
}

/// Raw row as stored; the activity type is validated on the way out.
#[derive(sqlx::FromRow)]
struct ActivityRow {
    id: i64,
    name: String,
    activity_type: String,
    duration: f64,
    distance: f64,
    date: NaiveDate,
}

impl TryFrom<ActivityRow> for ActivityRecord {
    type Error = AppError;

    fn try_from(row: ActivityRow) -> Result<Self, Self::Error> {
        let activity_type = ActivityType::from_str(&row.activity_type).map_err(|_| {
            AppError::Persistence(format!(
                "Corrupt activity {}: unknown activity type {:?}",
                row.id, row.activity_type
            ))
        })?;

        Ok(ActivityRecord {
            id: row.id,
            name: row.name,
            activity_type,
            duration: row.duration,
            distance: row.distance,
            date: row.date,
        })
    }
}

impl ActivityStore {
    /// Open (creating if needed) the database named by the configuration.
    ///
    /// This only connects; call [`ActivityStore::initialize`] before use.
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        if config.database_url.contains(":memory:") {
            return Self::in_memory().await;
        }

        let options = SqliteConnectOptions::from_str(&config.database_url)
            .map_err(|e| AppError::Persistence(format!("Invalid database URL: {}", e)))?
            .create_if_missing(true)
            .busy_timeout(config.db_busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(config.db_busy_timeout)
            .connect_with(options)
            .await
            .map_err(|e| AppError::Persistence(format!("Failed to open database: {}", e)))?;

        tracing::info!(
            url = %config.database_url,
            max_connections = config.db_max_connections,
            "Connected to SQLite"
        );

        Ok(Self::from_pool(pool))
    }

    /// Create a private in-memory store.
    ///
    /// Uses a single connection that is never recycled: every pooled
    /// connection to `sqlite::memory:` would otherwise see its own empty
    /// database.
    pub async fn in_memory() -> Result<Self, AppError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| {
                AppError::Persistence(format!("Failed to create in-memory database: {}", e))
            })?;

        Ok(Self::from_pool(pool))
    }

    fn from_pool(pool: DbPool) -> Self {
        Self {
            pool,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Create the schema if it does not exist yet. Safe to call repeatedly.
    pub async fn initialize(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Activity schema ready");
        Ok(())
    }

    /// Validate and append a new activity, returning its assigned ID.
    ///
    /// Invalid input is rejected before anything is written. Inserts are
    /// never retried here: a retry after an ambiguous failure could log the
    /// same activity twice.
    pub async fn insert(&self, activity: &NewActivity) -> Result<i64, AppError> {
        activity.validate()?;
        let activity_type: ActivityType = activity.activity_type.parse()?;
        let date = activity
            .date
            .unwrap_or_else(|| chrono::Local::now().date_naive());

        let _guard = self.write_lock.lock().await;
        let result = sqlx::query(
            r#"
            INSERT INTO activities (name, activity_type, duration, distance, date)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&activity.name)
        .bind(activity_type.as_str())
        .bind(activity.duration)
        .bind(activity.distance)
        .bind(date)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        tracing::info!(
            id,
            name = %activity.name,
            activity_type = %activity_type,
            duration = activity.duration,
            distance = activity.distance,
            %date,
            "Activity logged"
        );

        Ok(id)
    }

    /// Every stored activity. Callers must not rely on the order.
    pub async fn list_all(&self) -> Result<Vec<ActivityRecord>, AppError> {
        let rows = sqlx::query_as::<_, ActivityRow>(SELECT_ALL)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ActivityRecord::try_from).collect()
    }

    /// Activities logged under exactly this name.
    pub async fn list_for_name(&self, name: &str) -> Result<Vec<ActivityRecord>, AppError> {
        let rows = sqlx::query_as::<_, ActivityRow>(SELECT_BY_NAME)
            .bind(name)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ActivityRecord::try_from).collect()
    }

    /// Number of stored activities.
    pub async fn count(&self) -> Result<u64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM activities")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    /// Close all pooled connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
