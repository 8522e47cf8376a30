//! `SQLite` implementation of [`JobRepository`].
//!
//! Run times are stored as whole-second RFC 3339 text, so comparing them as
//! strings orders them chronologically. A row that no longer decodes into a
//! job is logged and skipped so the rest of the queue keeps firing.

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use smarthub_app::ports::JobRepository;
use smarthub_domain::error::SmartHubError;
use smarthub_domain::id::DeviceId;
use smarthub_domain::schedule::{Action, JobKey, ScheduledJob};
use smarthub_domain::time::{self, Timestamp};

use crate::error::StorageError;

/// Every job this adapter stores fires once at a fixed date.
const DATE_TRIGGER: &str = "date";

struct Wrapper(ScheduledJob);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let device_id: i64 = row.try_get("device_id")?;
        let action: String = row.try_get("action")?;
        let value: Option<String> = row.try_get("value")?;
        let run_at: String = row.try_get("run_at")?;
        let created_at: String = row.try_get("created_at")?;

        let action: Action = action
            .parse()
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let run_at = time::parse(&run_at).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let created_at =
            time::parse(&created_at).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let key = JobKey::new(DeviceId::new(device_id), action, value, run_at)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(ScheduledJob { key, created_at }))
    }
}

/// Decode every row, skipping the ones that are not valid jobs.
fn decode_rows(rows: &[SqliteRow]) -> Vec<ScheduledJob> {
    rows.iter()
        .filter_map(|row| match Wrapper::from_row(row) {
            Ok(Wrapper(job)) => Some(job),
            Err(err) => {
                let id: Option<String> = row.try_get("id").ok();
                tracing::warn!(job_id = ?id, %err, "skipping undecodable job row");
                None
            }
        })
        .collect()
}

const UPSERT: &str = "INSERT OR REPLACE INTO scheduled_jobs (id, device_id, action, value, trigger, run_at, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)";
const SELECT_ALL: &str = "SELECT * FROM scheduled_jobs ORDER BY run_at, id";
const SELECT_DUE: &str = "SELECT * FROM scheduled_jobs WHERE run_at <= ? ORDER BY run_at, id";
const DELETE_BY_ID: &str = "DELETE FROM scheduled_jobs WHERE id = ?";

/// `SQLite`-backed job queue.
pub struct SqliteJobRepository {
    pool: SqlitePool,
}

impl SqliteJobRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl JobRepository for SqliteJobRepository {
    fn upsert(&self, job: ScheduledJob) -> impl Future<Output = Result<(), SmartHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let key = &job.key;
            sqlx::query(UPSERT)
                .bind(key.id())
                .bind(key.device_id().get())
                .bind(key.action().as_str())
                .bind(key.value())
                .bind(DATE_TRIGGER)
                .bind(time::format(key.run_at()))
                .bind(time::format(job.created_at))
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<ScheduledJob>, SmartHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows = sqlx::query(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(decode_rows(&rows))
        }
    }

    fn due(
        &self,
        now: Timestamp,
    ) -> impl Future<Output = Result<Vec<ScheduledJob>, SmartHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows = sqlx::query(SELECT_DUE)
                .bind(time::format(now))
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(decode_rows(&rows))
        }
    }

    fn delete(&self, key: &JobKey) -> impl Future<Output = Result<bool, SmartHubError>> + Send {
        let pool = self.pool.clone();
        let id = key.id();
        async move {
            let result = sqlx::query(DELETE_BY_ID)
                .bind(id)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(result.rows_affected() > 0)
        }
    }
}
