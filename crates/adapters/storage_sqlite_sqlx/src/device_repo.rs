//! `SQLite` implementation of [`DeviceRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use smarthub_app::ports::DeviceRepository;
use smarthub_domain::device::{DeviceChanges, DeviceRecord, NewDevice};
use smarthub_domain::error::SmartHubError;
use smarthub_domain::id::DeviceId;

use crate::error::StorageError;

/// Wrapper for converting database rows into [`DeviceRecord`].
struct Wrapper(DeviceRecord);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: i64 = row.try_get("id")?;
        Ok(Self(DeviceRecord {
            id: DeviceId::new(id),
            name: row.try_get("name")?,
            device_type: row.try_get("type")?,
            status: row.try_get("status")?,
            temperature: row.try_get("temperature")?,
            brightness: row.try_get("brightness")?,
            colour: row.try_get("colour")?,
        }))
    }
}

const INSERT: &str = "INSERT INTO devices (name, type, status, temperature, brightness, colour) VALUES (?, ?, ?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM devices WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM devices ORDER BY id";
const UPDATE: &str = "UPDATE devices SET name = ?, status = ?, temperature = ?, brightness = ?, colour = ? WHERE id = ?";
const DELETE_BY_ID: &str = "DELETE FROM devices WHERE id = ?";
const COUNT: &str = "SELECT COUNT(*) FROM devices";

/// `SQLite`-backed device repository.
pub struct SqliteDeviceRepository {
    pool: SqlitePool,
}

impl SqliteDeviceRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl DeviceRepository for SqliteDeviceRepository {
    fn create(
        &self,
        device: NewDevice,
    ) -> impl Future<Output = Result<DeviceRecord, SmartHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let record = device.into_record(DeviceId::new(0));
            let result = sqlx::query(INSERT)
                .bind(&record.name)
                .bind(&record.device_type)
                .bind(record.status)
                .bind(record.temperature)
                .bind(record.brightness)
                .bind(&record.colour)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(DeviceRecord {
                id: DeviceId::new(result.last_insert_rowid()),
                ..record
            })
        }
    }

    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<DeviceRecord>, SmartHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.get())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|w| w.0))
        }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<DeviceRecord>, SmartHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn update(
        &self,
        id: DeviceId,
        changes: DeviceChanges,
    ) -> impl Future<Output = Result<Option<DeviceRecord>, SmartHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let mut tx = pool.begin().await.map_err(StorageError::from)?;

            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.get())
                .fetch_optional(&mut *tx)
                .await
                .map_err(StorageError::from)?;
            let Some(Wrapper(mut record)) = row else {
                return Ok(None);
            };

            changes.apply_to(&mut record);
            sqlx::query(UPDATE)
                .bind(&record.name)
                .bind(record.status)
                .bind(record.temperature)
                .bind(record.brightness)
                .bind(&record.colour)
                .bind(id.get())
                .execute(&mut *tx)
                .await
                .map_err(StorageError::from)?;

            tx.commit().await.map_err(StorageError::from)?;
            Ok(Some(record))
        }
    }

    fn delete(&self, id: DeviceId) -> impl Future<Output = Result<bool, SmartHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(DELETE_BY_ID)
                .bind(id.get())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(result.rows_affected() > 0)
        }
    }

    fn count(&self) -> impl Future<Output = Result<u64, SmartHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let count: i64 = sqlx::query_scalar(COUNT)
                .fetch_one(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(count.unsigned_abs())
        }
    }
}
