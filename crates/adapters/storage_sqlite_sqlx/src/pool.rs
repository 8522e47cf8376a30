//! `SQLite` connection pool setup and migration runner.

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use crate::error::StorageError;

/// Connections kept open when no limit is configured.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Configuration for the `SQLite` storage adapter.
pub struct Config {
    /// `SQLite` connection URL (e.g. `sqlite:smarthub.db` or `sqlite::memory:`).
    pub database_url: String,
    /// Upper bound on pooled connections.
    pub max_connections: u32,
}

impl Config {
    /// Configuration for `database_url` with the default pool size.
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// Build a [`Database`] from this configuration.
    ///
    /// Opens the pool, creating the database file if missing, and applies
    /// every pending migration.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidUrl`] for a malformed URL, or another
    /// [`StorageError`] if connecting or migrating fails.
    pub async fn build(self) -> Result<Database, StorageError> {
        let options = SqliteConnectOptions::from_str(&self.database_url)
            .map_err(|source| StorageError::InvalidUrl {
                url: self.database_url.clone(),
                source,
            })?
            .create_if_missing(true)
            .foreign_keys(true);
        // Shared-cache memory databases have no journal file to switch.
        let options = if is_memory(&self.database_url) {
            options
        } else {
            options.journal_mode(SqliteJournalMode::Wal)
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(self.max_connections.max(1))
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        tracing::debug!(url = %self.database_url, "database ready");
        Ok(Database { pool })
    }
}

fn is_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// An open, migrated `SQLite` database.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Borrow the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Wait for in-flight queries, then close every connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
