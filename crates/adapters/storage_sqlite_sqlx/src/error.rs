//! Storage-specific error type wrapping sqlx errors.

use smarthub_domain::error::SmartHubError;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The connection URL could not be parsed.
    #[error("invalid database url {url}")]
    InvalidUrl {
        url: String,
        #[source]
        source: sqlx::Error,
    },

    /// A query, transaction or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// The embedded schema migrations could not be applied.
    #[error("schema migration failed")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<StorageError> for SmartHubError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
