//! # smarthub-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `smarthub-app::ports::storage`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `smarthub-app` (for port traits) and `smarthub-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod device_repo;
mod error;
mod job_repo;
mod pool;

pub use device_repo::SqliteDeviceRepository;
pub use error::StorageError;
pub use job_repo::SqliteJobRepository;
pub use pool::{Config, DEFAULT_MAX_CONNECTIONS, Database};
