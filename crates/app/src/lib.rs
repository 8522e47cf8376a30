//! # smarthub-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `DeviceRepository` — CRUD and counting for device records
//!   - `JobRepository` — durable queue of scheduled jobs
//! - Define **driving/inbound ports** as use-case structs:
//!   - `DeviceService` — CRUD, immediate edits, groups and the energy overview
//!   - `ActionExecutor` — apply one action to one device
//!   - `Scheduler` — schedule, list, cancel and edit jobs, and fire them when due
//! - Orchestrate domain objects without knowing *how* persistence or IO works
//!
//! ## Dependency rule
//! Depends on `smarthub-domain` only (plus `tokio` for the scheduler task).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod executor;
pub mod ports;
pub mod scheduler;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;
