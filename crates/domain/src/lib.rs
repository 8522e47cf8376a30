//! # smarthub-domain
//!
//! Pure domain model for the smarthub device manager.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define the **device taxonomy**: the closed set of device kinds, their
//!   per-kind attribute bounds, defaults and energy usage
//! - Define **device records** (persisted shape) and the factory that turns a
//!   record back into a validated, typed [`Device`](device::Device)
//! - Define **scheduled jobs** (deferred actions keyed by their parameters)
//! - Define **device groups** used for bulk actions
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod device;
pub mod group;
pub mod schedule;
