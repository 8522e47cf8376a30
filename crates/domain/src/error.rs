//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`SmartHubError`] via `#[from]`; there are no stringly-typed variants.

use crate::device::{AttributeName, Colour, DeviceKind};

/// Top-level error returned by domain and application operations.
#[derive(Debug, thiserror::Error)]
pub enum SmartHubError {
    /// An attribute or field violated a domain constraint.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A referenced device or job does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// A stored record carries a type tag outside the closed device set.
    #[error("unsupported device type")]
    UnsupportedDeviceType(#[from] UnsupportedDeviceType),

    /// A textual job id could not be decomposed into its fields.
    #[error("invalid job format")]
    InvalidJobFormat(#[from] InvalidJobFormat),

    /// The persistence layer failed.
    #[error("storage error")]
    Storage(Box<dyn std::error::Error + Send + Sync>),
}

/// Constraint violations raised by the taxonomy and builders.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("{attribute} must be between {min} and {max}, got {value}")]
    OutOfRange {
        attribute: AttributeName,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("{kind} does not allow colour {colour}")]
    ColourNotAllowed { kind: DeviceKind, colour: Colour },

    #[error("{kind} has no {attribute} attribute")]
    AttributeNotSupported {
        kind: DeviceKind,
        attribute: AttributeName,
    },

    #[error("job value {value:?} must not contain '|'")]
    InvalidJobValue { value: String },

    #[error("run time {run_at} is outside years 0000 to 9999")]
    RunTimeOutOfRange { run_at: String },
}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    /// Kind of thing looked up (`"Device"`, `"Job"`, …).
    pub entity: &'static str,
    pub id: String,
}

/// A device type tag that is not part of [`DeviceKind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported device type: {tag}")]
pub struct UnsupportedDeviceType {
    pub tag: String,
}

/// A job id that does not decompose into `device|action|value|run_at`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid job id {job_id:?}: {reason}")]
pub struct InvalidJobFormat {
    pub job_id: String,
    pub reason: &'static str,
}
