//! Scheduled jobs — one-shot deferred actions on a device.
//!
//! A job has no identity of its own: its id is derived from its parameters
//! (`device|action|value|run_at`). Scheduling the same parameters twice
//! yields the same id and the later job replaces the earlier one, and
//! editing a job means removing it and scheduling a new one.

mod action;

pub use action::{Action, UnknownAction};

use std::fmt;
use std::str::FromStr;

use chrono::Datelike;
use serde::Serialize;

use crate::error::{InvalidJobFormat, ValidationError};
use crate::id::DeviceId;
use crate::time::{self, Timestamp};

/// Separator between the fields of a textual job id.
pub const JOB_ID_DELIMITER: char = '|';

/// Years whose RFC 3339 form has four digits and sorts as text.
const RUN_AT_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// The parameters of a job, which double as its identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct JobKey {
    device_id: DeviceId,
    action: Action,
    value: Option<String>,
    run_at: Timestamp,
}

impl JobKey {
    /// Build a key, normalizing `run_at` to whole seconds and an empty
    /// value to none.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidJobValue`] if `value` contains the
    /// id delimiter, or [`ValidationError::RunTimeOutOfRange`] if `run_at`
    /// falls outside years 0000 to 9999.
    pub fn new(
        device_id: DeviceId,
        action: Action,
        value: Option<String>,
        run_at: Timestamp,
    ) -> Result<Self, ValidationError> {
        let value = value.filter(|v| !v.is_empty());
        if let Some(v) = value.as_ref().filter(|v| v.contains(JOB_ID_DELIMITER)) {
            return Err(ValidationError::InvalidJobValue { value: v.clone() });
        }
        if !RUN_AT_YEARS.contains(&run_at.year()) {
            return Err(ValidationError::RunTimeOutOfRange {
                run_at: run_at.to_rfc3339(),
            });
        }
        Ok(Self {
            device_id,
            action,
            value,
            run_at: time::truncate_to_seconds(run_at),
        })
    }

    #[must_use]
    pub fn device_id(&self) -> DeviceId {
        self.device_id
    }

    #[must_use]
    pub fn action(&self) -> Action {
        self.action
    }

    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    #[must_use]
    pub fn run_at(&self) -> Timestamp {
        self.run_at
    }

    /// The textual job id.
    #[must_use]
    pub fn id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = JOB_ID_DELIMITER;
        write!(
            f,
            "{}{d}{}{d}{}{d}{}",
            self.device_id,
            self.action,
            self.value.as_deref().unwrap_or_default(),
            time::format(self.run_at),
        )
    }
}

impl FromStr for JobKey {
    type Err = InvalidJobFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| InvalidJobFormat {
            job_id: s.to_string(),
            reason,
        };

        let fields: Vec<&str> = s.split(JOB_ID_DELIMITER).collect();
        let [device_id, action, value, run_at] = fields[..] else {
            return Err(invalid("expected device|action|value|run_at"));
        };

        let device_id = device_id
            .parse()
            .map_err(|_| invalid("device id is not an integer"))?;
        let action = action.parse().map_err(|_| invalid("unknown action"))?;
        let run_at = time::parse(run_at).map_err(|_| invalid("run time is not RFC 3339"))?;

        Ok(Self {
            device_id,
            action,
            value: Some(value.to_string()).filter(|v| !v.is_empty()),
            run_at: time::truncate_to_seconds(run_at),
        })
    }
}

/// A pending job as held by the durable queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledJob {
    pub key: JobKey,
    pub created_at: Timestamp,
}

impl ScheduledJob {
    /// A job created now.
    #[must_use]
    pub fn new(key: JobKey) -> Self {
        Self {
            key,
            created_at: time::now(),
        }
    }

    /// Whether the job's run time has been reached at `now`.
    #[must_use]
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.key.run_at <= now
    }
}
