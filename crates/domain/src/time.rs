//! Time and timestamp helpers.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

/// UTC timestamp used for job run times and creation times.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Drop sub-second precision so a timestamp survives its textual form.
#[must_use]
pub fn truncate_to_seconds(ts: Timestamp) -> Timestamp {
    ts.trunc_subsecs(0)
}

/// Format as RFC 3339 with whole seconds and a `Z` suffix.
///
/// All stored timestamps use this form, so lexical order matches
/// chronological order.
#[must_use]
pub fn format(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse an RFC 3339 timestamp into UTC.
///
/// # Errors
///
/// Returns [`chrono::ParseError`] if `s` is not valid RFC 3339.
pub fn parse(s: &str) -> Result<Timestamp, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.to_utc())
}
