//! Time related utils.

use chrono::Utc;

/// DateTime is the alias of chrono's `DateTime<Utc>`.
pub type DateTime = chrono::DateTime<Utc>;

/// Create datetime of now.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into milliseconds since the unix epoch: "1660582212000"
pub fn format_timestamp_millis(t: DateTime) -> String {
    t.timestamp_millis().to_string()
}

/// Parse milliseconds since the unix epoch into time.
///
/// Returns `None` if the value is out of range.
pub fn from_timestamp_millis(millis: i64) -> Option<DateTime> {
    DateTime::from_timestamp_millis(millis)
}
