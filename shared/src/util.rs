//! Small shared helpers: ids and epoch-millis timestamps.

use chrono::{DateTime, TimeZone, Utc};

/// Current time as epoch milliseconds (all timestamps are stored this way).
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Generate a new record id (uuid v4 string).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Convert epoch milliseconds back to a UTC datetime.
///
/// Falls back to the epoch for out-of-range values instead of panicking.
pub fn from_millis(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or_else(|| Utc.timestamp_millis_opt(0).single().unwrap_or_default())
}
