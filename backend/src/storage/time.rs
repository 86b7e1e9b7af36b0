//! Timestamps are stored as epoch milliseconds so window queries can compare
//! them numerically.

use anyhow::{anyhow, Result};
use chrono::{DateTime, TimeZone, Utc};

pub fn to_millis(ts: &DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

pub fn from_millis(millis: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| anyhow!("Invalid stored timestamp: {}", millis))
}

pub fn from_millis_opt(millis: Option<i64>) -> Result<Option<DateTime<Utc>>> {
    millis.map(from_millis).transpose()
}

/// Drop sub-millisecond precision so a value survives a storage round trip unchanged
pub fn truncate_to_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    from_millis(ts.timestamp_millis()).unwrap_or(ts)
}

/// Current time at storage precision
pub fn now() -> DateTime<Utc> {
    truncate_to_millis(Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_round_trip() {
        let ts = Utc.with_ymd_and_hms(2025, 6, 13, 9, 30, 0).unwrap();
        assert_eq!(from_millis(to_millis(&ts)).unwrap(), ts);
    }

    #[test]
    fn test_truncate_drops_sub_millisecond_precision() {
        let ts = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let truncated = truncate_to_millis(ts);
        assert_eq!(truncated.timestamp_subsec_nanos(), 123_000_000);
        assert_eq!(from_millis(to_millis(&truncated)).unwrap(), truncated);
    }

    #[test]
    fn test_optional_timestamp() {
        assert_eq!(from_millis_opt(None).unwrap(), None);
        assert!(from_millis_opt(Some(0)).unwrap().is_some());
    }
}
