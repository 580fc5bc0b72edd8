//! Utility functions

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

/// Minimal shape check used before any outbound identity lookup.
pub fn looks_like_email(s: &str) -> bool {
    let s = s.trim();
    !s.is_empty() && s.contains('@')
}

pub fn mask_email(email: &str) -> String {
    if let Some(at_pos) = email.find('@') {
        let (local, domain) = email.split_at(at_pos);
        let keep = local.chars().count().min(2).max(1);
        let prefix: String = local.chars().take(keep).collect();
        format!("{}***{}", prefix, domain)
    } else {
        "***".to_string()
    }
}

/// Builds the library's local offset; out-of-range hours fall back to UTC.
pub fn offset_from_hours(hours: i32) -> FixedOffset {
    FixedOffset::east_opt(hours.saturating_mul(3600)).unwrap_or(Utc.fix())
}

/// Calendar day of `ts` as seen in `offset`.
pub fn local_day(ts: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    ts.with_timezone(&offset).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_looks_like_email() {
        assert!(looks_like_email("someone@campus.ac.id"));
        assert!(!looks_like_email("someone"));
        assert!(!looks_like_email("   "));
    }

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("rizqi@campus.ac.id"), "ri***@campus.ac.id");
        assert_eq!(mask_email("a@campus.ac.id"), "a***@campus.ac.id");
        assert_eq!(mask_email("nope"), "***");
    }

    #[test]
    fn test_local_day_crosses_midnight() {
        let wib = offset_from_hours(7);
        let ts = Utc.with_ymd_and_hms(2026, 3, 1, 18, 30, 0).unwrap();
        assert_eq!(local_day(ts, wib), NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
        assert_eq!(local_day(ts, offset_from_hours(0)), NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
    }
}
