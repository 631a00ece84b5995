//! Timestamp parsing and presentation

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

/// 2004-01-01T00:00:00Z, the cursor used when a request has none
const DEFAULT_AFTER_SECS: i64 = 1_072_915_200;

pub fn default_after() -> DateTime<Utc> {
    Utc.timestamp_opt(DEFAULT_AFTER_SECS, 0)
        .single()
        .unwrap_or_default()
}

/// ISO-8601 in UTC with a literal `Z`, never `+00:00`.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse a client-supplied timestamp. Values without an offset are UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_after() {
        assert_eq!(format_timestamp(&default_after()), "2004-01-01T00:00:00Z");
    }

    #[test]
    fn test_format_never_uses_offset() {
        let dt = Utc.with_ymd_and_hms(2021, 6, 30, 23, 59, 59).unwrap();
        let formatted = format_timestamp(&dt);
        assert_eq!(formatted, "2021-06-30T23:59:59Z");
        assert!(!formatted.contains("+00:00"));

        let with_micros = dt + chrono::Duration::microseconds(250);
        let formatted = format_timestamp(&with_micros);
        assert!(formatted.ends_with('Z'));
        assert_eq!(formatted, "2021-06-30T23:59:59.000250Z");
    }

    #[test]
    fn test_parse_accepts_common_shapes() {
        let expected = Utc.with_ymd_and_hms(2021, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(parse_timestamp("2021-01-02T03:04:05Z"), Some(expected));
        assert_eq!(parse_timestamp("2021-01-02T05:04:05+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2021-01-02T03:04:05"), Some(expected));
        assert_eq!(parse_timestamp(" 2021-01-02 03:04:05 "), Some(expected));
        assert_eq!(
            parse_timestamp("2021-01-02"),
            Some(Utc.with_ymd_and_hms(2021, 1, 2, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2021-13-45T00:00:00Z"), None);
    }
}
