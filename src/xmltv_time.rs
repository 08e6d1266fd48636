//! XMLTV timestamp helpers.
//!
//! Guides are supposed to carry `YYYYMMDDHHMMSS ±HHMM`, but plenty of feeds
//! drop or mangle the offset. Those fall back to the first 14 digits read as UTC.

use chrono::{DateTime, NaiveDateTime, Utc};

const PRIMARY_FORMAT: &str = "%Y%m%d%H%M%S %z";
const FALLBACK_FORMAT: &str = "%Y%m%d%H%M%S";
const FALLBACK_LEN: usize = 14;

/// Parse an XMLTV `start`/`stop` attribute into an absolute timestamp.
pub fn parse_xmltv_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_str(raw, PRIMARY_FORMAT) {
        return Some(dt.with_timezone(&Utc));
    }

    let head = raw.get(..FALLBACK_LEN)?;
    NaiveDateTime::parse_from_str(head, FALLBACK_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Format a timestamp the way XMLTV writers do, always with a `+0000` offset.
pub fn format_xmltv_datetime(dt: &DateTime<Utc>) -> String {
    dt.format(PRIMARY_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_primary_format() {
        let dt = parse_xmltv_datetime("20250115180000 +0000").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 1, 15, 18, 0, 0).unwrap());
    }

    #[test]
    fn test_offset_is_applied() {
        let plus_one = parse_xmltv_datetime("20240115120000 +0100").unwrap();
        let utc = parse_xmltv_datetime("20240115120000 +0000").unwrap();
        assert_eq!((utc - plus_one).num_seconds(), 3600);

        let minus = parse_xmltv_datetime("20240115120000 -0530").unwrap();
        assert_eq!(minus, Utc.with_ymd_and_hms(2024, 1, 15, 17, 30, 0).unwrap());
    }

    #[test]
    fn test_fallback_without_offset() {
        let dt = parse_xmltv_datetime("20250115180000").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 1, 15, 18, 0, 0).unwrap());
    }

    #[test]
    fn test_fallback_with_broken_offset() {
        // Offset glued on or garbage: first 14 digits still win
        let glued = parse_xmltv_datetime("20250115180000+0000").unwrap();
        assert_eq!(glued, Utc.with_ymd_and_hms(2025, 1, 15, 18, 0, 0).unwrap());
        let junk = parse_xmltv_datetime("20250115180000 EST5").unwrap();
        assert_eq!(junk, glued);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_xmltv_datetime("").is_none());
        assert!(parse_xmltv_datetime("2025011518").is_none());
        assert!(parse_xmltv_datetime("tomorrow at 6").is_none());
        assert!(parse_xmltv_datetime("20251315180000 +0000").is_none());
    }

    #[test]
    fn test_format_is_parseable() {
        let dt = Utc.with_ymd_and_hms(2025, 6, 1, 9, 5, 0).unwrap();
        let text = format_xmltv_datetime(&dt);
        assert_eq!(text, "20250601090500 +0000");
        assert_eq!(parse_xmltv_datetime(&text), Some(dt));
    }
}
