//! Common utility functions

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

/// Date format for database storage
pub const DB_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date-only format (YYYY-MM-DD)
pub const SHORT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Convert DateTime to database string format
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format(DB_DATE_FORMAT).to_string()
}

/// Parse database datetime string
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, DB_DATE_FORMAT)
        .ok()
        .map(|ndt| DateTime::from_naive_utc_and_offset(ndt, Utc))
}

/// Parse a date from any of the accepted textual forms
///
/// Accepts RFC 3339 (`2024-03-01T10:00:00Z`), the database format
/// (`2024-03-01 10:00:00`) and a bare date (`2024-03-01`, midnight UTC).
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Some(dt) = parse_datetime(s) {
        return Some(dt);
    }

    NaiveDate::parse_from_str(s, SHORT_DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| DateTime::from_naive_utc_and_offset(ndt, Utc))
}

/// Parse a JSON value as a date and return milliseconds since the epoch
///
/// Strings go through [`parse_date`]; numbers are taken as epoch milliseconds.
pub fn date_millis(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => parse_date(s).map(|dt| dt.timestamp_millis()),
        Value::Number(n) => {
            let ms = n.as_f64()?;
            Utc.timestamp_millis_opt(ms as i64).single().map(|dt| dt.timestamp_millis())
        }
        _ => None,
    }
}

/// Parse a string as a number the way a form input would
///
/// Surrounding whitespace is ignored; empty strings do not parse.
pub fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| !n.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use serde_json::json;

    #[test]
    fn test_date_to_db_conversion() {
        let dt = Utc.with_ymd_and_hms(2016, 12, 15, 17, 23, 54).unwrap();
        assert_eq!("2016-12-15 17:23:54", format_datetime(&dt));
    }

    #[test]
    fn test_db_datetime_conversion() {
        let expected = Utc.with_ymd_and_hms(2016, 12, 15, 17, 23, 54).unwrap();
        assert_eq!(parse_datetime("2016-12-15 17:23:54").unwrap(), expected);
    }

    #[test]
    fn test_parse_datetime_invalid() {
        assert!(parse_datetime("invalid").is_none());
        assert!(parse_datetime("2023-13-01 00:00:00").is_none());
    }

    #[test]
    fn test_parse_date_formats() {
        let rfc = parse_date("2024-03-01T10:00:00Z").unwrap();
        assert_eq!(rfc, Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap());

        let offset = parse_date("2024-03-01T12:00:00+02:00").unwrap();
        assert_eq!(offset, rfc);

        let db = parse_date("2024-03-01 10:00:00").unwrap();
        assert_eq!(db, rfc);

        let short = parse_date("2024-03-01").unwrap();
        assert_eq!(short.day(), 1);
        assert_eq!(short.month(), 3);
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date("").is_none());
        assert!(parse_date("   ").is_none());
        assert!(parse_date("yesterday").is_none());
        assert!(parse_date("2024-02-30").is_none());
    }

    #[test]
    fn test_date_millis() {
        assert_eq!(date_millis(&json!("1970-01-01")), Some(0));
        assert_eq!(date_millis(&json!(86_400_000)), Some(86_400_000));
        assert_eq!(date_millis(&json!("not a date")), None);
        assert_eq!(date_millis(&json!(true)), None);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("42"), Some(42.0));
        assert_eq!(parse_number(" 1.5 "), Some(1.5));
        assert_eq!(parse_number("-3"), Some(-3.0));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("NaN"), None);
    }
}
