//! Common types used across the engine

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{EngineError, EngineResult};

/// Inclusive date range for narrowing lot queries.
///
/// Either bound may be open.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Range with no bounds, matching every date
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }
}

/// Parse a calendar date, discarding any time-of-day component.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and naive `YYYY-MM-DDTHH:MM:SS`
/// timestamps. Timestamps keep the calendar date they were written in.
pub fn parse_date_only(value: &str) -> EngineResult<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(timestamp.date());
        }
    }
    Err(EngineError::InvalidDate(value.to_string()))
}

/// Serde helpers that read date fields as date-only values
pub mod date_only {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_date_only(&raw).map_err(serde::de::Error::custom)
    }

    pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if !raw.trim().is_empty() => parse_date_only(&raw)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_plain_date() {
        assert_eq!(parse_date_only("2024-04-15").unwrap(), date(2024, 4, 15));
    }

    #[test]
    fn test_parse_timestamp_strips_time() {
        assert_eq!(parse_date_only("2024-04-15T00:00:00Z").unwrap(), date(2024, 4, 15));
        assert_eq!(parse_date_only("2024-04-15T23:59:59-05:00").unwrap(), date(2024, 4, 15));
        assert_eq!(parse_date_only("2024-04-15T08:30:00").unwrap(), date(2024, 4, 15));
        assert_eq!(parse_date_only("2024-04-15 08:30:00.250").unwrap(), date(2024, 4, 15));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(
            parse_date_only("15/04/2024"),
            Err(EngineError::InvalidDate("15/04/2024".to_string()))
        );
    }

    #[test]
    fn test_date_range_contains() {
        let range = DateRange::new(Some(date(2024, 1, 1)), Some(date(2024, 1, 31)));
        assert!(range.contains(date(2024, 1, 1)));
        assert!(range.contains(date(2024, 1, 31)));
        assert!(!range.contains(date(2024, 2, 1)));

        let open_start = DateRange::new(None, Some(date(2024, 1, 31)));
        assert!(open_start.contains(date(1999, 1, 1)));
        assert!(DateRange::unbounded().contains(date(2100, 12, 31)));
    }

    #[derive(Deserialize)]
    struct Dated {
        #[serde(deserialize_with = "date_only::deserialize")]
        expires: NaiveDate,
        #[serde(default, deserialize_with = "date_only::deserialize_option")]
        optional: Option<NaiveDate>,
    }

    #[test]
    fn test_serde_date_only_fields() {
        let parsed: Dated =
            serde_json::from_str(r#"{"expires":"2024-04-15T10:00:00Z","optional":null}"#).unwrap();
        assert_eq!(parsed.expires, date(2024, 4, 15));
        assert_eq!(parsed.optional, None);

        let parsed: Dated = serde_json::from_str(r#"{"expires":"2024-04-15"}"#).unwrap();
        assert_eq!(parsed.optional, None);

        let parsed: Dated =
            serde_json::from_str(r#"{"expires":"2024-04-15","optional":"2025-01-01"}"#).unwrap();
        assert_eq!(parsed.optional, Some(date(2025, 1, 1)));
    }
}
