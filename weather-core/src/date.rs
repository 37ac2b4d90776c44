//! Resolution of the polymorphic `date` webhook parameter.
//!
//! The platform sends either an ISO-8601 string, a structured
//! `{year, month, day, hours?, minutes?}` object, or a date period
//! `{startDate, endDate}`. All of them are resolved once, up front, into a
//! [`RequestedDate`].

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// What to do when the date parameter cannot be understood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFallback {
    /// Quietly answer for the current UTC day.
    #[default]
    Now,
    /// Report the parse failure to the caller.
    Reject,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateParseError {
    #[error("'{0}' is not a valid timestamp")]
    InvalidTimestamp(String),

    #[error("'{0}' is not a valid calendar date")]
    InvalidDate(String),

    #[error("{year:04}-{month:02}-{day:02} is not a valid calendar date")]
    OutOfRange { year: i32, month: u32, day: u32 },

    #[error("{hours:02}:{minutes:02} is not a valid time of day")]
    InvalidTime { hours: u32, minutes: u32 },

    #[error("unrecognized date value {0}")]
    Unrecognized(String),
}

/// Structured calendar date as sent by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    #[serde(default)]
    pub hours: Option<u32>,
    #[serde(default)]
    pub minutes: Option<u32>,
}

/// A date period; the end is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatePeriod {
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// The raw `date` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DateParam {
    Period(DatePeriod),
    Calendar(CalendarDate),
    Text(String),
}

/// The day or instant a forecast is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedDate {
    /// A specific time of day was given.
    At(DateTime<Utc>),
    /// Whole calendar day (UTC).
    Day(NaiveDate),
    /// Several days starting at `start`.
    Range {
        start: NaiveDate,
        end: Option<NaiveDate>,
    },
}

impl RequestedDate {
    /// First calendar day covered by the request.
    pub fn start_date(&self) -> NaiveDate {
        match self {
            RequestedDate::At(dt) => dt.date_naive(),
            RequestedDate::Day(day) => *day,
            RequestedDate::Range { start, .. } => *start,
        }
    }
}

/// Whether a raw `date` value counts as "given".
///
/// `null`, `false`, zero, empty strings, empty objects and empty arrays are
/// all treated as absent, which routes the request to current weather.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
    }
}

impl DateParam {
    pub fn from_value(value: &Value) -> Result<Self, DateParseError> {
        DateParam::deserialize(value).map_err(|_| DateParseError::Unrecognized(value.to_string()))
    }

    pub fn resolve(&self) -> Result<RequestedDate, DateParseError> {
        match self {
            DateParam::Text(text) => parse_text(text),
            DateParam::Calendar(date) => date.resolve(),
            DateParam::Period(period) => {
                let start = parse_text(&period.start_date)?.start_date();
                let end = match period.end_date.as_deref().map(str::trim) {
                    Some(end) if !end.is_empty() => Some(parse_text(end)?.start_date()),
                    _ => None,
                };
                Ok(RequestedDate::Range { start, end })
            }
        }
    }
}

impl CalendarDate {
    fn resolve(&self) -> Result<RequestedDate, DateParseError> {
        let date = NaiveDate::from_ymd_opt(self.year, self.month, self.day).ok_or(
            DateParseError::OutOfRange {
                year: self.year,
                month: self.month,
                day: self.day,
            },
        )?;

        if self.hours.is_none() && self.minutes.is_none() {
            return Ok(RequestedDate::Day(date));
        }

        let hours = self.hours.unwrap_or(0);
        let minutes = self.minutes.unwrap_or(0);
        let time = NaiveTime::from_hms_opt(hours, minutes, 0)
            .ok_or(DateParseError::InvalidTime { hours, minutes })?;

        Ok(RequestedDate::At(date.and_time(time).and_utc()))
    }
}

fn parse_text(text: &str) -> Result<RequestedDate, DateParseError> {
    let text = text.trim();

    if text.contains('T') {
        let parsed = DateTime::parse_from_rfc3339(text)
            .or_else(|_| DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%z"))
            .map_err(|_| DateParseError::InvalidTimestamp(text.to_string()))?;
        return Ok(RequestedDate::At(parsed.with_timezone(&Utc)));
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map(RequestedDate::Day)
        .map_err(|_| DateParseError::InvalidDate(text.to_string()))
}

/// Resolve a raw `date` value, applying `fallback` when it cannot be parsed.
pub fn resolve_date(
    raw: &Value,
    now: DateTime<Utc>,
    fallback: DateFallback,
) -> Result<RequestedDate, DateParseError> {
    let resolved = DateParam::from_value(raw).and_then(|param| param.resolve());

    match (resolved, fallback) {
        (Ok(date), _) => Ok(date),
        (Err(err), DateFallback::Now) => {
            warn!(error = %err, "Unparseable date parameter, using today instead");
            Ok(RequestedDate::Day(now.date_naive()))
        }
        (Err(err), DateFallback::Reject) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap()
    }

    fn resolve(raw: Value) -> Result<RequestedDate, DateParseError> {
        resolve_date(&raw, now(), DateFallback::Reject)
    }

    #[test]
    fn timestamp_with_offset_is_converted_to_utc() {
        let resolved = resolve(json!("2024-01-15T01:30:00+02:00")).unwrap();
        assert_eq!(
            resolved,
            RequestedDate::At(Utc.with_ymd_and_hms(2024, 1, 14, 23, 30, 0).unwrap())
        );
    }

    #[test]
    fn timestamp_with_compact_offset_and_zulu() {
        let compact = resolve(json!("2024-01-15T12:00:00+0100")).unwrap();
        assert_eq!(
            compact,
            RequestedDate::At(Utc.with_ymd_and_hms(2024, 1, 15, 11, 0, 0).unwrap())
        );

        let zulu = resolve(json!("2024-01-15T12:00:00Z")).unwrap();
        assert_eq!(
            zulu,
            RequestedDate::At(Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn date_string_is_a_calendar_day() {
        assert_eq!(resolve(json!("2024-01-15")).unwrap(), RequestedDate::Day(day(2024, 1, 15)));
    }

    #[test]
    fn structured_date_without_time_is_a_calendar_day() {
        let resolved = resolve(json!({"year": 2024, "month": 1, "day": 15})).unwrap();
        assert_eq!(resolved, RequestedDate::Day(day(2024, 1, 15)));
    }

    #[test]
    fn structured_date_with_partial_time_defaults_to_zero() {
        let resolved = resolve(json!({"year": 2024, "month": 1, "day": 15, "hours": 9})).unwrap();
        assert_eq!(
            resolved,
            RequestedDate::At(Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap())
        );

        let resolved = resolve(json!({"year": 2024, "month": 1, "day": 15, "minutes": 45})).unwrap();
        assert_eq!(
            resolved,
            RequestedDate::At(Utc.with_ymd_and_hms(2024, 1, 15, 0, 45, 0).unwrap())
        );
    }

    #[test]
    fn period_resolves_to_range() {
        let resolved = resolve(json!({
            "startDate": "2024-01-15T00:00:00Z",
            "endDate": "2024-01-18"
        }))
        .unwrap();
        assert_eq!(
            resolved,
            RequestedDate::Range {
                start: day(2024, 1, 15),
                end: Some(day(2024, 1, 18)),
            }
        );

        let open = resolve(json!({"startDate": "2024-01-15", "endDate": ""})).unwrap();
        assert_eq!(open, RequestedDate::Range { start: day(2024, 1, 15), end: None });
    }

    #[test]
    fn invalid_inputs_are_rejected_with_reason() {
        assert_eq!(
            resolve(json!({"year": 2024, "month": 2, "day": 30})),
            Err(DateParseError::OutOfRange { year: 2024, month: 2, day: 30 })
        );
        assert!(matches!(
            resolve(json!("2024-01-15T25:00:00+00:00")),
            Err(DateParseError::InvalidTimestamp(_))
        ));
        assert!(matches!(resolve(json!("next tuesday")), Err(DateParseError::InvalidDate(_))));
        assert!(matches!(resolve(json!({"month": 1})), Err(DateParseError::Unrecognized(_))));
    }

    #[test]
    fn fallback_now_uses_today() {
        let resolved = resolve_date(&json!({"month": 1}), now(), DateFallback::Now).unwrap();
        assert_eq!(resolved, RequestedDate::Day(day(2024, 3, 1)));
    }

    #[test]
    fn presence_treats_empty_values_as_absent() {
        assert!(!is_present(&Value::Null));
        assert!(!is_present(&json!("")));
        assert!(!is_present(&json!({})));
        assert!(!is_present(&json!([])));
        assert!(!is_present(&json!(false)));
        assert!(!is_present(&json!(0)));
        assert!(!is_present(&json!(0.0)));
        assert!(is_present(&json!(true)));
        assert!(is_present(&json!(20240115)));
        assert!(is_present(&json!("2024-01-15")));
        assert!(is_present(&json!({"year": 2024})));
    }
}
