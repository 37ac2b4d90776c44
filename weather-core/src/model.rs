use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// A numeric reading kept in the form the provider sent it.
///
/// An integer (`12`) prints and serializes as `12`, a float (`12.0`) as `12.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Measurement(Number);

impl Measurement {
    pub fn value(&self) -> f64 {
        self.0.as_f64().unwrap_or_default()
    }
}

impl From<i64> for Measurement {
    fn from(value: i64) -> Self {
        Self(Number::from(value))
    }
}

impl TryFrom<f64> for Measurement {
    /// The rejected non-finite value.
    type Error = f64;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Number::from_f64(value).map(Self).ok_or(value)
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_f64() {
            Some(value) if self.0.is_f64() && value.fract() == 0.0 => write!(f, "{value:.1}"),
            Some(value) if self.0.is_f64() => write!(f, "{value}"),
            _ => write!(f, "{}", self.0),
        }
    }
}

/// Observed conditions for a city, as reported by the provider's current-weather endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub condition: String,
    pub temperature_c: Measurement,
    pub feels_like_c: Measurement,
    pub humidity_pct: u8,
    pub pressure_hpa: u32,
    pub wind_speed_mps: Option<Measurement>,
    pub wind_direction_deg: Option<u16>,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
}

/// One 3-hour forecast entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    pub time: DateTime<Utc>,
    pub temperature_c: f64,
    pub condition: String,
}

impl ForecastSample {
    /// Calendar day of the sample in UTC.
    pub fn date(&self) -> NaiveDate {
        self.time.date_naive()
    }
}

/// Aggregate over all samples of one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub condition: String,
    pub high_c: f64,
    pub low_c: f64,
    pub average_c: f64,
    pub sample_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(raw: &str) -> Measurement {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn integers_print_bare() {
        assert_eq!(parse("12").to_string(), "12");
        assert_eq!(parse("-3").to_string(), "-3");
        assert_eq!(Measurement::from(0).to_string(), "0");
    }

    #[test]
    fn floats_keep_their_decimal() {
        assert_eq!(parse("12.0").to_string(), "12.0");
        assert_eq!(parse("-3.0").to_string(), "-3.0");
        assert_eq!(parse("5.55").to_string(), "5.55");
        assert_eq!(Measurement::try_from(4.1).unwrap().to_string(), "4.1");
    }

    #[test]
    fn serializes_in_the_received_form() {
        assert_eq!(serde_json::to_value(parse("3")).unwrap(), json!(3));
        assert_eq!(serde_json::to_value(parse("3.0")).unwrap(), json!(3.0));
        assert_eq!(parse("3").value(), 3.0);
    }

    #[test]
    fn non_finite_values_are_rejected() {
        assert!(Measurement::try_from(f64::NAN).is_err());
    }
}
