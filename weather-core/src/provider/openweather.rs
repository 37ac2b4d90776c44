use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::model::{CurrentConditions, ForecastSample, Measurement};

use super::{ProviderError, WeatherProvider};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    timeout: Duration,
    http: Client,
}

impl std::fmt::Debug for OpenWeatherProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherProvider")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenWeatherProvider {
    pub fn new(
        api_key: String,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            http,
        })
    }

    /// GET `{base_url}/{endpoint}` for `city` and check the embedded `cod`.
    async fn get_json(&self, endpoint: &str, city: &str) -> Result<Value, ProviderError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(%url, city, "Requesting OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| self.request_error(e))?;

        let json: Value = serde_json::from_str(&body).map_err(|_| {
            ProviderError::InvalidResponse(format!(
                "status {}: {}",
                status,
                truncate_body(&body)
            ))
        })?;

        // OpenWeather reports failures in the body, as a number on /weather and a string on /forecast.
        if !is_success_code(json.get("cod")) {
            debug!(%status, city, message = ?json.get("message"), "OpenWeather has no data");
            return Err(ProviderError::NotFound {
                city: city.to_string(),
            });
        }

        Ok(json)
    }

    fn request_error(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.timeout.as_secs())
        } else {
            // the URL carries the API key
            ProviderError::Transport(err.without_url().to_string())
        }
    }
}

fn is_success_code(cod: Option<&Value>) -> bool {
    match cod {
        Some(Value::Number(n)) => n.as_u64() == Some(200),
        Some(Value::String(s)) => s == "200",
        _ => false,
    }
}

fn decode<T: DeserializeOwned>(json: Value) -> Result<T, ProviderError> {
    serde_json::from_value(json).map_err(|e| ProviderError::InvalidResponse(e.to_string()))
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: Measurement,
    feels_like: Measurement,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    speed: Option<Measurement>,
    deg: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
    #[serde(default)]
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwForecastMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self))]
    async fn current(&self, city: &str) -> Result<CurrentConditions, ProviderError> {
        let parsed: OwCurrentResponse = decode(self.get_json("weather", city).await?)?;

        let condition = parsed
            .weather
            .into_iter()
            .next()
            .map(|w| w.description)
            .ok_or_else(|| ProviderError::InvalidResponse("no weather condition".to_string()))?;

        Ok(CurrentConditions {
            condition,
            temperature_c: parsed.main.temp,
            feels_like_c: parsed.main.feels_like,
            humidity_pct: parsed.main.humidity,
            pressure_hpa: parsed.main.pressure,
            wind_speed_mps: parsed.wind.speed,
            wind_direction_deg: parsed.wind.deg,
            sunrise: parsed.sys.sunrise.and_then(unix_to_utc),
            sunset: parsed.sys.sunset.and_then(unix_to_utc),
        })
    }

    #[instrument(skip(self))]
    async fn forecast(&self, city: &str) -> Result<Vec<ForecastSample>, ProviderError> {
        let parsed: OwForecastResponse = decode(self.get_json("forecast", city).await?)?;

        let samples = parsed
            .list
            .into_iter()
            .map(|entry| {
                let time = unix_to_utc(entry.dt).ok_or_else(|| {
                    ProviderError::InvalidResponse(format!("timestamp {} out of range", entry.dt))
                })?;
                let condition = entry
                    .weather
                    .into_iter()
                    .next()
                    .map(|w| w.description)
                    .ok_or_else(|| {
                        ProviderError::InvalidResponse(format!(
                            "no weather condition for entry at {time}"
                        ))
                    })?;

                Ok(ForecastSample {
                    time,
                    temperature_c: entry.main.temp,
                    condition,
                })
            })
            .collect::<Result<Vec<_>, ProviderError>>()?;

        debug!(city, samples = samples.len(), "Fetched forecast");
        Ok(samples)
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
