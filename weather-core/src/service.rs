//! Request routing and the two fulfillment handlers.

use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::{
    config::ForecastConfig,
    date::{self, RequestedDate},
    error::{DateSpan, Flow, WebhookError},
    forecast, format,
    provider::{ProviderError, WeatherProvider},
    webhook::{WebhookRequest, WebhookResponse},
};

/// Where a request goes, decided from its parameters alone.
#[derive(Debug, Clone, PartialEq)]
pub enum Route<'a> {
    Current { city: &'a str },
    Forecast { city: &'a str, date: &'a Value },
}

impl<'a> Route<'a> {
    pub fn from_request(request: &'a WebhookRequest) -> Result<Self, WebhookError> {
        let params = request.parameters();

        let city = params
            .city
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or(WebhookError::MissingParameter("city"))?;

        match params.date.as_ref().filter(|d| date::is_present(d)) {
            Some(date) => Ok(Route::Forecast { city, date }),
            None => Ok(Route::Current { city }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
    settings: ForecastConfig,
}

impl WeatherService {
    pub fn new(provider: Arc<dyn WeatherProvider>, settings: ForecastConfig) -> Self {
        Self { provider, settings }
    }

    /// Answer a webhook request. Never fails: errors become the error response shape.
    pub async fn handle(&self, request: &WebhookRequest) -> WebhookResponse {
        self.handle_at(request, Utc::now()).await
    }

    /// Like [`handle`](Self::handle) with an explicit "now", used for the
    /// capture timestamp and the date fallback.
    #[instrument(skip_all, fields(city = request.parameters().city.as_deref()))]
    pub async fn handle_at(&self, request: &WebhookRequest, now: DateTime<Utc>) -> WebhookResponse {
        match self.dispatch(request, now).await {
            Ok(response) => {
                info!("Fulfilled weather request");
                response
            }
            Err(err) => {
                warn!(error = %err, "Answering with error response");
                err.into()
            }
        }
    }

    async fn dispatch(
        &self,
        request: &WebhookRequest,
        now: DateTime<Utc>,
    ) -> Result<WebhookResponse, WebhookError> {
        match Route::from_request(request)? {
            Route::Current { city } => self.current_weather(city, now).await,
            Route::Forecast { city, date } => self.forecast(city, date, now).await,
        }
    }

    pub async fn current_weather(
        &self,
        city: &str,
        now: DateTime<Utc>,
    ) -> Result<WebhookResponse, WebhookError> {
        let conditions = self
            .provider
            .current(city)
            .await
            .map_err(|e| provider_failure(e, city, Flow::Current))?;

        Ok(format::current_weather(city, &conditions, now))
    }

    pub async fn forecast(
        &self,
        city: &str,
        raw_date: &Value,
        now: DateTime<Utc>,
    ) -> Result<WebhookResponse, WebhookError> {
        let requested = date::resolve_date(raw_date, now, self.settings.date_fallback)?;

        let samples = self
            .provider
            .forecast(city)
            .await
            .map_err(|e| provider_failure(e, city, Flow::Forecast))?;

        match requested {
            RequestedDate::At(target) => {
                let sample = forecast::nearest_sample(&samples, target).ok_or(
                    WebhookError::NoMatchingData {
                        date: target.date_naive(),
                        span: DateSpan::Day,
                    },
                )?;
                Ok(format::forecast_reading(city, sample))
            }
            RequestedDate::Day(day) => {
                let matching = forecast::samples_on(&samples, day);
                let summary = forecast::summarize_day(day, &matching).ok_or(
                    WebhookError::NoMatchingData {
                        date: day,
                        span: DateSpan::Day,
                    },
                )?;
                Ok(format::day_forecast(city, &summary))
            }
            RequestedDate::Range { start, end } => {
                let end = self.window_end(start, end);
                let days = forecast::summarize_range(&samples, start, end);
                if days.is_empty() {
                    return Err(WebhookError::NoMatchingData {
                        date: start,
                        span: DateSpan::Range,
                    });
                }
                Ok(format::range_forecast(city, start, &days))
            }
        }
    }

    /// Last day of a multi-day window: the requested end, capped at `window_days` days.
    fn window_end(&self, start: NaiveDate, requested_end: Option<NaiveDate>) -> NaiveDate {
        let span = u64::from(self.settings.window_days.max(1) - 1);
        let limit = start.checked_add_days(Days::new(span)).unwrap_or(NaiveDate::MAX);

        match requested_end {
            Some(end) => end.clamp(start, limit),
            None => limit,
        }
    }
}

fn provider_failure(err: ProviderError, city: &str, flow: Flow) -> WebhookError {
    match err {
        ProviderError::NotFound { .. } => WebhookError::ProviderNotFound {
            city: city.to_string(),
            flow,
        },
        other => WebhookError::Unexpected {
            flow,
            reason: other.to_string(),
        },
    }
}
