use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

use crate::{
    Config,
    model::{CurrentConditions, ForecastSample},
};

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// Failures talking to the weather provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered with a non-success `cod` (unknown city, no data).
    #[error("provider has no data for '{city}'")]
    NotFound { city: String },

    #[error("weather provider did not respond within {0}s")]
    Timeout(u64),

    #[error("request to weather provider failed: {0}")]
    Transport(String),

    #[error("unexpected response from weather provider: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions for `city`.
    async fn current(&self, city: &str) -> Result<CurrentConditions, ProviderError>;

    /// Multi-day 3-hour forecast for `city`, in provider order.
    async fn forecast(&self, city: &str) -> Result<Vec<ForecastSample>, ProviderError>;
}

/// Construct the OpenWeather client from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<OpenWeatherProvider> {
    let api_key = config.api_key()?;
    let provider = OpenWeatherProvider::new(
        api_key.to_owned(),
        config.openweather.base_url.clone(),
        config.openweather.timeout(),
    )?;

    Ok(provider)
}
