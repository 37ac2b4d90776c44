//! Core library for the weather fulfillment webhook.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client behind the `WeatherProvider` trait
//! - Resolution of the platform's `date` parameter
//! - Forecast selection and the response templates
//! - `WeatherService`, which routes a request and always produces a response
//!
//! It is used by `weather-webhook`, but can also be reused by other binaries or services.

pub mod config;
pub mod date;
pub mod error;
pub mod forecast;
pub mod format;
pub mod model;
pub mod provider;
pub mod service;
pub mod webhook;

pub use config::{Config, ForecastConfig, OpenWeatherConfig, ServerConfig};
pub use date::{DateFallback, DateParam, RequestedDate};
pub use error::WebhookError;
pub use model::{CurrentConditions, DailySummary, ForecastSample, Measurement};
pub use provider::{OpenWeatherProvider, ProviderError, WeatherProvider, provider_from_config};
pub use service::WeatherService;
pub use webhook::{Payload, WebhookRequest, WebhookResponse};
