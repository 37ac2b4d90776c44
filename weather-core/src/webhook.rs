//! Wire types for the fulfillment webhook.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::Measurement;

/// Incoming fulfillment request. Only the parts this service reads are modeled.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    #[serde(default)]
    pub query_result: QueryResult,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub parameters: Parameters,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Parameters {
    #[serde(default)]
    pub city: Option<String>,
    /// Kept raw; see [`crate::date`] for how it is interpreted.
    #[serde(default)]
    pub date: Option<Value>,
}

impl WebhookRequest {
    /// Build a request the way the platform would send it.
    pub fn new(city: impl Into<String>, date: Option<Value>) -> Self {
        Self {
            query_result: QueryResult {
                parameters: Parameters {
                    city: Some(city.into()),
                    date,
                },
            },
        }
    }

    pub fn parameters(&self) -> &Parameters {
        &self.query_result.parameters
    }
}

/// Response returned to the platform for every request, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookResponse {
    #[serde(rename = "fulfillmentText")]
    pub fulfillment_text: String,
    pub payload: Payload,
}

impl WebhookResponse {
    /// The error shape: the message is repeated in the payload.
    pub fn error(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            fulfillment_text: message.clone(),
            payload: Payload::Error(ErrorPayload {
                error: true,
                message,
            }),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.payload, Payload::Error(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Current(CurrentPayload),
    Reading(ReadingPayload),
    Day(DayPayload),
    Range(RangePayload),
    Error(ErrorPayload),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentPayload {
    pub city: String,
    pub temperature: Measurement,
    pub feels_like: Measurement,
    pub condition: String,
    pub humidity: u8,
    pub pressure: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<Measurement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_direction: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunrise: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunset: Option<String>,
    /// When the response was produced, RFC 3339.
    pub timestamp: String,
}

/// A single forecast sample picked for a requested time of day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingPayload {
    pub city: String,
    pub date: String,
    pub time: String,
    pub condition: String,
    pub temperature: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayPayload {
    pub city: String,
    pub date: String,
    pub condition: String,
    pub high_temp: f64,
    pub low_temp: f64,
    pub avg_temp: f64,
    pub forecast_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangePayload {
    pub city: String,
    /// Keyed by ISO date; BTreeMap keeps the days in order.
    pub forecast: BTreeMap<String, DayEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayEntry {
    pub condition: String,
    pub high_temp: f64,
    pub low_temp: f64,
    pub avg_temp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorPayload {
    pub error: bool,
    pub message: String,
}
