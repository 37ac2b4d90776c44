use chrono::NaiveDate;
use thiserror::Error;

use crate::{date::DateParseError, webhook::WebhookResponse};

/// Which handler a failure happened in; picks the wording of the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Current,
    Forecast,
}

impl Flow {
    fn data_kind(self) -> &'static str {
        match self {
            Flow::Current => "weather",
            Flow::Forecast => "forecast",
        }
    }

    fn failure_prefix(self) -> &'static str {
        match self {
            Flow::Current => "Error fetching weather data",
            Flow::Forecast => "Error processing forecast",
        }
    }
}

/// Whether a forecast request covered one day or several.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSpan {
    Day,
    Range,
}

impl DateSpan {
    fn preposition(self) -> &'static str {
        match self {
            DateSpan::Day => "for",
            DateSpan::Range => "from",
        }
    }
}

/// Everything that turns into an error response. The `Display` text is what the user sees.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Invalid webhook request: {0}")]
    MalformedRequest(String),

    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Could not find {} data for {city}", .flow.data_kind())]
    ProviderNotFound { city: String, flow: Flow },

    #[error("No forecast available {} {date}", .span.preposition())]
    NoMatchingData { date: NaiveDate, span: DateSpan },

    #[error("Could not understand the requested date: {0}")]
    DateParse(#[from] DateParseError),

    #[error("{}: {reason}", .flow.failure_prefix())]
    Unexpected { flow: Flow, reason: String },
}

impl From<WebhookError> for WebhookResponse {
    fn from(err: WebhookError) -> Self {
        WebhookResponse::error(err.to_string())
    }
}
