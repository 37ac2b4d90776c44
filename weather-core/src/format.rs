//! Text templates and payloads for each kind of answer.

use chrono::{DateTime, NaiveDate, Utc};

use crate::{
    model::{CurrentConditions, DailySummary, ForecastSample},
    webhook::{
        CurrentPayload, DayEntry, DayPayload, Payload, RangePayload, ReadingPayload,
        WebhookResponse,
    },
};

const NOT_AVAILABLE: &str = "N/A";

pub fn current_weather(
    city: &str,
    conditions: &CurrentConditions,
    captured_at: DateTime<Utc>,
) -> WebhookResponse {
    let sunrise = conditions.sunrise.map(clock);
    let sunset = conditions.sunset.map(clock);

    let text = format!(
        "Current weather in {city}:\n\
         • Condition: {condition}\n\
         • Temperature: {temp}°C (feels like {feels}°C)\n\
         • Humidity: {humidity}%\n\
         • Wind: {speed} m/s, {deg}°\n\
         • Pressure: {pressure} hPa\n\
         • Sunrise: {sunrise}\n\
         • Sunset: {sunset}",
        condition = capitalize(&conditions.condition),
        temp = conditions.temperature_c,
        feels = conditions.feels_like_c,
        humidity = conditions.humidity_pct,
        speed = conditions
            .wind_speed_mps
            .as_ref()
            .map_or_else(|| NOT_AVAILABLE.to_string(), ToString::to_string),
        deg = conditions
            .wind_direction_deg
            .map_or_else(|| NOT_AVAILABLE.to_string(), |d| d.to_string()),
        pressure = conditions.pressure_hpa,
        sunrise = sunrise.as_deref().unwrap_or(NOT_AVAILABLE),
        sunset = sunset.as_deref().unwrap_or(NOT_AVAILABLE),
    );

    WebhookResponse {
        fulfillment_text: text,
        payload: Payload::Current(CurrentPayload {
            city: city.to_string(),
            temperature: conditions.temperature_c.clone(),
            feels_like: conditions.feels_like_c.clone(),
            condition: conditions.condition.clone(),
            humidity: conditions.humidity_pct,
            pressure: conditions.pressure_hpa,
            wind_speed: conditions.wind_speed_mps.clone(),
            wind_direction: conditions.wind_direction_deg,
            sunrise,
            sunset,
            timestamp: captured_at.to_rfc3339(),
        }),
    }
}

/// Answer for a request that named a time of day.
pub fn forecast_reading(city: &str, sample: &ForecastSample) -> WebhookResponse {
    let text = format!(
        "Weather forecast for {city} on {day} at {time} UTC:\n\
         • Condition: {condition}\n\
         • Temperature: {temp:.1}°C",
        day = sample.time.format("%A, %B %d"),
        time = clock(sample.time),
        condition = capitalize(&sample.condition),
        temp = sample.temperature_c,
    );

    WebhookResponse {
        fulfillment_text: text,
        payload: Payload::Reading(ReadingPayload {
            city: city.to_string(),
            date: iso_date(sample.date()),
            time: sample.time.to_rfc3339(),
            condition: sample.condition.clone(),
            temperature: sample.temperature_c,
        }),
    }
}

pub fn day_forecast(city: &str, summary: &DailySummary) -> WebhookResponse {
    let text = format!(
        "Weather forecast for {city} on {day}:\n\
         • Expected condition: {condition}\n\
         • High temperature: {high:.1}°C\n\
         • Low temperature: {low:.1}°C\n\
         • Average temperature: {avg:.1}°C\n\
         • Number of forecasts: {count}",
        day = summary.date.format("%A, %B %d"),
        condition = capitalize(&summary.condition),
        high = summary.high_c,
        low = summary.low_c,
        avg = summary.average_c,
        count = summary.sample_count,
    );

    WebhookResponse {
        fulfillment_text: text,
        payload: Payload::Day(DayPayload {
            city: city.to_string(),
            date: iso_date(summary.date),
            condition: summary.condition.clone(),
            high_temp: summary.high_c,
            low_temp: summary.low_c,
            avg_temp: summary.average_c,
            forecast_count: summary.sample_count,
        }),
    }
}

pub fn range_forecast(city: &str, start: NaiveDate, days: &[DailySummary]) -> WebhookResponse {
    let mut text = format!(
        "Weather forecast for {city} starting {}:\n\n",
        start.format("%A, %B %d")
    );

    for day in days {
        text.push_str(&format!(
            "{}:\n• Condition: {}\n• High: {:.1}°C\n• Low: {:.1}°C\n\n",
            day.date.format("%A, %b %d"),
            capitalize(&day.condition),
            day.high_c,
            day.low_c,
        ));
    }

    let forecast = days
        .iter()
        .map(|day| {
            (
                iso_date(day.date),
                DayEntry {
                    condition: day.condition.clone(),
                    high_temp: day.high_c,
                    low_temp: day.low_c,
                    avg_temp: day.average_c,
                },
            )
        })
        .collect();

    WebhookResponse {
        fulfillment_text: text.trim().to_string(),
        payload: Payload::Range(RangePayload {
            city: city.to_string(),
            forecast,
        }),
    }
}

pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn clock(time: DateTime<Utc>) -> String {
    time.format("%H:%M").to_string()
}

/// Uppercase the first character and lowercase the rest.
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
