//! OpenWeather client against a mock HTTP server.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use weather_core::{OpenWeatherProvider, ProviderError, WeatherProvider};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn current_body() -> serde_json::Value {
    serde_json::json!({
        "coord": {"lon": -0.1257, "lat": 51.5085},
        "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
        "main": {"temp": 12.0, "feels_like": 10.5, "temp_min": 11.0, "temp_max": 13.0, "pressure": 1012, "humidity": 81},
        "wind": {"speed": 4.1, "deg": 250},
        "sys": {"country": "GB", "sunrise": 1705302000, "sunset": 1705333800},
        "dt": 1705320000,
        "name": "London",
        "cod": 200
    })
}

fn forecast_body() -> serde_json::Value {
    serde_json::json!({
        "cod": "200",
        "message": 0,
        "cnt": 3,
        "list": [
            {"dt": 1705287600, "main": {"temp": 10.0, "feels_like": 9.0}, "weather": [{"description": "rain"}]},
            {"dt": 1705298400, "main": {"temp": 14.0, "feels_like": 13.0}, "weather": [{"description": "clear sky"}]},
            {"dt": 1705309200, "main": {"temp": 12.0, "feels_like": 11.0}, "weather": [{"description": "rain"}]}
        ],
        "city": {"name": "London", "country": "GB"}
    })
}

fn client(server: &MockServer, timeout: Duration) -> OpenWeatherProvider {
    OpenWeatherProvider::new("TEST_KEY".into(), server.uri(), timeout)
        .expect("client should build")
}

#[tokio::test]
async fn current_weather_is_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "London"))
        .and(query_param("appid", "TEST_KEY"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
        .expect(1)
        .mount(&server)
        .await;

    let current = client(&server, Duration::from_secs(5))
        .current("London")
        .await
        .expect("current weather");

    assert_eq!(current.condition, "light rain");
    assert_eq!(current.temperature_c.to_string(), "12.0");
    assert_eq!(current.feels_like_c.value(), 10.5);
    assert_eq!(current.humidity_pct, 81);
    assert_eq!(current.pressure_hpa, 1012);
    assert_eq!(current.wind_speed_mps.map(|s| s.value()), Some(4.1));
    assert_eq!(current.wind_direction_deg, Some(250));
    assert_eq!(current.sunrise, Some(Utc.timestamp_opt(1705302000, 0).unwrap()));
}

#[tokio::test]
async fn current_weather_tolerates_missing_wind_and_sys() {
    let server = MockServer::start().await;
    let mut body = current_body();
    let object = body.as_object_mut().unwrap();
    object.remove("wind");
    object.remove("sys");

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let current = client(&server, Duration::from_secs(5))
        .current("London")
        .await
        .expect("current weather");

    assert_eq!(current.wind_speed_mps, None);
    assert_eq!(current.sunrise, None);
}

#[tokio::test]
async fn integer_readings_keep_their_form() {
    let server = MockServer::start().await;
    let mut body = current_body();
    body["main"]["temp"] = serde_json::json!(12);
    body["main"]["feels_like"] = serde_json::json!(11);
    body["wind"]["speed"] = serde_json::json!(3);

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let current = client(&server, Duration::from_secs(5))
        .current("London")
        .await
        .expect("current weather");

    assert_eq!(current.temperature_c.to_string(), "12");
    assert_eq!(current.feels_like_c.to_string(), "11");
    assert_eq!(current.wind_speed_mps.map(|s| s.to_string()).as_deref(), Some("3"));
}

#[tokio::test]
async fn unknown_city_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({"cod": "404", "message": "city not found"})),
        )
        .mount(&server)
        .await;

    let result = client(&server, Duration::from_secs(5)).current("Atlantis").await;

    assert!(
        matches!(result, Err(ProviderError::NotFound { ref city }) if city == "Atlantis"),
        "Expected NotFound, got: {result:?}"
    );
}

#[tokio::test]
async fn forecast_samples_keep_provider_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("q", "London"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(&server)
        .await;

    let samples = client(&server, Duration::from_secs(5))
        .forecast("London")
        .await
        .expect("forecast");

    assert_eq!(samples.len(), 3);
    assert_eq!(samples[0].time, Utc.with_ymd_and_hms(2024, 1, 15, 3, 0, 0).unwrap());
    assert_eq!(samples[1].condition, "clear sky");
    assert_eq!(samples[2].temperature_c, 12.0);
}

#[tokio::test]
async fn non_json_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let result = client(&server, Duration::from_secs(5)).forecast("London").await;

    assert!(
        matches!(result, Err(ProviderError::InvalidResponse(ref msg)) if msg.contains("Bad Gateway")),
        "Expected InvalidResponse, got: {result:?}"
    );
}

#[tokio::test]
async fn slow_provider_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(current_body())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let result = client(&server, Duration::from_secs(1)).current("London").await;

    assert!(
        matches!(result, Err(ProviderError::Timeout(1))),
        "Expected Timeout, got: {result:?}"
    );
}

#[tokio::test]
async fn transport_errors_do_not_leak_api_key() {
    let provider =
        OpenWeatherProvider::new("TEST_KEY".into(), "http://127.0.0.1:1", Duration::from_secs(2))
            .expect("client should build");

    let err = provider.current("London").await.expect_err("connection should fail");

    assert!(matches!(err, ProviderError::Transport(_) | ProviderError::Timeout(_)));
    assert!(!err.to_string().contains("TEST_KEY"), "leaked key in: {err}");
}
