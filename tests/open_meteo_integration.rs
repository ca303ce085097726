//! Open-Meteo adapter against a mock HTTP server.

mod common;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use renewable_sim::config::WeatherConfig;
use renewable_sim::weather::{ConditionClass, OpenMeteoClient, WeatherError, WeatherProvider};

fn client_for(server: &MockServer) -> OpenMeteoClient {
    let config = WeatherConfig {
        provider: "open-meteo".to_string(),
        geocoding_url: format!("{}/v1/search", server.uri()),
        forecast_url: format!("{}/v1/forecast", server.uri()),
        timeout_secs: 2,
    };
    OpenMeteoClient::new(&config, common::ist()).unwrap()
}

async fn mount_geocoding(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn resolves_city_and_maps_current_conditions() {
    let server = MockServer::start().await;
    mount_geocoding(
        &server,
        json!({"results": [{"name": "Pune", "latitude": 18.52, "longitude": 73.86}]}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "18.52"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "utc_offset_seconds": 19800,
            "current": {
                "temperature_2m": 29.46,
                "relative_humidity_2m": 70.0,
                "apparent_temperature": 33.04,
                "is_day": 1,
                "weather_code": 63,
                "cloud_cover": 88.0,
                "pressure_msl": 1006.6,
                "wind_speed_10m": 12.34
            },
            "daily": {
                "sunrise": ["2024-06-01T06:00"],
                "sunset": ["2024-06-01T19:05"]
            }
        })))
        .mount(&server)
        .await;

    let snapshot = client_for(&server).lookup("pune").await.unwrap();

    assert_eq!(snapshot.city, "Pune");
    assert_eq!(snapshot.temperature_c, 29.5);
    assert_eq!(snapshot.condition, ConditionClass::Rain);
    assert_eq!(snapshot.icon, "10d");
    assert_eq!(snapshot.cloud_percent, 88.0);
    assert_eq!(snapshot.pressure_hpa, 1007.0);
    assert_eq!(snapshot.sunrise.to_rfc3339(), "2024-06-01T00:30:00+00:00");
    assert!(snapshot.sunrise < snapshot.sunset);
}

#[tokio::test]
async fn unknown_city_reports_not_found() {
    let server = MockServer::start().await;
    mount_geocoding(&server, json!({"generationtime_ms": 0.3})).await;

    let err = client_for(&server).lookup("Atlantis").await.unwrap_err();
    assert!(matches!(err, WeatherError::CityNotFound(ref c) if c == "Atlantis"));
    assert_eq!(err.to_string(), "City 'Atlantis' not found");
}

#[tokio::test]
async fn provider_falls_back_on_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let now = common::local_noon();
    let report = client_for(&server).fetch("Mumbai", now).await;

    assert!(!report.is_live());
    assert!(matches!(report.error, Some(WeatherError::Http(_))));
    assert_eq!(report.snapshot.city, "Mumbai");
    assert_eq!(report.snapshot.condition, ConditionClass::Clear);
    assert_eq!(report.snapshot.temperature_c, 32.0);
}
