//! Weather API client behavior against a mock HTTP server.

use std::time::Duration;

use tokio::net::TcpListener;
use weather_now::{Coordinate, UnitSystem, WeatherClient, WeatherError};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

/// Sample OpenWeatherMap current weather response
fn london_response() -> serde_json::Value {
    serde_json::json!({
        "coord": {"lon": -0.12, "lat": 51.5},
        "weather": [
            {"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"}
        ],
        "base": "stations",
        "main": {
            "temp": 11.8,
            "feels_like": 11.1,
            "temp_min": 10.4,
            "temp_max": 12.9,
            "pressure": 1012,
            "humidity": 81
        },
        "visibility": 10000,
        "wind": {"speed": 4.63, "deg": 240},
        "clouds": {"all": 75},
        "dt": 1697709600,
        "sys": {
            "type": 2,
            "id": 2075535,
            "country": "GB",
            "sunrise": 1697697270,
            "sunset": 1697734637
        },
        "timezone": 3600,
        "id": 2643743,
        "name": "London",
        "cod": 200
    })
}

fn london() -> Coordinate {
    Coordinate::new(51.5, -0.12).unwrap()
}

fn client_for(server: &MockServer) -> WeatherClient {
    WeatherClient::new(format!("{}/data/2.5", server.uri()), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn fetch_sends_coordinates_units_and_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "51.5"))
        .and(query_param("lon", "-0.12"))
        .and(query_param("units", "metric"))
        .and(query_param("appid", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_response()))
        .expect(1)
        .mount(&server)
        .await;

    let snapshot = client_for(&server)
        .fetch(london(), UnitSystem::Metric, "test-key")
        .await
        .unwrap();

    assert_eq!(snapshot.location_name, "London");
    assert_eq!(snapshot.measurements.temp, 11.8);
    assert_eq!(snapshot.measurements.temp_min, 10.4);
    assert_eq!(snapshot.measurements.temp_max, 12.9);
    assert_eq!(snapshot.system.country, "GB");
    assert_eq!(snapshot.system.sunrise, 1_697_697_270);
    assert_eq!(snapshot.conditions.len(), 1);
    assert_eq!(snapshot.conditions[0].description, "broken clouds");
}

#[tokio::test]
async fn imperial_units_are_requested() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("units", "imperial"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_response()))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server)
        .fetch(london(), UnitSystem::Imperial, "test-key")
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn not_found_is_an_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch(london(), UnitSystem::Metric, "test-key")
        .await
        .unwrap_err();
    assert!(matches!(err, WeatherError::Http { status: 404 }));
}

#[tokio::test]
async fn other_statuses_are_http_errors() {
    for status in [400u16, 401, 429, 500, 503] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch(london(), UnitSystem::Metric, "test-key")
            .await
            .unwrap_err();
        assert!(
            matches!(err, WeatherError::Http { status: s } if s == status),
            "status {status}: {err}"
        );
    }
}

#[tokio::test]
async fn missing_measurements_is_a_parse_error() {
    let mut body = london_response();
    body.as_object_mut().unwrap().remove("main");

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch(london(), UnitSystem::Metric, "test-key")
        .await
        .unwrap_err();
    assert!(matches!(err, WeatherError::Parse(_)));
}

#[tokio::test]
async fn zero_conditions_is_a_parse_error() {
    let mut body = london_response();
    body["weather"] = serde_json::json!([]);

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch(london(), UnitSystem::Metric, "test-key")
        .await
        .unwrap_err();
    assert!(matches!(err, WeatherError::Parse(_)));
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = WeatherClient::new(format!("http://{addr}"), Duration::from_secs(2)).unwrap();
    let err = client
        .fetch(london(), UnitSystem::Metric, "test-key")
        .await
        .unwrap_err();
    assert!(matches!(err, WeatherError::Transport(_)));
}

#[tokio::test]
async fn slow_server_times_out_as_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(london_response())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = WeatherClient::new(
        format!("{}/data/2.5", server.uri()),
        Duration::from_millis(200),
    )
    .unwrap();
    let err = client
        .fetch(london(), UnitSystem::Metric, "test-key")
        .await
        .unwrap_err();
    assert!(matches!(err, WeatherError::Transport(_)));
}
