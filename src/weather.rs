use std::time::Duration;

use reqwest::Client;
use tracing::{debug, error, info};

use crate::error::WeatherError;
use crate::geo_location::Coordinate;
use crate::units::UnitSystem;

mod response;

pub use response::{Condition, Measurements, Sys, WeatherSnapshot, Wind};

pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Client for the current weather endpoint.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
}

impl WeatherClient {
    /// Creates a client for `base_url` (without the trailing `/weather`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches the current weather at `coord`.
    ///
    /// Issues exactly one GET request. Non-2xx responses fail with
    /// [`WeatherError::Http`], bodies missing required fields or without any
    /// condition fail with [`WeatherError::Parse`].
    pub async fn fetch(
        &self,
        coord: Coordinate,
        units: UnitSystem,
        api_key: &str,
    ) -> Result<WeatherSnapshot, WeatherError> {
        info!("Fetching weather data for location: {}", coord);
        let url = format!("{}/weather", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", coord.latitude.to_string()),
                ("lon", coord.longitude.to_string()),
                ("units", units.as_query().to_string()),
                ("appid", api_key.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            error!("Failed to fetch weather data: {}", status);
            return Err(WeatherError::Http {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let snapshot = parse_snapshot(&body)?;
        debug!("Weather data fetched successfully: {:?}", snapshot);
        Ok(snapshot)
    }
}

/// Parses a response body into a complete snapshot.
pub fn parse_snapshot(body: &str) -> Result<WeatherSnapshot, WeatherError> {
    let snapshot: WeatherSnapshot =
        serde_json::from_str(body).map_err(|e| WeatherError::Parse(e.to_string()))?;
    if snapshot.conditions.is_empty() {
        return Err(WeatherError::Parse("response has no weather conditions".into()));
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONDON: &str = r#"{
        "coord": {"lon": -0.12, "lat": 51.5},
        "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
        "base": "stations",
        "main": {"temp": 11.8, "feels_like": 11.1, "temp_min": 10.4, "temp_max": 12.9, "pressure": 1012, "humidity": 81},
        "visibility": 10000,
        "wind": {"speed": 4.63, "deg": 240},
        "clouds": {"all": 75},
        "dt": 1697709600,
        "sys": {"type": 2, "id": 2075535, "country": "GB", "sunrise": 1697697270, "sunset": 1697734637},
        "timezone": 3600,
        "id": 2643743,
        "name": "London",
        "cod": 200
    }"#;

    #[test]
    fn parses_full_response_and_ignores_extra_fields() {
        let snapshot = parse_snapshot(LONDON).unwrap();
        assert_eq!(snapshot.location_name, "London");
        assert_eq!(snapshot.measurements.temp, 11.8);
        assert_eq!(snapshot.measurements.humidity, 81);
        assert_eq!(snapshot.wind.speed, 4.63);
        assert_eq!(snapshot.system.country, "GB");
        assert_eq!(snapshot.system.kind, Some(2));
        assert_eq!(snapshot.system.message, None);
        let condition = snapshot.primary_condition().unwrap();
        assert_eq!(condition.main, "Rain");
        assert_eq!(condition.icon, "10d");
    }

    #[test]
    fn missing_measurements_is_a_parse_error() {
        let mut value: serde_json::Value = serde_json::from_str(LONDON).unwrap();
        value.as_object_mut().unwrap().remove("main");
        let err = parse_snapshot(&value.to_string()).unwrap_err();
        assert!(matches!(err, WeatherError::Parse(_)));
    }

    #[test]
    fn empty_conditions_is_a_parse_error() {
        let mut value: serde_json::Value = serde_json::from_str(LONDON).unwrap();
        value["weather"] = serde_json::json!([]);
        let err = parse_snapshot(&value.to_string()).unwrap_err();
        assert!(matches!(err, WeatherError::Parse(msg) if msg.contains("no weather conditions")));
    }

    #[test]
    fn non_json_body_is_a_parse_error() {
        assert!(matches!(
            parse_snapshot("<html>busy</html>"),
            Err(WeatherError::Parse(_))
        ));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = WeatherClient::new("http://localhost:1234/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:1234");
    }
}
