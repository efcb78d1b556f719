use serde::{Deserialize, Serialize};

/// One reading from the OpenWeatherMap current weather endpoint.
/// The same JSON shape is used for the cached copy.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    /// Weather conditions, most significant first
    #[serde(rename = "weather")]
    pub conditions: Vec<Condition>,
    /// Temperature and humidity readings
    #[serde(rename = "main")]
    pub measurements: Measurements,
    pub wind: Wind,
    /// Country and daylight times
    #[serde(rename = "sys")]
    pub system: Sys,
    /// Name of the place the reading belongs to
    #[serde(rename = "name")]
    pub location_name: String,
}

impl WeatherSnapshot {
    /// The condition shown on screen
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.conditions.first()
    }
}

/// Weather condition, e.g. "Rain" / "light rain" / "10d"
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Condition {
    /// Numeric condition id, not used for display
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub main: String,
    pub description: String,
    /// Icon code such as `01d`
    pub icon: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Measurements {
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    /// Humidity percentage (0-100)
    pub humidity: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Wind {
    /// m/s for metric requests, miles/hour for imperial
    pub speed: f64,
}

/// `sys` block. `type`, `message` and `id` are API metadata kept as-is.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Sys {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// ISO-3166-1 alpha-2 country code
    pub country: String,
    /// Unix seconds
    pub sunrise: i64,
    /// Unix seconds
    pub sunset: i64,
}
