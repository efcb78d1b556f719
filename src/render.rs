use std::fmt::Display;

use chrono::TimeZone;

use crate::icon::{Icon, icon_for_code};
use crate::units::{UnitSystem, unit_system_for_locale, units_for_locale};
use crate::weather::WeatherSnapshot;

const MPS_TO_KMH: f64 = 3.6;

/// Display fields of the weather screen
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherDisplay {
    pub main: String,
    pub description: String,
    pub temperature: String,
    pub temp_min: String,
    pub temp_max: String,
    pub sunrise: String,
    pub sunset: String,
    pub wind_speed: String,
    pub wind_unit: String,
    pub humidity: String,
    pub country: String,
    pub location_name: String,
    /// `None` when the condition code has no icon
    pub icon: Option<Icon>,
}

/// System settings screens the user can be sent to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsPage {
    LocationSource,
    AppPermissions,
}

/// What the controller can do to the screen. Implementations marshal onto
/// whatever thread owns the UI.
pub trait WeatherView: Send + Sync {
    fn display(&self, weather: &WeatherDisplay);

    /// Short-lived message that does not replace the displayed weather
    fn show_notice(&self, message: &str);

    fn open_settings(&self, page: SettingsPage);

    /// Tell the user why location access is needed
    fn explain_location_permission(&self);

    fn set_busy(&self, busy: bool);
}

/// Builds display text for `snapshot`. The snapshot must have been fetched
/// with the unit system of `locale`.
pub fn render<Tz>(snapshot: &WeatherSnapshot, locale: &str, tz: &Tz) -> WeatherDisplay
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let units = units_for_locale(locale);
    let condition = snapshot.primary_condition();
    let m = &snapshot.measurements;

    let wind_speed = match unit_system_for_locale(locale) {
        // The API reports metric wind in m/s.
        UnitSystem::Metric => round_tenths(snapshot.wind.speed * MPS_TO_KMH),
        UnitSystem::Imperial => snapshot.wind.speed,
    };

    WeatherDisplay {
        main: condition.map(|c| c.main.clone()).unwrap_or_default(),
        description: condition.map(|c| c.description.clone()).unwrap_or_default(),
        temperature: format!("{}{}", decimal(m.temp), units.temperature),
        temp_min: format!("{}{}", decimal(m.temp_min), units.temperature),
        temp_max: format!("{}{}", decimal(m.temp_max), units.temperature),
        sunrise: clock_time(snapshot.system.sunrise, tz),
        sunset: clock_time(snapshot.system.sunset, tz),
        wind_speed: decimal(wind_speed),
        wind_unit: units.wind_speed.to_string(),
        humidity: format!("{} %", m.humidity),
        country: snapshot.system.country.clone(),
        location_name: snapshot.location_name.clone(),
        icon: condition.and_then(|c| icon_for_code(&c.icon)),
    }
}

/// `hh:mm AM` for a unix timestamp in `tz`.
pub fn clock_time<Tz>(unix_secs: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match tz.timestamp_opt(unix_secs, 0).single() {
        Some(time) => time.format("%I:%M %p").to_string(),
        None => "--:--".to_string(),
    }
}

/// Number text that keeps one decimal place for whole values, `15.0` not `15`.
fn decimal(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
