use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::debug;

use crate::controller::{ControllerConfig, DEFAULT_LOCATION_TIMEOUT};
use crate::error::{AppError, LocationError};
use crate::geo_location::{
    Coordinate, DEFAULT_GEO_LOCATION_BASE_URL, FixedLocator, IpGeoLocator, LocationProvider,
};
use crate::platform::PermissionOutcome;
use crate::units::region_from_locale_tag;
use crate::weather::DEFAULT_WEATHER_BASE_URL;

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(15);
const CACHE_DIR_NAME: &str = "weather-now";

/// Where the device position comes from
#[derive(Debug, Clone, PartialEq)]
pub enum LocationSource {
    Fixed(Coordinate),
    IpGeolocation { base_url: String, api_key: String },
    /// No source configured: the location service counts as switched off
    Disabled,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub weather_base_url: String,
    /// Region code used for units, empty when unknown
    pub locale: String,
    pub location: LocationSource,
    pub consent: PermissionOutcome,
    pub cache_dir: PathBuf,
    pub http_timeout: Duration,
    pub location_timeout: Duration,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = var("WEATHER_API_KEY")
            .ok_or_else(|| AppError::EnvVarNotSet("WEATHER_API_KEY".to_string()))?;

        let weather_base_url =
            var("WEATHER_API_BASE_URL").unwrap_or_else(|| DEFAULT_WEATHER_BASE_URL.to_string());

        let locale = match var("WEATHER_LOCALE") {
            Some(locale) => locale.trim().to_string(),
            None => var("LANG")
                .and_then(|tag| region_from_locale_tag(&tag))
                .unwrap_or_default(),
        };

        let latitude = parse_var::<f64, _>(&var, "WEATHER_LATITUDE")?;
        let longitude = parse_var::<f64, _>(&var, "WEATHER_LONGITUDE")?;
        let location = match (latitude, longitude) {
            (Some(lat), Some(lon)) => {
                let coord = Coordinate::new(lat, lon).ok_or_else(|| AppError::InvalidConfig {
                    name: "WEATHER_LATITUDE/WEATHER_LONGITUDE".to_string(),
                    value: format!("{lat},{lon}"),
                })?;
                LocationSource::Fixed(coord)
            }
            (Some(_), None) => {
                return Err(AppError::EnvVarNotSet("WEATHER_LONGITUDE".to_string()));
            }
            (None, Some(_)) => {
                return Err(AppError::EnvVarNotSet("WEATHER_LATITUDE".to_string()));
            }
            (None, None) => match var("IP_GEOLOCATION_API_KEY") {
                Some(api_key) => LocationSource::IpGeolocation {
                    base_url: var("IP_GEOLOCATION_BASE_URL")
                        .unwrap_or_else(|| DEFAULT_GEO_LOCATION_BASE_URL.to_string()),
                    api_key,
                },
                None => LocationSource::Disabled,
            },
        };

        let consent = match var("WEATHER_LOCATION_CONSENT").as_deref().map(str::trim) {
            None | Some("granted") => PermissionOutcome::Granted,
            Some("denied") => PermissionOutcome::PermanentlyDenied,
            Some(other) => {
                return Err(AppError::InvalidConfig {
                    name: "WEATHER_LOCATION_CONSENT".to_string(),
                    value: other.to_string(),
                });
            }
        };

        let cache_dir = match var("WEATHER_CACHE_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::cache_dir()
                .ok_or(AppError::NoCacheDir)?
                .join(CACHE_DIR_NAME),
        };

        let http_timeout = parse_var::<u64, _>(&var, "WEATHER_HTTP_TIMEOUT_SECS")?
            .map_or(DEFAULT_HTTP_TIMEOUT, Duration::from_secs);
        let location_timeout = parse_var::<u64, _>(&var, "WEATHER_LOCATION_TIMEOUT_SECS")?
            .map_or(DEFAULT_LOCATION_TIMEOUT, Duration::from_secs);

        let config = Self {
            api_key,
            weather_base_url,
            locale,
            location,
            consent,
            cache_dir,
            http_timeout,
            location_timeout,
        };
        debug!(
            "Loaded config: base_url={}, locale={:?}, location={:?}",
            config.weather_base_url, config.locale, config.location
        );
        Ok(config)
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            api_key: self.api_key.clone(),
            locale: self.locale.clone(),
            location_timeout: self.location_timeout,
        }
    }

    pub fn location_enabled(&self) -> bool {
        self.location != LocationSource::Disabled
    }

    /// Builds the provider for the configured location source.
    pub fn locator(&self) -> Result<ConfiguredLocator, AppError> {
        Ok(match &self.location {
            LocationSource::Fixed(coord) => ConfiguredLocator::Fixed(FixedLocator(*coord)),
            LocationSource::IpGeolocation { base_url, api_key } => ConfiguredLocator::Ip(
                IpGeoLocator::new(base_url.as_str(), api_key.as_str(), self.http_timeout)?,
            ),
            LocationSource::Disabled => ConfiguredLocator::Disabled,
        })
    }
}

fn parse_var<T, F>(var: &F, name: &str) -> Result<Option<T>, AppError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    var(name)
        .map(|value| {
            value.trim().parse::<T>().map_err(|_| AppError::InvalidConfig {
                name: name.to_string(),
                value,
            })
        })
        .transpose()
}

/// The location provider picked at startup
#[derive(Debug)]
pub enum ConfiguredLocator {
    Fixed(FixedLocator),
    Ip(IpGeoLocator),
    Disabled,
}

impl LocationProvider for ConfiguredLocator {
    async fn current_coordinate(&self) -> Result<Coordinate, LocationError> {
        match self {
            Self::Fixed(locator) => locator.current_coordinate().await,
            Self::Ip(locator) => locator.current_coordinate().await,
            Self::Disabled => Err(LocationError::Unavailable(
                "no location source configured".to_string(),
            )),
        }
    }
}
