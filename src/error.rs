use std::io;
use thiserror::Error;

/// Startup errors for the weather-now application
#[derive(Error, Debug)]
pub enum AppError {
    /// Error when environment variable is not set
    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    /// Error when a configuration value cannot be parsed
    #[error("Invalid value for {name}: {value}")]
    InvalidConfig { name: String, value: String },

    /// Error when the platform cache directory cannot be determined
    #[error("No cache directory available, set WEATHER_CACHE_DIR")]
    NoCacheDir,

    /// Wrapper for reqwest errors
    #[error("HTTP client error: {0}")]
    RequestError(#[from] reqwest::Error),
}

/// Errors returned by a single weather API call
#[derive(Error, Debug)]
pub enum WeatherError {
    /// The API answered with a non-2xx status
    #[error("Weather API returned HTTP {status}")]
    Http { status: u16 },

    /// The request never produced a response (timeout, DNS, reset)
    #[error("Weather API transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The body was not a complete weather response
    #[error("Failed to parse weather response: {0}")]
    Parse(String),
}

/// Errors from a location request
#[derive(Error, Debug)]
pub enum LocationError {
    /// The platform refused the request
    #[error("Location request denied")]
    Denied,

    /// The provider could not produce a coordinate
    #[error("Location unavailable: {0}")]
    Unavailable(String),
}

/// Errors from the snapshot cache
#[derive(Error, Debug)]
pub enum CacheError {
    /// The backing store failed to read or write
    #[error("Cache store error: {0}")]
    Store(#[from] io::Error),

    /// The stored text is not a valid snapshot
    #[error("Cached snapshot is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}
