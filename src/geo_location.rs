// Module containing response data structures for the geolocation service
mod response;

use std::fmt;
use std::future::Future;
use std::pin::pin;
use std::time::Duration;

use futures::{Stream, StreamExt};
use reqwest::Client;
use tracing::{debug, error, info};

use crate::error::LocationError;

// Default endpoint for the IPGeolocation service
pub const DEFAULT_GEO_LOCATION_BASE_URL: &str = "https://api.ipgeolocation.io";

/// A WGS84 position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Builds a coordinate, rejecting values outside the valid ranges.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude);
        valid.then_some(Self {
            latitude,
            longitude,
        })
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Source of a single best-effort position.
///
/// Each call is a one-shot request: it resolves with the first fix and does
/// not keep tracking afterwards. Callers check that the location service is
/// enabled and permitted before asking.
pub trait LocationProvider: Send + Sync {
    fn current_coordinate(&self) -> impl Future<Output = Result<Coordinate, LocationError>> + Send;
}

/// Always answers with the configured coordinate.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocator(pub Coordinate);

impl LocationProvider for FixedLocator {
    async fn current_coordinate(&self) -> Result<Coordinate, LocationError> {
        Ok(self.0)
    }
}

/// Locates the device by its public IP using the IPGeolocation API.
#[derive(Debug, Clone)]
pub struct IpGeoLocator {
    client: Client,
    base_url: String,
    api_key: String,
}

impl IpGeoLocator {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }
}

impl LocationProvider for IpGeoLocator {
    /// Fetches the position of the current public IP.
    ///
    /// # Returns
    /// * `Coordinate` parsed from the service's `latitude`/`longitude` fields
    /// * `LocationError::Unavailable` if the request fails, the service
    ///   answers with an unsuccessful status, or the coordinates don't parse
    async fn current_coordinate(&self) -> Result<Coordinate, LocationError> {
        info!("Fetching location for current IP");

        let url = format!("{}/ipgeo", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            // Log and return error for unsuccessful responses
            error!("Failed to fetch location data: {}", response.status());
            return Err(LocationError::Unavailable(format!(
                "geolocation service returned {}",
                response.status()
            )));
        }

        let geo: response::GeoResponse = response
            .json()
            .await
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;
        debug!("Location data fetched successfully: {:?}", geo);

        let latitude = geo.latitude.trim().parse::<f64>();
        let longitude = geo.longitude.trim().parse::<f64>();
        match (latitude, longitude) {
            (Ok(lat), Ok(lon)) => Coordinate::new(lat, lon).ok_or_else(|| {
                LocationError::Unavailable(format!("coordinate out of range: {lat},{lon}"))
            }),
            _ => Err(LocationError::Unavailable(format!(
                "unparseable coordinate: {},{}",
                geo.latitude, geo.longitude
            ))),
        }
    }
}

/// Adapts a platform that delivers continuous location updates into one-shot
/// requests: every call opens a fresh update stream, takes the first item and
/// drops the stream, which stops the updates.
pub struct UpdateStreamLocator<F> {
    open: F,
}

impl<F> UpdateStreamLocator<F> {
    pub fn new(open: F) -> Self {
        Self { open }
    }
}

impl<F> fmt::Debug for UpdateStreamLocator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateStreamLocator").finish_non_exhaustive()
    }
}

impl<F, S> LocationProvider for UpdateStreamLocator<F>
where
    F: Fn() -> S + Send + Sync,
    S: Stream<Item = Result<Coordinate, LocationError>> + Send,
{
    async fn current_coordinate(&self) -> Result<Coordinate, LocationError> {
        let mut updates = pin!((self.open)());
        match updates.next().await {
            Some(update) => update,
            None => Err(LocationError::Unavailable(
                "location updates ended without a fix".into(),
            )),
        }
    }
}
