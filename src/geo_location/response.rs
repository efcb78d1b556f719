/// Response structure for the IPGeolocation `ipgeo` API.
/// Coordinates arrive as decimal strings.
#[derive(serde::Deserialize, Debug)]
pub struct GeoResponse {
    /// Latitude, e.g. "51.50853"
    pub latitude: String,
    /// Longitude, e.g. "-0.12574"
    pub longitude: String,
}
