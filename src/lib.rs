// Single-slot snapshot cache on top of a string key-value store
pub mod cache;
pub mod config;
// Fetch-and-present flow for one weather screen
pub mod controller;
pub mod error;
pub mod geo_location;
pub mod icon;
// Location and network checks that run before any request
pub mod platform;
pub mod render;
pub mod units;
pub mod weather;

pub use cache::{FileStore, KeyValueStore, MemoryStore, WeatherCache};
pub use config::{Config, ConfiguredLocator, LocationSource};
pub use controller::{
    ControllerConfig, FailureReason, FetchFailure, FlowState, OrchestrationController,
};
pub use error::{AppError, CacheError, LocationError, WeatherError};
pub use geo_location::{
    Coordinate, FixedLocator, IpGeoLocator, LocationProvider, UpdateStreamLocator,
};
pub use icon::{Icon, icon_for_code};
pub use platform::{DesktopPlatform, PermissionOutcome, Platform};
pub use render::{SettingsPage, WeatherDisplay, WeatherView, render};
pub use units::{DisplayUnits, UnitSystem, unit_system_for_locale, units_for_locale};
pub use weather::{WeatherClient, WeatherSnapshot};
