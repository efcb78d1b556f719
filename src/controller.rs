use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Local;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Level, debug, error, info, span, warn};

use crate::cache::{KeyValueStore, WeatherCache};
use crate::error::{CacheError, WeatherError};
use crate::geo_location::{Coordinate, LocationProvider};
use crate::platform::{PermissionOutcome, Platform};
use crate::render::{SettingsPage, WeatherView, render};
use crate::units::unit_system_for_locale;
use crate::weather::{WeatherClient, WeatherSnapshot};

pub const DEFAULT_LOCATION_TIMEOUT: Duration = Duration::from_secs(15);

/// Where the flow currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    CheckingAvailability,
    RequestingPermission,
    AcquiringLocation,
    FetchingWeather,
    Rendering,
    Rendered,
    Failed(FailureReason),
}

impl FlowState {
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Idle | Self::Rendered | Self::Failed(_))
    }
}

/// How a weather API call went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchFailure {
    Http { status: u16 },
    Transport,
    Parse,
}

impl From<&WeatherError> for FetchFailure {
    fn from(err: &WeatherError) -> Self {
        match err {
            WeatherError::Http { status } => Self::Http { status: *status },
            WeatherError::Transport(_) => Self::Transport,
            WeatherError::Parse(_) => Self::Parse,
        }
    }
}

/// Why a refresh ended without rendering. The message is what the user sees.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    #[error("Your location is off")]
    ServiceDisabled,
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Could not determine your location")]
    LocationUnavailable,
    #[error("Internet not connected")]
    NoConnectivity,
    #[error("Could not load the weather")]
    Fetch(FetchFailure),
    #[error("Stored weather could not be read")]
    CacheCorrupt,
    #[error("Weather could not be stored")]
    CacheWrite,
    #[error("Screen closed")]
    Cancelled,
}

/// Per-screen settings
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub api_key: String,
    /// Region code deciding units, e.g. `US`
    pub locale: String,
    pub location_timeout: Duration,
}

/// Clears the busy flag when a refresh ends, however it ends.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct OrchestrationController<P, L, S, V> {
    config: ControllerConfig,
    platform: P,
    locator: L,
    client: WeatherClient,
    cache: Arc<WeatherCache<S>>,
    view: V,
    busy: AtomicBool,
    screen: CancellationToken,
    state: watch::Sender<FlowState>,
}

impl<P, L, S, V> OrchestrationController<P, L, S, V>
where
    P: Platform,
    L: LocationProvider,
    S: KeyValueStore + 'static,
    V: WeatherView,
{
    pub fn new(
        config: ControllerConfig,
        platform: P,
        locator: L,
        client: WeatherClient,
        cache: WeatherCache<S>,
        view: V,
    ) -> Self {
        let (state, _) = watch::channel(FlowState::Idle);
        Self {
            config,
            platform,
            locator,
            client,
            cache: Arc::new(cache),
            view,
            busy: AtomicBool::new(false),
            screen: CancellationToken::new(),
            state,
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn cache(&self) -> &WeatherCache<S> {
        &self.cache
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn state(&self) -> FlowState {
        *self.state.borrow()
    }

    /// Watch state transitions
    pub fn subscribe(&self) -> watch::Receiver<FlowState> {
        self.state.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Shows the last stored snapshot, if any, then refreshes.
    pub async fn launch(&self) -> Option<FlowState> {
        self.render_cached().await;
        self.refresh().await
    }

    /// Displays the cached snapshot without fetching. Returns whether there
    /// was one.
    pub async fn render_cached(&self) -> bool {
        match self.read_cache().await {
            Ok(Some(snapshot)) => {
                self.show(&snapshot);
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!("Ignoring cached weather: {}", e);
                false
            }
        }
    }

    /// Runs the whole flow once.
    ///
    /// Returns the settled state, or `None` when another refresh is still in
    /// flight and this trigger was ignored.
    pub async fn refresh(&self) -> Option<FlowState> {
        let Some(_guard) = self.try_begin() else {
            debug!("Refresh already in flight, ignoring trigger");
            return None;
        };

        let token = self.screen.child_token();
        let settled = match self
            .run(&token)
            .instrument(span!(Level::INFO, "refresh"))
            .await
        {
            Ok(()) => FlowState::Rendered,
            Err(reason) => {
                self.report(reason);
                FlowState::Failed(reason)
            }
        };
        self.enter(settled);
        Some(settled)
    }

    /// Tears the screen down: cancels the outstanding location request and
    /// makes an in-flight fetch drop its result.
    pub fn close(&self) {
        info!("Closing weather screen");
        self.screen.cancel();
    }

    fn try_begin(&self) -> Option<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(&self.busy))
    }

    async fn run(&self, token: &CancellationToken) -> Result<(), FailureReason> {
        if token.is_cancelled() {
            return Err(FailureReason::Cancelled);
        }

        self.enter(FlowState::CheckingAvailability);
        if !self.platform.is_location_enabled().await {
            return Err(FailureReason::ServiceDisabled);
        }

        self.enter(FlowState::RequestingPermission);
        self.ensure_permission().await?;

        self.enter(FlowState::AcquiringLocation);
        let coord = self.acquire_location(token).await?;

        self.enter(FlowState::FetchingWeather);
        if !self.platform.is_network_available().await {
            return Err(FailureReason::NoConnectivity);
        }
        let snapshot = self.fetch(coord, token).await?;
        if token.is_cancelled() {
            debug!("Discarding weather fetched after the screen closed");
            return Err(FailureReason::Cancelled);
        }
        self.write_cache(snapshot).await.map_err(|e| {
            error!("Failed to store weather snapshot: {}", e);
            FailureReason::CacheWrite
        })?;

        self.enter(FlowState::Rendering);
        match self.read_cache().await {
            Ok(Some(snapshot)) => {
                self.show(&snapshot);
                Ok(())
            }
            Ok(None) => {
                error!("Weather snapshot missing right after it was stored");
                Err(FailureReason::CacheCorrupt)
            }
            Err(e) => {
                error!("Failed to read back weather snapshot: {}", e);
                Err(FailureReason::CacheCorrupt)
            }
        }
    }

    async fn ensure_permission(&self) -> Result<(), FailureReason> {
        match self.platform.request_location_permission().await {
            PermissionOutcome::Granted => Ok(()),
            PermissionOutcome::PermanentlyDenied => Err(FailureReason::PermissionDenied),
            PermissionOutcome::RationaleRequired => {
                self.view.explain_location_permission();
                match self.platform.request_location_permission().await {
                    PermissionOutcome::Granted => Ok(()),
                    outcome => {
                        info!("Location permission not granted after rationale: {outcome:?}");
                        Err(FailureReason::PermissionDenied)
                    }
                }
            }
        }
    }

    async fn acquire_location(
        &self,
        token: &CancellationToken,
    ) -> Result<Coordinate, FailureReason> {
        let wait = self.config.location_timeout;
        tokio::select! {
            _ = token.cancelled() => Err(FailureReason::Cancelled),
            result = timeout(wait, self.locator.current_coordinate()) => match result {
                Ok(Ok(coord)) => {
                    info!(
                        "Current latitude: {}, longitude: {}",
                        coord.latitude, coord.longitude
                    );
                    Ok(coord)
                }
                Ok(Err(e)) => {
                    warn!("Location request failed: {}", e);
                    Err(FailureReason::LocationUnavailable)
                }
                Err(_) => {
                    warn!("No location fix within {:?}", wait);
                    Err(FailureReason::LocationUnavailable)
                }
            },
        }
    }

    async fn fetch(
        &self,
        coord: Coordinate,
        token: &CancellationToken,
    ) -> Result<WeatherSnapshot, FailureReason> {
        let units = unit_system_for_locale(&self.config.locale);
        self.view.set_busy(true);
        let result = tokio::select! {
            _ = token.cancelled() => Err(FailureReason::Cancelled),
            result = self.client.fetch(coord, units, &self.config.api_key) => {
                result.map_err(|e| {
                    log_fetch_error(&e);
                    FailureReason::Fetch(FetchFailure::from(&e))
                })
            }
        };
        self.view.set_busy(false);
        result
    }

    // The store may hit the filesystem, so it runs on the blocking pool.
    async fn write_cache(&self, snapshot: WeatherSnapshot) -> Result<(), CacheError> {
        let cache = Arc::clone(&self.cache);
        task::spawn_blocking(move || cache.save(&snapshot))
            .await
            .unwrap_or_else(|e| Err(CacheError::Store(io::Error::other(e))))
    }

    async fn read_cache(&self) -> Result<Option<WeatherSnapshot>, CacheError> {
        let cache = Arc::clone(&self.cache);
        task::spawn_blocking(move || cache.try_load())
            .await
            .unwrap_or_else(|e| Err(CacheError::Store(io::Error::other(e))))
    }

    fn show(&self, snapshot: &WeatherSnapshot) {
        let display = render(snapshot, &self.config.locale, &Local);
        self.view.display(&display);
    }

    fn report(&self, reason: FailureReason) {
        match reason {
            FailureReason::Cancelled => {}
            FailureReason::ServiceDisabled => {
                self.view.show_notice(&reason.to_string());
                self.view.open_settings(SettingsPage::LocationSource);
            }
            FailureReason::PermissionDenied => {
                self.view.show_notice(&reason.to_string());
                self.view.open_settings(SettingsPage::AppPermissions);
            }
            _ => self.view.show_notice(&reason.to_string()),
        }
    }

    fn enter(&self, next: FlowState) {
        debug!("Weather flow: {:?}", next);
        self.state.send_replace(next);
    }
}

fn log_fetch_error(err: &WeatherError) {
    match err {
        WeatherError::Http { status: 400 } => {
            error!("Weather API rejected the request (400 bad request)")
        }
        WeatherError::Http { status: 404 } => error!("Weather API endpoint not found (404)"),
        WeatherError::Http { status } => error!("Weather API failed with status {}", status),
        other => error!("Weather fetch failed: {}", other),
    }
}
