use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, span, warn};
use tracing_subscriber::EnvFilter;
use weather_now::{
    Config, ConfiguredLocator, DesktopPlatform, FileStore, OrchestrationController, SettingsPage,
    WeatherCache, WeatherClient, WeatherDisplay, WeatherView,
};

const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Prints the screen to the terminal.
struct ConsoleView;

impl WeatherView for ConsoleView {
    fn display(&self, w: &WeatherDisplay) {
        span!(tracing::Level::INFO, "screen").in_scope(|| {
            info!("{}, {}", w.location_name, w.country);
            info!(
                "{} ({}) [{}]",
                w.main,
                w.description,
                w.icon.map_or("-", |icon| icon.as_str())
            );
            info!("Temperature {} (min {}, max {})", w.temperature, w.temp_min, w.temp_max);
            info!("Humidity {}, wind {} {}", w.humidity, w.wind_speed, w.wind_unit);
            info!("Sunrise {}, sunset {}", w.sunrise, w.sunset);
        });
    }

    fn show_notice(&self, message: &str) {
        span!(tracing::Level::INFO, "screen").in_scope(|| warn!("{}", message));
    }

    fn open_settings(&self, page: SettingsPage) {
        let hint = match page {
            SettingsPage::LocationSource => {
                "set WEATHER_LATITUDE/WEATHER_LONGITUDE or IP_GEOLOCATION_API_KEY"
            }
            SettingsPage::AppPermissions => "set WEATHER_LOCATION_CONSENT=granted",
        };
        info!("To enable location, {}", hint);
    }

    fn explain_location_permission(&self) {
        info!("Location is needed to show the weather where you are");
    }

    fn set_busy(&self, busy: bool) {
        if busy {
            info!("Loading weather...");
        }
    }
}

type Controller =
    OrchestrationController<DesktopPlatform, ConfiguredLocator, FileStore, ConsoleView>;

/// Runs the flow in the background so the prompt stays responsive.
fn spawn_refresh(controller: &Arc<Controller>, launch: bool) {
    let controller = Arc::clone(controller);
    tokio::spawn(async move {
        let outcome = if launch {
            controller.launch().await
        } else {
            controller.refresh().await
        };
        match outcome {
            Some(state) => debug!("Refresh settled in {:?}", state),
            None => info!("Already refreshing"),
        }
    });
}

fn prompt() -> std::io::Result<()> {
    print!("> ");
    std::io::stdout().flush()
}

/// Shows the weather for the current location on start, then waits for
/// `refresh` commands until the user sends `exit`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let client = WeatherClient::new(config.weather_base_url.as_str(), config.http_timeout)?;
    let platform = DesktopPlatform::new(config.location_enabled(), config.consent)
        .with_probe_url(&config.weather_base_url, PROBE_TIMEOUT);
    let cache = WeatherCache::new(FileStore::new(config.cache_dir.clone()));
    let controller = Arc::new(OrchestrationController::new(
        config.controller_config(),
        platform,
        config.locator()?,
        client,
        cache,
        ConsoleView,
    ));

    info!("Send `refresh` to update, `exit` to stop");
    spawn_refresh(&controller, true);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    "exit" => break,
                    "refresh" | "r" => spawn_refresh(&controller, false),
                    "" => {}
                    other => warn!("Unknown command: {}", other),
                }
                prompt()?;
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    controller.close();
    Ok(())
}
