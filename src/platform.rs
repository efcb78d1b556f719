use std::future::Future;
use std::time::Duration;

use reqwest::Url;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// Result of asking for coarse and fine location permission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionOutcome {
    Granted,
    PermanentlyDenied,
    /// The user should be told why location is needed before asking again
    RationaleRequired,
}

/// Location service and connectivity state of the device.
pub trait Platform: Send + Sync {
    fn is_location_enabled(&self) -> impl Future<Output = bool> + Send;

    fn request_location_permission(&self) -> impl Future<Output = PermissionOutcome> + Send;

    fn is_network_available(&self) -> impl Future<Output = bool> + Send;
}

/// Platform for a desktop process: location availability and consent come
/// from configuration, reachability is a TCP connect to the API host.
#[derive(Debug, Clone)]
pub struct DesktopPlatform {
    location_enabled: bool,
    consent: PermissionOutcome,
    probe: Option<(String, u16)>,
    probe_timeout: Duration,
}

impl DesktopPlatform {
    pub fn new(location_enabled: bool, consent: PermissionOutcome) -> Self {
        Self {
            location_enabled,
            consent,
            probe: None,
            probe_timeout: Duration::from_secs(3),
        }
    }

    /// Checks reachability by connecting to the host of `url`.
    /// URLs without a host leave the check disabled.
    pub fn with_probe_url(mut self, url: &str, probe_timeout: Duration) -> Self {
        self.probe = Url::parse(url).ok().and_then(|url| {
            let host = url.host_str()?.to_string();
            let port = url.port_or_known_default()?;
            Some((host, port))
        });
        self.probe_timeout = probe_timeout;
        self
    }
}

impl Platform for DesktopPlatform {
    async fn is_location_enabled(&self) -> bool {
        self.location_enabled
    }

    async fn request_location_permission(&self) -> PermissionOutcome {
        self.consent
    }

    async fn is_network_available(&self) -> bool {
        let Some((host, port)) = &self.probe else {
            return true;
        };
        match timeout(self.probe_timeout, TcpStream::connect((host.as_str(), *port))).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!("Reachability probe to {}:{} failed: {}", host, port, e);
                false
            }
            Err(_) => {
                debug!("Reachability probe to {}:{} timed out", host, port);
                false
            }
        }
    }
}
