// ── Runtime connection configuration ──
//
// These types describe *how* to reach a Smile gateway. They carry the
// credential and tuning data but never touch disk: `adam-config` (or any
// other host) builds a `GatewayConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;

pub const DEFAULT_NAME: &str = "Anna";
pub const DEFAULT_USERNAME: &str = "smile";
pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MIN_TEMP: f64 = 4.0;
pub const DEFAULT_MAX_TEMP: f64 = 30.0;

/// Allowed target temperature range for thermostats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for TemperatureBounds {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_TEMP,
            max: DEFAULT_MAX_TEMP,
        }
    }
}

impl TemperatureBounds {
    pub fn contains(&self, temperature: f64) -> bool {
        (self.min..=self.max).contains(&temperature)
    }
}

/// Configuration for one gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Display name of the installation.
    pub name: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    /// The Smile ID printed on the gateway.
    pub password: SecretString,
    /// Minimum time between two unforced refreshes.
    pub scan_interval: Duration,
    /// Per-request timeout.
    pub timeout: Duration,
    pub bounds: TemperatureBounds,
}

impl GatewayConfig {
    /// Config with every optional field at its default.
    pub fn new(host: impl Into<String>, password: SecretString) -> Self {
        Self {
            name: DEFAULT_NAME.into(),
            host: host.into(),
            port: DEFAULT_PORT,
            username: DEFAULT_USERNAME.into(),
            password,
            scan_interval: DEFAULT_SCAN_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            bounds: TemperatureBounds::default(),
        }
    }

    /// Gateway root URL, `http://{host}:{port}`.
    pub fn base_url(&self) -> Result<Url, CoreError> {
        adam_api::SmileClient::base_url_for(&self.host, self.port).map_err(|e| {
            CoreError::Config {
                message: format!("invalid gateway address {}:{}: {e}", self.host, self.port),
            }
        })
    }
}
