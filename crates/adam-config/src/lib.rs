//! Configuration for the adam gateway daemon.
//!
//! TOML file + `ADAM_`-prefixed environment variables, credential
//! resolution (env + keyring + plaintext), and translation to
//! `adam_core::GatewayConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use adam_core::config::{
    DEFAULT_MAX_TEMP, DEFAULT_MIN_TEMP, DEFAULT_NAME, DEFAULT_PORT, DEFAULT_SCAN_INTERVAL,
    DEFAULT_TIMEOUT, DEFAULT_USERNAME,
};
use adam_core::{GatewayConfig, TemperatureBounds};
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Keyring service name; entries are `{gateway name}/password`.
const KEYRING_SERVICE: &str = "adam";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for gateway '{name}'")]
    MissingPassword { name: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewaySection,
}

/// The `[gateway]` table.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GatewaySection {
    /// Display name; also scopes the keyring entry.
    pub name: String,
    pub username: String,

    /// Smile ID (plaintext; prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    pub host: String,
    pub port: u16,

    /// Seconds between unforced refreshes.
    pub scan_interval: u64,

    /// Per-request timeout in seconds.
    pub timeout: u64,

    pub min_temp: f64,
    pub max_temp: f64,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.into(),
            username: DEFAULT_USERNAME.into(),
            password: None,
            password_env: None,
            host: String::new(),
            port: DEFAULT_PORT,
            scan_interval: DEFAULT_SCAN_INTERVAL.as_secs(),
            timeout: DEFAULT_TIMEOUT.as_secs(),
            min_temp: DEFAULT_MIN_TEMP,
            max_temp: DEFAULT_MAX_TEMP,
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(invalid("host", "must not be empty"));
        }
        if self.port == 0 {
            return Err(invalid("port", "must not be 0"));
        }
        if self.scan_interval == 0 {
            return Err(invalid("scan_interval", "must be at least 1 second"));
        }
        if self.timeout == 0 {
            return Err(invalid("timeout", "must be at least 1 second"));
        }
        if !(self.min_temp.is_finite() && self.max_temp.is_finite())
            || self.min_temp >= self.max_temp
        {
            return Err(invalid(
                "min_temp",
                &format!(
                    "must be below max_temp (got {} >= {})",
                    self.min_temp, self.max_temp
                ),
            ));
        }
        Ok(())
    }

    /// Validate and build the runtime config with an already-resolved
    /// password.
    pub fn into_gateway_config(self, password: SecretString) -> Result<GatewayConfig, ConfigError> {
        self.validate()?;
        Ok(GatewayConfig {
            name: self.name,
            host: self.host.trim().to_owned(),
            port: self.port,
            username: self.username,
            password,
            scan_interval: Duration::from_secs(self.scan_interval),
            timeout: Duration::from_secs(self.timeout),
            bounds: TemperatureBounds {
                min: self.min_temp,
                max: self.max_temp,
            },
        })
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

impl Config {
    /// Resolve the password and build the runtime config.
    pub fn into_gateway_config(self) -> Result<GatewayConfig, ConfigError> {
        self.gateway.validate()?;
        let password = resolve_password(&self.gateway)?;
        self.gateway.into_gateway_config(password)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("nl", "plugwise", "adam").map_or_else(
        || PathBuf::from(".").join("adam.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load from the default path. A missing file is not an error; the
/// environment may supply everything.
pub fn load_config() -> Result<Config, ConfigError> {
    extract(&config_path())
}

/// Load from an explicit path, which must exist.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    std::fs::metadata(path)?;
    extract(path)
}

fn extract(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("ADAM_").split("__"));

    Ok(figment.extract()?)
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the gateway password: `password_env` variable, then the
/// system keyring, then the plaintext `password` field.
pub fn resolve_password(section: &GatewaySection) -> Result<SecretString, ConfigError> {
    resolve_password_with(
        section,
        |name| std::env::var(name).ok(),
        |user| {
            keyring::Entry::new(KEYRING_SERVICE, user)
                .and_then(|entry| entry.get_password())
                .ok()
        },
    )
}

/// Credential chain with injectable env and keyring lookups.
pub fn resolve_password_with(
    section: &GatewaySection,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    // 1. Named env var
    if let Some(pw) = section.password_env.as_deref().and_then(&env) {
        debug!("password taken from environment");
        return Ok(SecretString::from(pw));
    }

    // 2. Keyring
    if let Some(pw) = keyring(&format!("{}/password", section.name)) {
        debug!("password taken from keyring");
        return Ok(SecretString::from(pw));
    }

    // 3. Plaintext in config
    if let Some(ref pw) = section.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::MissingPassword {
        name: section.name.clone(),
    })
}
