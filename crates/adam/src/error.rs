//! Daemon error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use adam_config::ConfigError;
use adam_core::CoreError;
use miette::Diagnostic;
use thiserror::Error;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum DaemonError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Gateway is not ready: {reason}")]
    #[diagnostic(
        code(adam::not_ready),
        help("Check that the Smile is powered and reachable on the configured host and port.")
    )]
    NotReady { reason: String },

    #[error("Could not connect to gateway at {url}: {reason}")]
    #[diagnostic(code(adam::connection_failed))]
    ConnectionFailed { url: String, reason: String },

    #[error("Gateway request timed out")]
    #[diagnostic(
        code(adam::timeout),
        help("Raise `timeout` in the [gateway] section or check the network.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(adam::auth_failed),
        help("The password is the 8-character Smile ID printed on the gateway.")
    )]
    AuthFailed { message: String },

    #[error("No password configured for gateway '{name}'")]
    #[diagnostic(
        code(adam::no_password),
        help(
            "Set `password` or `password_env` in the [gateway] section,\n\
             or store it in the system keyring as service 'adam', user '{name}/password'."
        )
    )]
    MissingPassword { name: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{entity_type} '{identifier}' not found")]
    #[diagnostic(code(adam::not_found))]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Validation / configuration ───────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(adam::validation))]
    Validation { field: String, reason: String },

    #[error("Failed to load configuration")]
    #[diagnostic(
        code(adam::config),
        help("Expected a TOML file with a [gateway] section; see `host`, `password`.")
    )]
    Config(#[source] ConfigError),

    #[error("Gateway error: {message}")]
    #[diagnostic(code(adam::api))]
    Api { message: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to encode readings: {0}")]
    #[diagnostic(code(adam::json))]
    Json(#[from] serde_json::Error),
}

impl DaemonError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotReady { .. } | Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::MissingPassword { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::Config(_) => exit_code::USAGE,
            Self::Api { .. } | Self::Io(_) | Self::Json(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → DaemonError mapping ──────────────────────────────────

impl From<CoreError> for DaemonError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotReady { reason } => Self::NotReady { reason },
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::AuthenticationFailed { message } => Self::AuthFailed { message },
            CoreError::Timeout => Self::Timeout,
            CoreError::NotFound {
                entity_type,
                identifier,
            } => Self::NotFound {
                entity_type,
                identifier,
            },
            CoreError::ValidationFailed { message } => Self::Validation {
                field: "request".into(),
                reason: message,
            },
            CoreError::Config { message } => Self::Validation {
                field: "gateway".into(),
                reason: message,
            },
            CoreError::Api { message, .. } => Self::Api { message },
        }
    }
}

impl From<ConfigError> for DaemonError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::MissingPassword { name } => Self::MissingPassword { name },
            ConfigError::Io(e) => Self::Io(e),
            other @ ConfigError::Figment(_) => Self::Config(other),
        }
    }
}
