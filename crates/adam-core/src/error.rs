// ── Core error types ──
//
// Errors surfaced by adam-core. Consumers never see raw HTTP status codes
// or XML failures; the `From<adam_api::Error>` impl translates
// transport-layer errors into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    /// The gateway did not answer the liveness check. Recoverable: the
    /// host is expected to retry setup later.
    #[error("Gateway not ready: {reason}")]
    NotReady { reason: String },

    #[error("Cannot connect to gateway at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Gateway request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Entity not found: {entity_type} {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Returns `true` if the caller should retry setup later.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::NotReady { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<adam_api::Error> for CoreError {
    fn from(err: adam_api::Error) -> Self {
        match err {
            adam_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            adam_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            adam_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            adam_api::Error::UnexpectedStatus { status, body } => CoreError::Api {
                message: format!("HTTP {status}: {body}"),
                status: Some(status),
            },
            adam_api::Error::Xml(message) => CoreError::Api {
                message: format!("XML error: {message}"),
                status: None,
            },
            adam_api::Error::UnknownDevice { id } => CoreError::NotFound {
                entity_type: "device".into(),
                identifier: id,
            },
            adam_api::Error::UnknownLocation { id } => CoreError::NotFound {
                entity_type: "location".into(),
                identifier: id,
            },
            adam_api::Error::UnknownSchedule { name } => CoreError::NotFound {
                entity_type: "schedule".into(),
                identifier: name,
            },
            adam_api::Error::MissingThermostat { location } => CoreError::NotFound {
                entity_type: "thermostat".into(),
                identifier: location,
            },
        }
    }
}
