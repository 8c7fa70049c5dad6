use thiserror::Error;

/// Top-level error type for the `adam-api` crate.
///
/// Covers transport, HTTP status, XML, and lookup failures against the
/// gateway's domain objects. `adam-core` maps these into its own
/// `CoreError` variants.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The gateway rejected the basic-auth credentials (HTTP 401).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The gateway answered with a status we don't handle.
    #[error("Unexpected HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    // ── Data ────────────────────────────────────────────────────────
    /// XML could not be parsed or written.
    #[error("XML error: {0}")]
    Xml(String),

    /// No appliance with this id exists in the fetched appliance list.
    #[error("Unknown device: {id}")]
    UnknownDevice { id: String },

    /// No location with this id exists in the domain objects.
    #[error("Unknown location: {id}")]
    UnknownLocation { id: String },

    /// No schedule rule with this name exists in the domain objects.
    #[error("Unknown schedule: {name}")]
    UnknownSchedule { name: String },

    /// The location has no thermostat functionality to set a setpoint on.
    #[error("Location {location} has no thermostat functionality")]
    MissingThermostat { location: String },
}

impl From<xmltree::ParseError> for Error {
    fn from(err: xmltree::ParseError) -> Self {
        Self::Xml(err.to_string())
    }
}

impl From<xmltree::Error> for Error {
    fn from(err: xmltree::Error) -> Self {
        Self::Xml(err.to_string())
    }
}

impl Error {
    /// Returns `true` if the credentials were rejected.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error worth retrying later.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::UnexpectedStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
