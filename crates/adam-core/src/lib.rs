// adam-core: Polled device cache between adam-api and hosts (daemon, integrations).

pub mod config;
pub mod controller;
pub mod error;
pub mod store;
pub mod thermostat;

#[cfg(test)]
mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{GatewayConfig, TemperatureBounds};
pub use controller::Controller;
pub use error::CoreError;
pub use store::{DataStore, Reading, RefreshOutcome};
pub use thermostat::Thermostat;

pub use adam_api::{DeviceData, DeviceDescriptor, DomainObjects};
