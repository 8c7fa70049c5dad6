// ── Controller abstraction ──
//
// Lifecycle of one gateway connection: liveness check, device
// registration, and the background task that drives periodic refreshes
// of the DataStore.

use std::sync::Arc;

use adam_api::{DeviceDescriptor, SmileApi, SmileClient, TransportConfig};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::GatewayConfig;
use crate::error::CoreError;
use crate::store::{DataStore, RefreshOutcome};
use crate::thermostat::Thermostat;

/// The main entry point for hosts.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Only exists once the
/// gateway has answered a ping, so every handle given out refers to a
/// reachable gateway.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: GatewayConfig,
    store: Arc<DataStore>,
}

impl Controller {
    /// Connect to the gateway described by `config`.
    ///
    /// Builds the HTTP client and pings the gateway. An unreachable
    /// gateway yields [`CoreError::NotReady`]; rejected credentials
    /// yield [`CoreError::AuthenticationFailed`].
    pub async fn connect(config: GatewayConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig::default().with_timeout(config.timeout);
        let client = SmileClient::new(
            config.base_url()?,
            config.username.clone(),
            config.password.clone(),
            &transport,
        )?;
        Self::connect_with(config, Arc::new(client)).await
    }

    /// Connect through an already-built API handle.
    ///
    /// A zero scan interval is rejected before the gateway is contacted.
    pub async fn connect_with(
        config: GatewayConfig,
        api: Arc<dyn SmileApi>,
    ) -> Result<Self, CoreError> {
        if config.scan_interval.is_zero() {
            return Err(CoreError::Config {
                message: "scan interval must be greater than zero".into(),
            });
        }
        debug!(host = %config.host, port = config.port, "pinging gateway");
        if let Err(e) = api.ping().await {
            if e.is_auth() {
                return Err(e.into());
            }
            warn!(host = %config.host, error = %e, "gateway did not answer ping");
            return Err(CoreError::NotReady {
                reason: e.to_string(),
            });
        }

        let store = Arc::new(DataStore::new(api, config.scan_interval));
        info!(name = %config.name, host = %config.host, "connected to gateway");
        Ok(Self {
            inner: Arc::new(ControllerInner { config, store }),
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }

    /// Shared handle to the cache, for feature modules.
    pub fn store(&self) -> Arc<DataStore> {
        Arc::clone(&self.inner.store)
    }

    // ── Devices ──────────────────────────────────────────────────────

    /// Register every appliance the gateway reports.
    ///
    /// Each device is registered under its controller appliance, or under
    /// itself when the gateway has none. Returns the registered devices.
    pub async fn register_all(&self) -> Result<Vec<DeviceDescriptor>, CoreError> {
        let devices = self.inner.store.list_devices().await?;
        for device in &devices {
            let ctrl_id = device.controller_id.as_deref().unwrap_or(&device.id);
            self.inner.store.register(device.id.as_str(), ctrl_id);
        }
        info!(count = devices.len(), "registered devices");
        Ok(devices)
    }

    /// Thermostat features for the thermostat-like entries of `devices`.
    pub fn thermostats(&self, devices: &[DeviceDescriptor]) -> Vec<Thermostat> {
        devices
            .iter()
            .filter(|d| d.is_thermostat())
            .map(|d| Thermostat::new(self.store(), d.clone(), self.inner.config.bounds))
            .collect()
    }

    // ── Background polling ───────────────────────────────────────────

    /// Spawn the periodic refresh task.
    ///
    /// Ticks immediately, then once per scan interval, calling
    /// `refresh(false)` until `cancel` fires.
    pub fn spawn_polling(&self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(poll_task(self.store(), cancel))
    }
}

async fn poll_task(store: Arc<DataStore>, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(store.scan_interval());
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let RefreshOutcome::Completed { devices, failed } = store.refresh(false).await {
                    debug!(devices, failed, "periodic refresh complete");
                }
            }
        }
    }
    debug!("polling stopped");
}
