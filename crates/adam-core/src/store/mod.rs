// ── Polled device cache ──
//
// Registry of tracked devices plus the latest reading for each, refreshed
// from the gateway no more often than the configured interval.

mod reading;
mod refresh;
mod throttle;

use std::sync::Arc;
use std::time::Duration;

use adam_api::{DeviceDescriptor, DomainObjects, SmileApi};
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::watch;
use tracing::debug;

use crate::error::CoreError;

pub use reading::Reading;
pub use refresh::RefreshOutcome;
use throttle::Throttle;

/// Cache of gateway readings keyed by device id.
///
/// Shared through `Arc` between the poll task and feature modules. Reads
/// are served from memory and never trigger a fetch; only
/// [`refresh`](Self::refresh) and the setters talk to the gateway.
pub struct DataStore {
    api: Arc<dyn SmileApi>,
    /// Registered device id -> controller id.
    devices: DashMap<String, String>,
    /// Device id -> latest reading. Has an entry for every registered id.
    data: DashMap<String, Reading>,
    /// Last domain snapshot, replaced wholesale on each successful refresh.
    domain: ArcSwap<DomainObjects>,
    throttle: Throttle,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl DataStore {
    pub fn new(api: Arc<dyn SmileApi>, scan_interval: Duration) -> Self {
        let (last_refresh, _) = watch::channel(None);
        Self {
            api,
            devices: DashMap::new(),
            data: DashMap::new(),
            domain: ArcSwap::from_pointee(DomainObjects::empty()),
            throttle: Throttle::new(scan_interval),
            last_refresh,
        }
    }

    /// Minimum time between two unforced refreshes.
    pub fn scan_interval(&self) -> Duration {
        self.throttle.interval()
    }

    // ── Registration ─────────────────────────────────────────────────

    /// Track `id`, fetching its data through controller `ctrl_id`.
    ///
    /// Re-registering an id overwrites its controller and resets its
    /// cached reading to [`Reading::NoData`].
    pub fn register(&self, id: impl Into<String>, ctrl_id: impl Into<String>) {
        let id = id.into();
        let ctrl_id = ctrl_id.into();
        debug!(%id, %ctrl_id, "registering device");
        self.devices.insert(id.clone(), ctrl_id);
        self.data.insert(id, Reading::NoData);
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.devices.contains_key(id)
    }

    /// Registered device ids, in no particular order.
    pub fn registered(&self) -> Vec<String> {
        self.devices.iter().map(|r| r.key().clone()).collect()
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Cached reading for `id`; [`Reading::NoData`] for unknown ids.
    pub fn get_data(&self, id: &str) -> Reading {
        self.data
            .get(id)
            .map(|r| r.value().clone())
            .unwrap_or_default()
    }

    /// Last stored domain snapshot (empty before the first refresh).
    pub fn get_domain_data(&self) -> Arc<DomainObjects> {
        self.domain.load_full()
    }

    /// Wall-clock time of the last successful refresh.
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    /// Notified after every successful refresh.
    pub fn subscribe(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.last_refresh.subscribe()
    }

    /// Live device enumeration; not cached.
    pub async fn list_devices(&self) -> Result<Vec<DeviceDescriptor>, CoreError> {
        Ok(self.api.get_devices().await?)
    }

    // ── Mutations ────────────────────────────────────────────────────
    //
    // Each setter forwards to the gateway and, only if that succeeded,
    // forces a refresh so reads reflect the new state.

    pub async fn set_schedule_state(
        &self,
        domain: &DomainObjects,
        location_id: &str,
        name: &str,
        active: bool,
    ) -> Result<(), CoreError> {
        self.api
            .set_schedule_state(domain, location_id, name, active)
            .await?;
        self.refresh(true).await;
        Ok(())
    }

    pub async fn set_preset(
        &self,
        domain: &DomainObjects,
        location_id: &str,
        location_type: &str,
        preset: &str,
    ) -> Result<(), CoreError> {
        self.api
            .set_preset(domain, location_id, location_type, preset)
            .await?;
        self.refresh(true).await;
        Ok(())
    }

    pub async fn set_temperature(
        &self,
        domain: &DomainObjects,
        location_id: &str,
        location_type: &str,
        temperature: f64,
    ) -> Result<(), CoreError> {
        self.api
            .set_temperature(domain, location_id, location_type, temperature)
            .await?;
        self.refresh(true).await;
        Ok(())
    }
}
