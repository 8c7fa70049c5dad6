// ── Thermostat feature ──
//
// A climate entity backed by the shared DataStore. Reads come from the
// cache; writes validate locally, then go through the store so the cache
// is refreshed once the gateway accepted the change.

use std::sync::Arc;

use adam_api::{DeviceData, DeviceDescriptor};
use tracing::debug;

use crate::config::TemperatureBounds;
use crate::error::CoreError;
use crate::store::{DataStore, Reading};

/// Presets a Smile location accepts.
pub const PRESETS: [&str; 5] = ["home", "away", "asleep", "vacation", "no_frost"];

/// Location type sent when the domain snapshot does not know the zone.
const FALLBACK_LOCATION_TYPE: &str = "thermostat";

pub struct Thermostat {
    store: Arc<DataStore>,
    device: DeviceDescriptor,
    bounds: TemperatureBounds,
}

impl Thermostat {
    pub fn new(store: Arc<DataStore>, device: DeviceDescriptor, bounds: TemperatureBounds) -> Self {
        Self {
            store,
            device,
            bounds,
        }
    }

    pub fn id(&self) -> &str {
        &self.device.id
    }

    /// Display name, falling back to the appliance id.
    pub fn name(&self) -> &str {
        self.device.name.as_deref().unwrap_or(&self.device.id)
    }

    pub fn bounds(&self) -> TemperatureBounds {
        self.bounds
    }

    pub fn reading(&self) -> Reading {
        self.store.get_data(&self.device.id)
    }

    /// `true` when the latest refresh produced data for this device.
    pub fn is_available(&self) -> bool {
        self.reading().is_available()
    }

    pub fn current_temperature(&self) -> Option<f64> {
        self.latest(|d| d.current_temperature)
    }

    pub fn target_temperature(&self) -> Option<f64> {
        self.latest(|d| d.setpoint)
    }

    pub fn preset(&self) -> Option<String> {
        self.latest(|d| d.active_preset.clone())
    }

    pub fn schedules(&self) -> Vec<String> {
        self.latest(|d| Some(d.available_schedules.clone()))
            .unwrap_or_default()
    }

    pub fn selected_schedule(&self) -> Option<String> {
        self.latest(|d| d.selected_schedule.clone())
    }

    // ── Control ──────────────────────────────────────────────────────

    pub async fn set_temperature(&self, temperature: f64) -> Result<(), CoreError> {
        if !self.bounds.contains(temperature) {
            return Err(CoreError::ValidationFailed {
                message: format!(
                    "temperature {temperature} outside {}..={}",
                    self.bounds.min, self.bounds.max
                ),
            });
        }
        let location = self.location()?;
        let domain = self.store.get_domain_data();
        let location_type = domain
            .location_type(&location)
            .unwrap_or_else(|| FALLBACK_LOCATION_TYPE.into());
        debug!(device = %self.device.id, %location, temperature, "setting target temperature");
        self.store
            .set_temperature(&domain, &location, &location_type, temperature)
            .await
    }

    pub async fn set_preset(&self, preset: &str) -> Result<(), CoreError> {
        if !PRESETS.contains(&preset) {
            return Err(CoreError::ValidationFailed {
                message: format!("unknown preset '{preset}', expected one of {PRESETS:?}"),
            });
        }
        let location = self.location()?;
        let domain = self.store.get_domain_data();
        let location_type = domain
            .location_type(&location)
            .unwrap_or_else(|| FALLBACK_LOCATION_TYPE.into());
        self.store
            .set_preset(&domain, &location, &location_type, preset)
            .await
    }

    /// Turn the named schedule on or off for this device's zone.
    pub async fn set_schedule_state(&self, name: &str, active: bool) -> Result<(), CoreError> {
        let location = self.location()?;
        let domain = self.store.get_domain_data();
        self.store
            .set_schedule_state(&domain, &location, name, active)
            .await
    }

    fn latest<T>(&self, f: impl FnOnce(&DeviceData) -> Option<T>) -> Option<T> {
        self.reading().latest().and_then(|d| f(d.as_ref()))
    }

    /// Zone of this device: from the descriptor, else from the last reading.
    fn location(&self) -> Result<String, CoreError> {
        self.device
            .location
            .clone()
            .or_else(|| self.latest(|d| d.location.clone()))
            .ok_or_else(|| CoreError::NotFound {
                entity_type: "location".into(),
                identifier: self.device.id.clone(),
            })
    }
}
