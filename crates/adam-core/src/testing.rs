// In-memory gateway used by unit tests across the crate.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use adam_api::{
    Appliances, DeviceData, DeviceDescriptor, DomainObjects, Error, SmileApi,
};
use async_trait::async_trait;

pub(crate) const DOMAIN_XML: &str = r#"<domain_objects>
    <location id="living">
        <name>Living</name><type>room</type><preset>home</preset>
        <actuator_functionalities>
            <thermostat_functionality id="tf-living"/>
        </actuator_functionalities>
    </location>
</domain_objects>"#;

#[derive(Default)]
pub(crate) struct FakeSmile {
    pub bulk_fetches: AtomicUsize,
    pub mutations: AtomicUsize,
    pub fail_ping: AtomicBool,
    /// Answer pings with 401 instead of succeeding.
    pub reject_auth: AtomicBool,
    /// Fail `get_appliances`.
    pub fail_bulk: AtomicBool,
    /// Fail `get_domain_objects`.
    pub fail_domain: AtomicBool,
    pub fail_mutations: AtomicBool,
    /// Device id -> reading, or `None` to fail that device's fetch.
    readings: Mutex<HashMap<String, Option<DeviceData>>>,
    /// (id, ctrl_id) pairs passed to `get_device_data`, in call order.
    pub device_calls: Mutex<Vec<(String, String)>>,
    domain_xml: Mutex<Option<String>>,
    devices: Mutex<Vec<DeviceDescriptor>>,
}

impl FakeSmile {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_reading(&self, id: &str, data: DeviceData) {
        self.lock_readings().insert(id.into(), Some(data));
    }

    pub fn fail_device(&self, id: &str) {
        self.lock_readings().insert(id.into(), None);
    }

    pub fn set_domain(&self, xml: &str) {
        *self.domain_xml.lock().unwrap_or_else(std::sync::PoisonError::into_inner) =
            Some(xml.into());
    }

    pub fn set_devices(&self, devices: Vec<DeviceDescriptor>) {
        *self.devices.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = devices;
    }

    pub fn bulk_fetches(&self) -> usize {
        self.bulk_fetches.load(Ordering::SeqCst)
    }

    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    fn lock_readings(&self) -> std::sync::MutexGuard<'_, HashMap<String, Option<DeviceData>>> {
        self.readings
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn mutate(&self) -> Result<(), Error> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(Error::UnexpectedStatus {
                status: 500,
                body: "mutation rejected".into(),
            });
        }
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub(crate) fn reading(temperature: f64) -> DeviceData {
    DeviceData {
        current_temperature: Some(temperature),
        ..DeviceData::default()
    }
}

pub(crate) fn descriptor(id: &str, kind: &str, location: Option<&str>) -> DeviceDescriptor {
    DeviceDescriptor {
        id: id.into(),
        name: Some(format!("{id} name")),
        device_type: Some(kind.into()),
        location: location.map(Into::into),
        controller_id: Some("gw".into()),
    }
}

#[async_trait]
impl SmileApi for FakeSmile {
    async fn ping(&self) -> Result<(), Error> {
        if self.reject_auth.load(Ordering::SeqCst) {
            return Err(Error::Authentication {
                message: "gateway rejected the username or password".into(),
            });
        }
        if self.fail_ping.load(Ordering::SeqCst) {
            return Err(Error::UnexpectedStatus {
                status: 503,
                body: "starting".into(),
            });
        }
        Ok(())
    }

    async fn get_appliances(&self) -> Result<Appliances, Error> {
        self.bulk_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_bulk.load(Ordering::SeqCst) {
            return Err(Error::UnexpectedStatus {
                status: 502,
                body: "gateway offline".into(),
            });
        }
        Appliances::parse("<appliances/>")
    }

    async fn get_domain_objects(&self) -> Result<DomainObjects, Error> {
        if self.fail_domain.load(Ordering::SeqCst) {
            return Err(Error::Xml("truncated domain_objects".into()));
        }
        let xml = self
            .domain_xml
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();
        DomainObjects::parse(xml.as_deref().unwrap_or(DOMAIN_XML))
    }

    async fn get_device_data(
        &self,
        _appliances: &Appliances,
        _domain: &DomainObjects,
        id: &str,
        ctrl_id: &str,
    ) -> Result<DeviceData, Error> {
        self.device_calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((id.into(), ctrl_id.into()));
        match self.lock_readings().get(id) {
            Some(Some(data)) => Ok(data.clone()),
            _ => Err(Error::UnknownDevice { id: id.into() }),
        }
    }

    async fn get_devices(&self) -> Result<Vec<DeviceDescriptor>, Error> {
        Ok(self
            .devices
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone())
    }

    async fn set_schedule_state(
        &self,
        _domain: &DomainObjects,
        _location_id: &str,
        _name: &str,
        _active: bool,
    ) -> Result<(), Error> {
        self.mutate()
    }

    async fn set_preset(
        &self,
        _domain: &DomainObjects,
        _location_id: &str,
        _location_type: &str,
        _preset: &str,
    ) -> Result<(), Error> {
        self.mutate()
    }

    async fn set_temperature(
        &self,
        _domain: &DomainObjects,
        _location_id: &str,
        _location_type: &str,
        _temperature: f64,
    ) -> Result<(), Error> {
        self.mutate()
    }
}
