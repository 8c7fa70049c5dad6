use async_trait::async_trait;

use crate::device_data;
use crate::error::Error;
use crate::models::{Appliances, DeviceData, DeviceDescriptor, DomainObjects};

/// Operations the device cache needs from a Smile gateway.
///
/// [`SmileClient`](crate::SmileClient) implements this over HTTP; tests
/// substitute in-memory fakes. Implementations must be shareable across
/// tasks since a single handle serves polling and mutations alike.
#[async_trait]
pub trait SmileApi: Send + Sync {
    /// Liveness check against the gateway.
    async fn ping(&self) -> Result<(), Error>;

    /// Bulk appliance list with their latest logs.
    async fn get_appliances(&self) -> Result<Appliances, Error>;

    /// Bulk domain object graph (locations, rules, templates).
    async fn get_domain_objects(&self) -> Result<DomainObjects, Error>;

    /// Reading for one device, computed from the bulk documents.
    async fn get_device_data(
        &self,
        appliances: &Appliances,
        domain: &DomainObjects,
        id: &str,
        ctrl_id: &str,
    ) -> Result<DeviceData, Error> {
        device_data::extract(appliances, domain, id, ctrl_id)
    }

    /// Every appliance the gateway knows about.
    async fn get_devices(&self) -> Result<Vec<DeviceDescriptor>, Error>;

    /// Enable or disable the schedule named `name`.
    async fn set_schedule_state(
        &self,
        domain: &DomainObjects,
        location_id: &str,
        name: &str,
        active: bool,
    ) -> Result<(), Error>;

    /// Switch a location to a preset (`home`, `away`, `asleep`, ...).
    async fn set_preset(
        &self,
        domain: &DomainObjects,
        location_id: &str,
        location_type: &str,
        preset: &str,
    ) -> Result<(), Error>;

    /// Change a location's target temperature.
    async fn set_temperature(
        &self,
        domain: &DomainObjects,
        location_id: &str,
        location_type: &str,
        temperature: f64,
    ) -> Result<(), Error>;
}
