// Typed views over the gateway's XML documents.
//
// The Smile API answers with loosely structured XML. `Appliances` and
// `DomainObjects` keep the parsed tree and offer lookups; `DeviceData`
// and `DeviceDescriptor` are the flattened values handed to callers.

use serde::Serialize;
use xmltree::Element;

use crate::error::Error;
use crate::xml;

/// Rule template tag used by zone schedules.
pub const SCHEDULE_TEMPLATE_TAG: &str = "zone_preset_based_schedule";

/// Appliance types that act as the controller for the others, in order of
/// preference.
const CONTROLLER_TYPES: [&str; 2] = ["gateway", "heater_central"];

const THERMOSTAT_TYPES: [&str; 3] = [
    "thermostat",
    "zone_thermostat",
    "thermostatic_radiator_valve",
];

// ── Appliances ──────────────────────────────────────────────────────

/// Parsed `GET /core/appliances` document.
#[derive(Debug, Clone, PartialEq)]
pub struct Appliances {
    root: Element,
}

impl Appliances {
    pub fn parse(body: &str) -> Result<Self, Error> {
        Ok(Self {
            root: xml::parse(body)?,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        xml::elements(&self.root, "appliance")
    }

    pub fn find(&self, id: &str) -> Option<&Element> {
        self.iter().find(|a| xml::attr(a, "id") == Some(id))
    }

    /// Id of the appliance that controls the installation (Adam gateway or,
    /// on an Anna, the central heater).
    pub fn controller_id(&self) -> Option<&str> {
        CONTROLLER_TYPES.iter().find_map(|wanted| {
            self.iter()
                .find(|a| xml::text(a, "type").as_deref() == Some(*wanted))
                .and_then(|a| xml::attr(a, "id"))
        })
    }

    /// Flatten every appliance into a [`DeviceDescriptor`].
    pub fn descriptors(&self) -> Vec<DeviceDescriptor> {
        let controller_id = self.controller_id().map(str::to_owned);
        self.iter()
            .filter_map(|appliance| {
                let id = xml::attr(appliance, "id")?;
                Some(DeviceDescriptor {
                    id: id.to_owned(),
                    name: xml::text(appliance, "name"),
                    device_type: xml::text(appliance, "type"),
                    location: location_ref(appliance),
                    controller_id: controller_id.clone(),
                })
            })
            .collect()
    }
}

// ── DomainObjects ───────────────────────────────────────────────────

/// Parsed `GET /core/domain_objects` document: the full object graph of
/// appliances, locations, rules and templates.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainObjects {
    root: Element,
}

impl Default for DomainObjects {
    fn default() -> Self {
        Self::empty()
    }
}

impl DomainObjects {
    pub fn parse(body: &str) -> Result<Self, Error> {
        Ok(Self {
            root: xml::parse(body)?,
        })
    }

    /// A document with no objects, used before the first successful fetch.
    pub fn empty() -> Self {
        Self {
            root: Element::new("domain_objects"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.iter().all(|n| n.as_element().is_none())
    }

    pub fn locations(&self) -> impl Iterator<Item = &Element> {
        xml::elements(&self.root, "location")
    }

    pub fn location(&self, id: &str) -> Option<&Element> {
        self.locations().find(|l| xml::attr(l, "id") == Some(id))
    }

    pub fn location_name(&self, id: &str) -> Option<String> {
        xml::text(self.location(id)?, "name")
    }

    /// Location kind as reported by the gateway (`room`, `building`, ...).
    pub fn location_type(&self, id: &str) -> Option<String> {
        xml::text(self.location(id)?, "type")
    }

    /// Rules backed by the zone schedule template.
    pub fn schedules(&self) -> impl Iterator<Item = &Element> {
        xml::elements(&self.root, "rule").filter(|rule| {
            rule.get_child("template")
                .and_then(|t| xml::attr(t, "tag"))
                .is_some_and(|tag| tag == SCHEDULE_TEMPLATE_TAG)
        })
    }

    /// The schedule named `name` among those that apply to `location_id`.
    ///
    /// Zones may each carry a rule with the same name, so the lookup is
    /// always scoped to one location.
    pub fn schedule_for_location(&self, location_id: &str, name: &str) -> Option<&Element> {
        self.schedules_for_location(location_id)
            .into_iter()
            .find(|rule| xml::text(rule, "name").as_deref() == Some(name))
    }

    /// Schedules that apply to `location_id`. Rules without any location
    /// context apply installation-wide.
    pub fn schedules_for_location(&self, location_id: &str) -> Vec<&Element> {
        self.schedules()
            .filter(|rule| {
                let Some(contexts) = rule.get_child("contexts") else {
                    return true;
                };
                let locations = xml::descendants(contexts, "location");
                locations.is_empty()
                    || locations
                        .iter()
                        .any(|l| xml::attr(l, "id") == Some(location_id))
            })
            .collect()
    }

    /// Id of the thermostat functionality attached to a location.
    pub fn thermostat_id(&self, location_id: &str) -> Option<&str> {
        let location = self.location(location_id)?;
        location
            .get_child("actuator_functionalities")?
            .get_child("thermostat_functionality")
            .and_then(|t| xml::attr(t, "id"))
    }
}

// ── Flattened values ────────────────────────────────────────────────

/// One appliance known to the gateway, as returned by `get_devices`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceDescriptor {
    pub id: String,
    pub name: Option<String>,
    pub device_type: Option<String>,
    /// Location (zone) the appliance belongs to.
    pub location: Option<String>,
    /// Appliance whose readings (outdoor temperature, boiler state) are
    /// folded into this device's data.
    pub controller_id: Option<String>,
}

impl DeviceDescriptor {
    pub fn is_thermostat(&self) -> bool {
        self.device_type
            .as_deref()
            .is_some_and(|t| THERMOSTAT_TYPES.contains(&t))
    }
}

/// Current reading of a single device.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeviceData {
    pub name: Option<String>,
    pub device_type: Option<String>,
    pub location: Option<String>,
    pub current_temperature: Option<f64>,
    pub setpoint: Option<f64>,
    pub battery: Option<f64>,
    pub valve_position: Option<f64>,
    pub active_preset: Option<String>,
    pub available_schedules: Vec<String>,
    pub selected_schedule: Option<String>,
    pub outdoor_temperature: Option<f64>,
    pub boiler_temperature: Option<f64>,
    pub water_pressure: Option<f64>,
    pub central_heating_active: Option<bool>,
}

pub(crate) fn location_ref(appliance: &Element) -> Option<String> {
    appliance
        .get_child("location")
        .and_then(|l| xml::attr(l, "id"))
        .map(str::to_owned)
}
