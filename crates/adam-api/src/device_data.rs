// Per-device reading extraction.
//
// Pure function over already-fetched documents: no I/O happens here, so a
// refresh cycle fetches the two bulk documents once and then extracts one
// reading per registered device.

use xmltree::Element;

use crate::error::Error;
use crate::models::{Appliances, DeviceData, DomainObjects, location_ref};
use crate::xml;

/// Build the reading for appliance `id`, folding in controller-level values
/// from appliance `ctrl_id`.
pub fn extract(
    appliances: &Appliances,
    domain: &DomainObjects,
    id: &str,
    ctrl_id: &str,
) -> Result<DeviceData, Error> {
    let appliance = appliances
        .find(id)
        .ok_or_else(|| Error::UnknownDevice { id: id.to_owned() })?;

    let mut data = DeviceData {
        name: xml::text(appliance, "name"),
        device_type: xml::text(appliance, "type"),
        location: location_ref(appliance),
        current_temperature: measurement(appliance, "temperature"),
        setpoint: thermostat_setpoint(appliance).or_else(|| measurement(appliance, "thermostat")),
        battery: measurement(appliance, "battery"),
        valve_position: measurement(appliance, "valve_position"),
        ..DeviceData::default()
    };

    if let Some(location_id) = data.location.clone() {
        if let Some(location) = domain.location(&location_id) {
            data.active_preset = xml::text(location, "preset");
        }
        for rule in domain.schedules_for_location(&location_id) {
            let Some(name) = xml::text(rule, "name") else {
                continue;
            };
            if xml::text(rule, "active").as_deref() == Some("true") {
                data.selected_schedule = Some(name.clone());
            }
            data.available_schedules.push(name);
        }
    }

    // The controller may be the device itself (e.g. an Anna reporting
    // its own boiler values); missing controller data is not an error.
    if let Some(controller) = appliances.find(ctrl_id) {
        data.outdoor_temperature = measurement(controller, "outdoor_temperature");
        data.boiler_temperature = measurement(controller, "boiler_temperature");
        data.water_pressure = measurement(controller, "central_heater_water_pressure");
        data.central_heating_active =
            raw_measurement(controller, "central_heating_state").and_then(|s| parse_state(&s));
    }

    Ok(data)
}

/// Latest measurement of the point log with the given `<type>`.
fn measurement(appliance: &Element, log_type: &str) -> Option<f64> {
    raw_measurement(appliance, log_type)?.parse().ok()
}

fn raw_measurement(appliance: &Element, log_type: &str) -> Option<String> {
    let logs = appliance.get_child("logs")?;
    let log = xml::elements(logs, "point_log")
        .find(|log| xml::text(log, "type").as_deref() == Some(log_type))?;
    xml::text(log.get_child("period")?, "measurement")
}

fn thermostat_setpoint(appliance: &Element) -> Option<f64> {
    let functionalities = appliance.get_child("actuator_functionalities")?;
    xml::elements(functionalities, "thermostat_functionality")
        .find(|f| xml::text(f, "type").is_none_or(|t| t == "thermostat"))
        .and_then(|f| xml::text(f, "setpoint"))
        .and_then(|s| s.parse().ok())
}

fn parse_state(raw: &str) -> Option<bool> {
    match raw {
        "on" | "true" => Some(true),
        "off" | "false" => Some(false),
        _ => None,
    }
}
