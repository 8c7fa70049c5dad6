// Smile gateway HTTP client
//
// Wraps `reqwest::Client` with basic-auth, URL construction against the
// gateway root, and status mapping. Documents are fetched as XML text and
// parsed into the typed views from `models`.

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, trace};
use url::Url;
use xmltree::Element;

use crate::api::SmileApi;
use crate::error::Error;
use crate::models::{Appliances, DeviceDescriptor, DomainObjects};
use crate::transport::TransportConfig;
use crate::xml;

const PING_ENDPOINT: &str = "/ping";
const APPLIANCES_ENDPOINT: &str = "/core/appliances";
const DOMAIN_OBJECTS_ENDPOINT: &str = "/core/domain_objects";
const LOCATIONS_ENDPOINT: &str = "/core/locations";
const RULES_ENDPOINT: &str = "/core/rules";

/// Longest slice of an error body kept in [`Error::UnexpectedStatus`].
const BODY_PREVIEW_CHARS: usize = 200;

/// HTTP client for a Plugwise Smile gateway (Anna or Adam).
pub struct SmileClient {
    http: reqwest::Client,
    base_url: Url,
    username: String,
    password: SecretString,
}

impl SmileClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the gateway root, e.g. `http://192.168.1.10:80`.
    pub fn new(
        base_url: Url,
        username: impl Into<String>,
        password: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        Ok(Self::with_client(
            transport.build_client()?,
            base_url,
            username,
            password,
        ))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        username: impl Into<String>,
        password: SecretString,
    ) -> Self {
        Self {
            http,
            base_url,
            username: username.into(),
            password,
        }
    }

    /// Build the gateway root URL from a host name and port.
    pub fn base_url_for(host: &str, port: u16) -> Result<Url, Error> {
        Ok(Url::parse(&format!("http://{host}:{port}"))?)
    }

    /// The gateway base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn get_text(&self, path: &str) -> Result<String, Error> {
        let url = self.url(path)?;
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .send()
            .await?;

        let resp = check_status(resp).await?;
        Ok(resp.text().await?)
    }

    async fn put_xml(&self, path: &str, body: &Element) -> Result<(), Error> {
        let url = self.url(path)?;
        let body = xml::to_string(body)?;
        debug!("PUT {}", url);
        trace!(%body, "request body");

        let resp = self
            .http
            .put(url)
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .header(reqwest::header::CONTENT_TYPE, "text/xml")
            .body(body)
            .send()
            .await?;

        check_status(resp).await?;
        Ok(())
    }
}

/// Map 401 to `Authentication` and any other non-2xx to `UnexpectedStatus`.
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = resp.status();

    if status == StatusCode::UNAUTHORIZED {
        return Err(Error::Authentication {
            message: "gateway rejected the username or password".into(),
        });
    }

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::UnexpectedStatus {
            status: status.as_u16(),
            body: body.chars().take(BODY_PREVIEW_CHARS).collect(),
        });
    }

    Ok(resp)
}

#[async_trait]
impl SmileApi for SmileClient {
    /// `GET /ping`
    ///
    /// The Smile firmware has no ping handler: a live gateway answers 404.
    async fn ping(&self) -> Result<(), Error> {
        let url = self.url(PING_ENDPOINT)?;
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .send()
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        check_status(resp).await?;
        Ok(())
    }

    /// `GET /core/appliances`
    async fn get_appliances(&self) -> Result<Appliances, Error> {
        let body = self.get_text(APPLIANCES_ENDPOINT).await?;
        Appliances::parse(&body)
    }

    /// `GET /core/domain_objects`
    async fn get_domain_objects(&self) -> Result<DomainObjects, Error> {
        let body = self.get_text(DOMAIN_OBJECTS_ENDPOINT).await?;
        DomainObjects::parse(&body)
    }

    async fn get_devices(&self) -> Result<Vec<DeviceDescriptor>, Error> {
        let appliances = self.get_appliances().await?;
        let devices = appliances.descriptors();
        debug!(count = devices.len(), "enumerated gateway devices");
        Ok(devices)
    }

    /// `PUT /core/rules;id={rule}`
    async fn set_schedule_state(
        &self,
        domain: &DomainObjects,
        location_id: &str,
        name: &str,
        active: bool,
    ) -> Result<(), Error> {
        let rule = domain
            .schedule_for_location(location_id, name)
            .ok_or_else(|| Error::UnknownSchedule { name: name.into() })?;
        let rule_id = xml::attr(rule, "id").ok_or_else(|| Error::UnknownSchedule {
            name: name.into(),
        })?;
        let template_id = rule
            .get_child("template")
            .and_then(|t| xml::attr(t, "id"))
            .unwrap_or_default();
        debug!(location_id, name, active, rule_id, "setting schedule state");

        let mut template = Element::new("template");
        template.attributes.insert("id".into(), template_id.into());

        let mut rule_el = xml::element_with_id("rule", rule_id);
        rule_el.children.push(xml::cdata_node("name", name));
        rule_el.children.push(xmltree::XMLNode::Element(template));
        rule_el
            .children
            .push(xml::text_node("active", active.to_string()));

        let mut body = Element::new("rules");
        body.children.push(xmltree::XMLNode::Element(rule_el));

        self.put_xml(&format!("{RULES_ENDPOINT};id={rule_id}"), &body)
            .await
    }

    /// `PUT /core/locations;id={location}`
    async fn set_preset(
        &self,
        domain: &DomainObjects,
        location_id: &str,
        location_type: &str,
        preset: &str,
    ) -> Result<(), Error> {
        let location = domain
            .location(location_id)
            .ok_or_else(|| Error::UnknownLocation {
                id: location_id.into(),
            })?;
        let name = xml::text(location, "name").unwrap_or_default();
        debug!(location_id, preset, "setting preset");

        let mut location_el = xml::element_with_id("location", location_id);
        location_el.children.push(xml::text_node("name", name));
        location_el
            .children
            .push(xml::text_node("type", location_type));
        location_el.children.push(xml::text_node("preset", preset));

        let mut body = Element::new("locations");
        body.children.push(xmltree::XMLNode::Element(location_el));

        self.put_xml(&format!("{LOCATIONS_ENDPOINT};id={location_id}"), &body)
            .await
    }

    /// `PUT /core/locations;id={location}/thermostat;id={thermostat}`
    async fn set_temperature(
        &self,
        domain: &DomainObjects,
        location_id: &str,
        location_type: &str,
        temperature: f64,
    ) -> Result<(), Error> {
        if domain.location(location_id).is_none() {
            return Err(Error::UnknownLocation {
                id: location_id.into(),
            });
        }
        let thermostat_id =
            domain
                .thermostat_id(location_id)
                .ok_or_else(|| Error::MissingThermostat {
                    location: location_id.into(),
                })?;
        debug!(location_id, location_type, temperature, "setting temperature");

        let mut body = Element::new("thermostat_functionality");
        body.children
            .push(xml::text_node("setpoint", temperature.to_string()));

        self.put_xml(
            &format!("{LOCATIONS_ENDPOINT};id={location_id}/thermostat;id={thermostat_id}"),
            &body,
        )
        .await
    }
}
