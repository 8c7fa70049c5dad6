#![allow(clippy::unwrap_used)]
// Integration tests for `SmileClient` using wiremock.

use secrecy::SecretString;
use url::Url;
use wiremock::matchers::{body_string_contains, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use adam_api::{DomainObjects, Error, SmileApi, SmileClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, SmileClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = SmileClient::with_client(
        reqwest::Client::new(),
        base_url,
        "smile",
        SecretString::from("abcdefgh".to_string()),
    );
    (server, client)
}

const APPLIANCES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<appliances>
    <appliance id="gw"><name>Adam</name><type>gateway</type></appliance>
    <appliance id="lisa">
        <name>Lisa Living</name><type>zone_thermostat</type>
        <location id="living"/>
        <logs>
            <point_log><type>temperature</type><period><measurement>20.50</measurement></period></point_log>
        </logs>
    </appliance>
</appliances>"#;

const DOMAIN: &str = r#"<domain_objects>
    <location id="living">
        <name>Living</name><type>room</type><preset>home</preset>
        <actuator_functionalities>
            <thermostat_functionality id="tf-living"/>
        </actuator_functionalities>
    </location>
    <rule id="r1">
        <name>Winter</name><active>false</active>
        <template id="t1" tag="zone_preset_based_schedule"/>
    </rule>
</domain_objects>"#;

fn domain() -> DomainObjects {
    DomainObjects::parse(DOMAIN).unwrap()
}

// ── Ping ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_ping_accepts_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    client.ping().await.unwrap();
}

#[tokio::test]
async fn test_ping_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.ping().await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_ping_unreachable() {
    let client = SmileClient::with_client(
        reqwest::Client::new(),
        Url::parse("http://127.0.0.1:9").unwrap(),
        "smile",
        SecretString::from("x".to_string()),
    );

    let err = client.ping().await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "got: {err:?}");
}

// ── Bulk fetches ────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_appliances_sends_basic_auth() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/core/appliances"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_string(APPLIANCES))
        .mount(&server)
        .await;

    let appliances = client.get_appliances().await.unwrap();
    assert_eq!(appliances.iter().count(), 2);
    assert_eq!(appliances.controller_id(), Some("gw"));
}

#[tokio::test]
async fn test_get_domain_objects() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/core/domain_objects"))
        .respond_with(ResponseTemplate::new(200).set_body_string(DOMAIN))
        .mount(&server)
        .await;

    let domain = client.get_domain_objects().await.unwrap();
    assert!(domain.location("living").is_some());
}

#[tokio::test]
async fn test_malformed_xml() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/core/domain_objects"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<domain_objects><oops>"))
        .mount(&server)
        .await;

    let err = client.get_domain_objects().await.unwrap_err();
    assert!(matches!(err, Error::Xml(_)), "got: {err:?}");
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/core/appliances"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&server)
        .await;

    let err = client.get_appliances().await.unwrap_err();
    match err {
        Error::UnexpectedStatus { status, ref body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "busy");
        }
        ref other => panic!("expected UnexpectedStatus, got: {other:?}"),
    }
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_get_devices_and_device_data() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/core/appliances"))
        .respond_with(ResponseTemplate::new(200).set_body_string(APPLIANCES))
        .mount(&server)
        .await;

    let devices = client.get_devices().await.unwrap();
    let lisa = devices.iter().find(|d| d.id == "lisa").unwrap();
    assert_eq!(lisa.controller_id.as_deref(), Some("gw"));

    let appliances = client.get_appliances().await.unwrap();
    let data = client
        .get_device_data(&appliances, &domain(), "lisa", "gw")
        .await
        .unwrap();
    assert_eq!(data.current_temperature, Some(20.5));
    assert_eq!(data.active_preset.as_deref(), Some("home"));
    assert_eq!(data.available_schedules, ["Winter"]);
    assert_eq!(data.selected_schedule, None);
}

// ── Mutations ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_set_preset() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/core/locations;id=living"))
        .and(body_string_contains("<preset>away</preset>"))
        .and(body_string_contains("<name>Living</name>"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client
        .set_preset(&domain(), "living", "room", "away")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_set_temperature() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/core/locations;id=living/thermostat;id=tf-living"))
        .and(body_string_contains("<setpoint>21.5</setpoint>"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client
        .set_temperature(&domain(), "living", "room", 21.5)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_set_schedule_state() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/core/rules;id=r1"))
        .and(body_string_contains("<![CDATA[Winter]]>"))
        .and(body_string_contains("<active>true</active>"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client
        .set_schedule_state(&domain(), "living", "Winter", true)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_set_schedule_state_picks_the_zone_rule() {
    let (server, client) = setup().await;
    let domain = DomainObjects::parse(
        r#"<domain_objects>
            <location id="bath"><name>Bath</name></location>
            <location id="living"><name>Living</name></location>
            <rule id="r-bath">
                <name>Winter</name>
                <template id="t1" tag="zone_preset_based_schedule"/>
                <contexts><context><zone><location id="bath"/></zone></context></contexts>
            </rule>
            <rule id="r-living">
                <name>Winter</name>
                <template id="t1" tag="zone_preset_based_schedule"/>
                <contexts><context><zone><location id="living"/></zone></context></contexts>
            </rule>
        </domain_objects>"#,
    )
    .unwrap();

    Mock::given(method("PUT"))
        .and(path("/core/rules;id=r-living"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/core/rules;id=r-bath"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    client
        .set_schedule_state(&domain, "living", "Winter", true)
        .await
        .unwrap();

    assert!(matches!(
        client.set_schedule_state(&domain, "garage", "Winter", true).await,
        Err(Error::UnknownSchedule { .. })
    ));
}

#[tokio::test]
async fn test_mutation_lookups_fail_without_request() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let domain = domain();
    assert!(matches!(
        client.set_preset(&domain, "attic", "room", "home").await,
        Err(Error::UnknownLocation { .. })
    ));
    assert!(matches!(
        client.set_schedule_state(&domain, "living", "Summer", true).await,
        Err(Error::UnknownSchedule { .. })
    ));
    assert!(matches!(
        client.set_temperature(&DomainObjects::empty(), "living", "room", 20.0).await,
        Err(Error::UnknownLocation { .. })
    ));
}
