mod common;

use cidgen_activation::{
    ActivationConfig, ActivationEnvelope, ActivationError, ActivationTransport, Activator,
    HttpTransport, HttpTransportConfig, InstallationId, ProductDescriptor, SigningKey,
    DEFAULT_SOAP_ACTION,
};
use common::{cid_response, error_response, soap_reply, KNOWN_CID, KNOWN_IID, UNKNOWN_IID};
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT_PATH: &str = "/BatchActivation/BatchActivation.asmx";

fn mock_config(server: &MockServer) -> HttpTransportConfig {
    HttpTransportConfig {
        endpoint: format!("{}{ENDPOINT_PATH}", server.uri()),
        soap_action: DEFAULT_SOAP_ACTION.to_string(),
        user_agent: "cidgen-test".to_string(),
        timeout: Duration::from_secs(5),
        accept_invalid_certs: false,
    }
}

fn envelope() -> ActivationEnvelope {
    ActivationEnvelope::build(
        &InstallationId::normalize(UNKNOWN_IID).unwrap(),
        &ProductDescriptor::new("55041-00206-271-298329-03-1033-9600.0000-0452015"),
        &SigningKey::default(),
    )
}

#[tokio::test]
async fn posts_soap_with_protocol_headers() {
    let server = MockServer::start().await;
    let envelope = envelope();

    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .and(header("content-type", "text/xml; charset=UTF-8"))
        .and(header("SOAPAction", DEFAULT_SOAP_ACTION))
        .and(header("user-agent", "cidgen-test"))
        .and(body_string_contains(format!("<Digest>{}</Digest>", envelope.digest())))
        .and(body_string_contains(format!(
            "<RequestXml>{}</RequestXml>",
            envelope.payload()
        )))
        .respond_with(ResponseTemplate::new(200).set_body_string("<ok/>"))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new(mock_config(&server)).unwrap();
    let body = transport.send(&envelope).await.unwrap();
    assert_eq!(body, "<ok/>");
}

#[tokio::test]
async fn non_success_status_is_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("soap fault"))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(mock_config(&server)).unwrap();
    let err = transport.send(&envelope()).await.unwrap_err();
    match err {
        ActivationError::Transport(msg) => assert!(msg.contains("500")),
        other => panic!("expected Transport, got {other:?}"),
    }
}

#[tokio::test]
async fn slow_service_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let config = HttpTransportConfig {
        timeout: Duration::from_millis(200),
        ..mock_config(&server)
    };
    let transport = HttpTransport::new(config).unwrap();
    let err = transport.send(&envelope()).await.unwrap_err();
    assert_eq!(
        err,
        ActivationError::Transport("request timed out after 200ms".into())
    );
}

#[tokio::test]
async fn unreachable_host_is_transport_error() {
    let server = MockServer::start().await;
    let config = mock_config(&server);
    drop(server);

    let transport = HttpTransport::new(config).unwrap();
    let err = transport.send(&envelope()).await.unwrap_err();
    assert!(matches!(err, ActivationError::Transport(_)));
}

#[test]
fn relaxed_tls_still_builds() {
    let config = HttpTransportConfig {
        endpoint: "https://localhost:1/".into(),
        soap_action: DEFAULT_SOAP_ACTION.into(),
        user_agent: "cidgen-test".into(),
        timeout: Duration::from_secs(1),
        accept_invalid_certs: true,
    };
    let transport = HttpTransport::new(config).unwrap();
    assert_eq!(transport.endpoint(), "https://localhost:1/");
}

// ── Through the activator ────────────────────────────────────────

fn activator_for(server: &MockServer) -> Activator {
    let config = ActivationConfig {
        endpoint: format!("{}{ENDPOINT_PATH}", server.uri()),
        timeout_secs: 5,
        ..Default::default()
    };
    Activator::from_config(&config).unwrap()
}

#[tokio::test]
async fn end_to_end_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .and(body_string_contains("<BatchActivate"))
        .respond_with(ResponseTemplate::new(200).set_body_string(soap_reply(&cid_response(
            "188464325086933971561982440844900072121364648895",
        ))))
        .mount(&server)
        .await;

    let cid = activator_for(&server)
        .generate_confirmation_id(UNKNOWN_IID, "office2024")
        .await
        .unwrap();
    assert_eq!(cid, "188464 325086 933971 561982 440844 900072 121364 648895");
}

#[tokio::test]
async fn end_to_end_rejection() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(soap_reply(&error_response("0x68"))))
        .mount(&server)
        .await;

    let err = activator_for(&server)
        .generate_confirmation_id(UNKNOWN_IID, "windows11")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid product key");
}

#[tokio::test]
async fn end_to_end_fallback_on_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let cid = activator_for(&server)
        .generate_confirmation_id(KNOWN_IID, "windows11")
        .await
        .unwrap();
    assert_eq!(cid, KNOWN_CID);
}
