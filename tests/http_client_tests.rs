//! Integration tests for the HTTP client against a mock MWS endpoint.
//!
//! These tests verify request signing on the wire, credential gating,
//! error envelopes, retry behavior, cancellation and file downloads.

use mws_api::auth::{canonical_query_string, compute_signature, string_to_sign, ParameterBag};
use mws_api::clients::{HttpMethod, MwsRequest};
use mws_api::{
    ApiSection, ConfigError, Credentials, HttpClient, MwsConfig, MwsError, Region, Transport,
};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_string, header, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SECRET: &str = "test-secret-key";

/// Creates a configuration pointing at the mock server.
fn create_config(server: &MockServer, credentials: Credentials) -> MwsConfig {
    MwsConfig::builder()
        .credentials(credentials)
        .region(Region::new(
            "NA",
            "US",
            format!("{}/", server.uri()),
            "ATVPDKIKX0DER",
        ))
        .app_name("inventory-sync")
        .build()
        .unwrap()
}

fn test_credentials() -> Credentials {
    Credentials::new("test-access-key", SECRET, "test-merchant")
}

fn report_count_request(config: &MwsConfig) -> MwsRequest {
    MwsRequest::builder(
        HttpMethod::Post,
        &config.endpoint(ApiSection::Reports),
        "GetReportCount",
    )
    .build()
}

const REPORT_COUNT: &str = "<GetReportCountResponse><GetReportCountResult>\
    <Count>3</Count></GetReportCountResult></GetReportCountResponse>";

// ============================================================================
// Signing
// ============================================================================

#[tokio::test]
async fn test_signed_request_reaches_service() {
    let server = MockServer::start().await;
    let config = create_config(&server, test_credentials());
    let client = HttpClient::new(&config).unwrap();

    Mock::given(method("POST"))
        .and(path("/Reports/2009-01-01"))
        .and(query_param("Action", "GetReportCount"))
        .and(query_param("Version", "2009-01-01"))
        .and(query_param("SellerId", "test-merchant"))
        .and(query_param("AWSAccessKeyId", "test-access-key"))
        .and(query_param("MarketplaceId.Id.1", "ATVPDKIKX0DER"))
        .and(query_param("SignatureMethod", "HmacSHA256"))
        .and(query_param("SignatureVersion", "2"))
        .and(header_regex(
            "User-Agent",
            r"^inventory-sync/\S+ \(Language=Rust; Platform=\w+\)$",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string(REPORT_COUNT))
        .expect(1)
        .mount(&server)
        .await;

    let body = client
        .call(report_count_request(&config), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(body.as_ref(), REPORT_COUNT.as_bytes());
    assert!(client.user_agent().starts_with("inventory-sync/"));
}

#[tokio::test]
async fn test_signature_matches_received_query() {
    let server = MockServer::start().await;
    let config = create_config(&server, test_credentials());
    let client = HttpClient::new(&config).unwrap();

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(REPORT_COUNT))
        .mount(&server)
        .await;

    let request = MwsRequest::builder(
        HttpMethod::Post,
        &config.endpoint(ApiSection::Reports),
        "GetReportList",
    )
    .indexed_params("ReportTypeList.Type", ["_GET_FLAT_FILE_ORDERS_DATA_"])
    .param("Note", "spaces and ~tildes*")
    .build();
    client
        .call(request, &CancellationToken::new())
        .await
        .unwrap();

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);

    let mut signature = None;
    let mut unsigned = ParameterBag::new();
    for (name, value) in received[0].url.query_pairs() {
        if name == "Signature" {
            signature = Some(value.into_owned());
        } else {
            unsigned.add(name.into_owned(), value.into_owned());
        }
    }
    assert_eq!(unsigned.first("Note"), Some("spaces and ~tildes*"));
    assert!(unsigned.contains("Timestamp"));

    let endpoint = format!("{}/Reports/2009-01-01", server.uri());
    let to_sign = string_to_sign("POST", &endpoint, &canonical_query_string(&unsigned)).unwrap();
    assert_eq!(signature, Some(compute_signature(&to_sign, SECRET)));
}

// ============================================================================
// Credential gating
// ============================================================================

#[tokio::test]
async fn test_incomplete_credentials_send_nothing() {
    let cases = [
        (Credentials::new("", SECRET, "merchant"), "access_key_id"),
        (Credentials::new("key", "", "merchant"), "secret_key"),
        (Credentials::new("key", SECRET, ""), "merchant_id"),
    ];

    for (credentials, expected) in cases {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let config = create_config(&server, credentials);
        let client = HttpClient::new(&config).unwrap();
        let result = client
            .call(report_count_request(&config), &CancellationToken::new())
            .await;

        match result {
            Err(MwsError::Config(ConfigError::IncompleteCredentials { field })) => {
                assert_eq!(field, expected);
            }
            other => panic!("Expected IncompleteCredentials, got: {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_missing_marketplace_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = MwsConfig::builder()
        .credentials(test_credentials())
        .region(Region::new("NA", "US", format!("{}/", server.uri()), ""))
        .build()
        .unwrap();
    let client = HttpClient::new(&config).unwrap();
    let result = client
        .call(report_count_request(&config), &CancellationToken::new())
        .await;

    assert!(matches!(
        result,
        Err(MwsError::Config(ConfigError::IncompleteCredentials {
            field: "marketplace_id"
        }))
    ));
}

// ============================================================================
// Error responses
// ============================================================================

#[tokio::test]
async fn test_error_envelope_is_surfaced() {
    let server = MockServer::start().await;
    let config = create_config(&server, test_credentials());
    let client = HttpClient::new(&config).unwrap();

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string(
            "<ErrorResponse xmlns=\"http://mws.amazonaws.com/doc/2009-01-01/\">\
             <Error><Type>Sender</Type><Code>InvalidParameterValue</Code>\
             <Message>Invalid ReportType</Message></Error>\
             <RequestID>req-400</RequestID></ErrorResponse>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let error = client
        .call(report_count_request(&config), &CancellationToken::new())
        .await
        .unwrap_err();

    let api_error = error.api_error().expect("expected an API error");
    assert_eq!(api_error.status, 400);
    let details = api_error.details().unwrap();
    assert_eq!(details.errors[0].code, "InvalidParameterValue");
    assert_eq!(details.errors[0].error_type, "Sender");
    assert!(error.to_string().contains("Invalid ReportType"));
}

#[tokio::test]
async fn test_server_error_without_retries_is_api_error() {
    let server = MockServer::start().await;
    let config = create_config(&server, test_credentials());
    let client = HttpClient::new(&config).unwrap();

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let result = client
        .call(report_count_request(&config), &CancellationToken::new())
        .await;

    match result {
        Err(MwsError::Api(error)) => {
            assert_eq!(error.status, 503);
            assert_eq!(error.body.as_ref(), b"unavailable");
        }
        other => panic!("Expected Api error, got: {other:?}"),
    }
}

// ============================================================================
// Retries
// ============================================================================

#[tokio::test]
async fn test_retry_after_server_error() {
    let server = MockServer::start().await;
    let config = create_config(&server, test_credentials());
    let client = HttpClient::new(&config).unwrap();

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(REPORT_COUNT))
        .expect(1)
        .mount(&server)
        .await;

    let mut request = report_count_request(&config);
    request.tries = 2;
    let body = client
        .call(request, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(body.as_ref(), REPORT_COUNT.as_bytes());
}

#[tokio::test]
async fn test_throttling_honours_retry_after() {
    let server = MockServer::start().await;
    let config = create_config(&server, test_credentials());
    let client = HttpClient::new(&config).unwrap();

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(REPORT_COUNT))
        .expect(1)
        .mount(&server)
        .await;

    let mut request = report_count_request(&config);
    request.tries = 3;
    let started = std::time::Instant::now();
    client
        .call(request, &CancellationToken::new())
        .await
        .unwrap();
    assert!(started.elapsed() < std::time::Duration::from_secs(1));
}

#[tokio::test]
async fn test_retries_exhausted() {
    let server = MockServer::start().await;
    let config = create_config(&server, test_credentials());
    let client = HttpClient::new(&config).unwrap();

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(2)
        .mount(&server)
        .await;

    let mut request = report_count_request(&config);
    request.tries = 2;
    let result = client.call(request, &CancellationToken::new()).await;

    match result {
        Err(MwsError::MaxRetries(error)) => {
            assert_eq!(error.tries, 2);
            assert_eq!(error.last.status, 500);
        }
        other => panic!("Expected MaxRetries, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let server = MockServer::start().await;
    let config = create_config(&server, test_credentials());
    let client = HttpClient::new(&config).unwrap();

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let mut request = report_count_request(&config);
    request.tries = 5;
    let result = client.call(request, &CancellationToken::new()).await;
    assert!(matches!(result, Err(MwsError::Api(ref e)) if e.status == 403));
}

#[tokio::test]
async fn test_huge_retry_after_is_capped() {
    let server = MockServer::start().await;
    let config = create_config(&server, test_credentials());
    let client = HttpClient::new(&config).unwrap();

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1e300"))
        .expect(1)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let canceller = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            cancel.cancel();
        })
    };

    let mut request = report_count_request(&config);
    request.tries = 2;
    let result = client.call(request, &cancel).await;
    canceller.await.unwrap();

    // The capped wait is still in progress when the token fires
    assert!(matches!(result, Err(MwsError::Cancelled)));
}

#[tokio::test]
async fn test_truncated_error_body_is_transport_error() {
    use std::io::{Read, Write};

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut received = Vec::new();
        let mut buf = [0_u8; 1024];
        while !received.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            received.extend_from_slice(&buf[..n]);
        }
        // Promise more bytes than are sent, then hang up
        stream
            .write_all(b"HTTP/1.1 503 Service Unavailable\r\nContent-Length: 500\r\n\r\n<ErrorRe")
            .unwrap();
        stream.flush().unwrap();
    });

    let config = MwsConfig::builder()
        .credentials(test_credentials())
        .region(Region::new("NA", "US", format!("http://{addr}/"), "ATVPDKIKX0DER"))
        .build()
        .unwrap();
    let client = HttpClient::new(&config).unwrap();

    let result = client
        .call(report_count_request(&config), &CancellationToken::new())
        .await;
    server.join().unwrap();

    assert!(
        matches!(result, Err(MwsError::Transport(_))),
        "Expected Transport error, got: {result:?}"
    );
}

// ============================================================================
// Cancellation, bodies and downloads
// ============================================================================

#[tokio::test]
async fn test_cancelled_token_sends_nothing() {
    let server = MockServer::start().await;
    let config = create_config(&server, test_credentials());
    let client = HttpClient::new(&config).unwrap();

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = client.call(report_count_request(&config), &cancel).await;
    assert!(matches!(result, Err(MwsError::Cancelled)));
}

#[tokio::test]
async fn test_request_body_is_sent_with_content_type() {
    let server = MockServer::start().await;
    let config = create_config(&server, test_credentials());
    let client = HttpClient::new(&config).unwrap();

    Mock::given(method("POST"))
        .and(header("Content-Type", "text/xml"))
        .and(body_string("<AmazonEnvelope/>"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<Ok/>"))
        .expect(1)
        .mount(&server)
        .await;

    let request = MwsRequest::builder(
        HttpMethod::Post,
        &config.endpoint(ApiSection::Feeds),
        "SubmitFeed",
    )
    .body(mws_api::clients::RequestBody::xml("<AmazonEnvelope/>"))
    .build();
    client
        .call(request, &CancellationToken::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_download_streams_body_to_file() {
    let server = MockServer::start().await;
    let config = create_config(&server, test_credentials());
    let client = HttpClient::new(&config).unwrap();

    let payload = "sku\tquantity\n".to_string() + &"SKU-1\t4\n".repeat(2_000);
    Mock::given(method("POST"))
        .and(query_param("Action", "GetReport"))
        .respond_with(ResponseTemplate::new(200).set_body_string(payload.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("report.tsv");
    let request = MwsRequest::builder(
        HttpMethod::Post,
        &config.endpoint(ApiSection::Reports),
        "GetReport",
    )
    .param("ReportId", "42")
    .build();

    let written = client
        .call_to_file(request, &CancellationToken::new(), &file)
        .await
        .unwrap();

    assert_eq!(written, payload.len() as u64);
    assert_eq!(std::fs::read_to_string(&file).unwrap(), payload);
}

#[tokio::test]
async fn test_failed_download_is_api_error() {
    let server = MockServer::start().await;
    let config = create_config(&server, test_credentials());
    let client = HttpClient::new(&config).unwrap();

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let request = MwsRequest::builder(
        HttpMethod::Post,
        &config.endpoint(ApiSection::Reports),
        "GetReport",
    )
    .build();
    let result = client
        .call_to_file(request, &CancellationToken::new(), &dir.path().join("r.tsv"))
        .await;

    assert!(matches!(result, Err(MwsError::Api(ref e)) if e.status == 404));
}
