//! HTTP contract of the NVD client against a mock CVE API.

use std::sync::Arc;
use std::time::Duration;

use posture_analyzer::models::Severity;
use posture_analyzer::vuln::{NvdClient, VulnerabilitySource};
use posture_analyzer::SourceFailure;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const NGINX_CPE: &str = "cpe:2.3:a:nginx:nginx:1.18.0:*:*:*:*:*:*:*";

fn client(server: &MockServer) -> NvdClient {
    NvdClient::new(
        Arc::new(reqwest::Client::new()),
        format!("{}/rest/json/cves/2.0", server.uri()),
        Duration::from_secs(2),
    )
}

fn nginx_body() -> serde_json::Value {
    serde_json::json!({
        "resultsPerPage": 1,
        "startIndex": 0,
        "totalResults": 1,
        "vulnerabilities": [{
            "cve": {
                "id": "CVE-2021-23017",
                "descriptions": [
                    {"lang": "en", "value": "A security issue in nginx resolver."}
                ],
                "metrics": {
                    "cvssMetricV31": [{
                        "cvssData": {"baseScore": 5.6, "baseSeverity": "MEDIUM"}
                    }]
                },
                "references": [
                    {"url": "http://mailman.nginx.org/pipermail/nginx-announce/2021/000300.html"}
                ]
            }
        }]
    })
}

#[tokio::test]
async fn test_fetch_sends_cpe_query_and_parses_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/json/cves/2.0"))
        .and(query_param("cpeName", NGINX_CPE))
        .and(query_param("resultsPerPage", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(nginx_body()))
        .expect(1)
        .mount(&server)
        .await;

    let vulnerabilities = client(&server).fetch(NGINX_CPE).await.expect("success");
    assert_eq!(vulnerabilities.len(), 1);
    let cve = &vulnerabilities[0];
    assert_eq!(cve.id, "CVE-2021-23017");
    assert_eq!(cve.severity, Severity::Medium);
    assert_eq!(cve.cvss_score, 5.6);
    assert_eq!(cve.references.len(), 1);
    assert!(cve.remediation.contains("References:"));
}

#[tokio::test]
async fn test_api_key_header_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("apiKey", "secret-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(nginx_body()))
        .expect(1)
        .mount(&server)
        .await;

    let result = client(&server)
        .with_api_key(Some("secret-key".to_string()))
        .with_results_per_page(5)
        .fetch(NGINX_CPE)
        .await
        .expect("success");
    assert_eq!(result.len(), 1);
}

#[tokio::test]
async fn test_rate_limit_reports_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
        .mount(&server)
        .await;

    let failure = client(&server).fetch(NGINX_CPE).await.expect_err("rate limited");
    assert_eq!(
        failure,
        SourceFailure::RateLimited {
            retry_after_secs: Some(30)
        }
    );
}

#[tokio::test]
async fn test_service_unavailable_is_connection_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let failure = client(&server).fetch(NGINX_CPE).await.expect_err("unavailable");
    assert!(matches!(failure, SourceFailure::Connection(_)));
}

#[tokio::test]
async fn test_slow_response_is_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(nginx_body())
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = NvdClient::new(
        Arc::new(reqwest::Client::new()),
        server.uri(),
        Duration::from_millis(200),
    );
    let failure = client.fetch(NGINX_CPE).await.expect_err("too slow");
    assert_eq!(failure, SourceFailure::Timeout);
}

#[tokio::test]
async fn test_other_errors_mean_no_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("cpeName", "cpe:2.3:a:nginx:nginx:0.1:*:*:*:*:*:*:*"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("cpeName", NGINX_CPE))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let client = client(&server);
    assert!(client
        .fetch("cpe:2.3:a:nginx:nginx:0.1:*:*:*:*:*:*:*")
        .await
        .expect("404 is not a failure")
        .is_empty());
    assert!(client
        .fetch(NGINX_CPE)
        .await
        .expect("garbage is not a failure")
        .is_empty());
}

#[tokio::test]
async fn test_unreachable_host_is_connection_failure() {
    // Bind then drop to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);

    let client = NvdClient::new(
        Arc::new(reqwest::Client::new()),
        format!("http://127.0.0.1:{}", port),
        Duration::from_secs(2),
    );
    let failure = client.fetch(NGINX_CPE).await.expect_err("refused");
    assert!(matches!(failure, SourceFailure::Connection(_)));
}
