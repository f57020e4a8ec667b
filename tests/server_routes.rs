//! HTTP surface: routing, request binding and error rendering.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use helpers::*;
use posture_analyzer::error_handling::ErrorBody;
use posture_analyzer::models::{AnalysisReport, Protocol};
use posture_analyzer::server::HealthResponse;
use posture_analyzer::{router, AnalysisError, AppState, ErrorKind};
use tower::ServiceExt;

fn app(scanner: FixedScanner) -> axum::Router {
    let analyzer = analyzer(collaborators(Arc::new(scanner)));
    router(AppState::new(Arc::new(analyzer), Duration::from_secs(30)))
}

fn analyze(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/analysis/analyze")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn test_analyze_returns_report() {
    let scanner = FixedScanner::services(vec![service(
        443,
        Protocol::Tcp,
        "https",
        Some("nginx 1.25.3"),
    )]);
    let response = app(scanner)
        .oneshot(analyze(r#"{"query":"8.8.8.8","type":"ipv4"}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let report: AnalysisReport = json(response).await;
    assert_eq!(report.ip, "8.8.8.8");
    assert_eq!(report.services.len(), 1);
    assert_eq!(report.security_score, 100);
}

#[tokio::test]
async fn test_report_uses_wire_field_names() {
    let response = app(FixedScanner::services(vec![service(
        22,
        Protocol::Tcp,
        "ssh",
        None,
    )]))
    .oneshot(analyze(r#"{"query":"8.8.8.8","type":"ipv4"}"#))
    .await
    .expect("response");

    let body: serde_json::Value = json(response).await;
    assert_eq!(body["type"], "ipv4");
    assert_eq!(body["riskLevel"], "low");
    assert_eq!(body["services"][0]["service"], "ssh");
    assert_eq!(body["services"][0]["riskLevel"], "medium");
    assert_eq!(body["services"][0]["vulnerabilities"], serde_json::json!([]));
    assert_eq!(body["geolocation"]["countryCode"], "US");
    assert_eq!(body["reputation"][0]["source"], "nmap-nvd");
    assert!(body["reputation"][0]["lastChecked"].is_i64());
    assert_eq!(body["metadata"]["cached"], false);
    assert!(body["metadata"]["scanDuration"].is_u64());
}

#[tokio::test]
async fn test_malformed_json_is_invalid_input() {
    let response = app(FixedScanner::services(Vec::new()))
        .oneshot(analyze(r#"{"query": "8.8.8.8""#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = json(response).await;
    assert_eq!(body.code, "INVALID_INPUT");
    assert!(!body.suggested_action.is_empty());
}

#[tokio::test]
async fn test_unknown_type_is_invalid_input() {
    let response = app(FixedScanner::services(Vec::new()))
        .oneshot(analyze(r#"{"query":"8.8.8.8","type":"hostname"}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = json(response).await;
    assert_eq!(body.code, "INVALID_INPUT");
}

#[tokio::test]
async fn test_query_not_matching_type_is_invalid_input() {
    let response = app(FixedScanner::services(Vec::new()))
        .oneshot(analyze(r#"{"query":"example.com","type":"ipv6"}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_scanner_errors_map_to_status() {
    let cases = [
        (ErrorKind::ScannerPermissionDenied, StatusCode::FORBIDDEN),
        (ErrorKind::ScannerTimeout, StatusCode::GATEWAY_TIMEOUT),
        (ErrorKind::ScannerNotFound, StatusCode::INTERNAL_SERVER_ERROR),
        (ErrorKind::ScannerExecutionError, StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (kind, status) in cases {
        let scanner = FixedScanner::failing(AnalysisError::new(
            kind,
            "scanner failed",
            "detail that stays in the logs",
            "try again",
        ));
        let response = app(scanner)
            .oneshot(analyze(r#"{"query":"8.8.8.8","type":"ipv4"}"#))
            .await
            .expect("response");

        assert_eq!(response.status(), status, "{}", kind);
        let body: serde_json::Value = json(response).await;
        assert_eq!(body["code"], kind.code());
        assert_eq!(body["message"], "scanner failed");
        assert!(body.get("technicalDetail").is_none());
    }
}

#[tokio::test]
async fn test_health() {
    let response = app(FixedScanner::services(Vec::new()))
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let health: HealthResponse = json(response).await;
    assert_eq!(health.status, "ok");
    assert!(!health.geoip);
    assert!(health.geoip_version.is_none());
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}
