//! Integration tests for fallbacks, health probes and response headers.

#![allow(clippy::unwrap_used)]

use petcare_integration_tests::{TestContext, error_message};
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let ctx = TestContext::new().await;
    let client = ctx.client();

    let resp = client.get("/api/v1/nope").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_message(resp).await, "Not Found");

    let resp = client.get("/definitely/not/here").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wrong_method_is_json_405() {
    let ctx = TestContext::new().await;
    let client = ctx.client();

    let resp = client.post_form("/logout", &[]).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(error_message(resp).await, "Method Not Allowed");

    let resp = client.delete("/api/v1/auth/login").await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_health_probes() {
    let ctx = TestContext::new().await;
    let client = ctx.client();

    for path in ["/health", "/api/health"] {
        let resp = client.get(path).await;
        assert_eq!(resp.status(), StatusCode::OK, "{path}");
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "ok");
    }

    let resp = client.get("/healthz").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");

    let resp = client.get("/health/ready").await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_metrics_count_requests() {
    let ctx = TestContext::new().await;
    let client = ctx.client();

    client.get("/health").await;
    let resp = client.get("/metrics").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let text = resp.text().await.unwrap();
    assert!(text.contains(
        r#"petcare_request_total{endpoint="/health",method="GET",status="200"} 1"#
    ));
    assert!(text.contains("petcare_request_latency_seconds"));
    // The scrape itself is recorded after the response is rendered
    assert!(!text.contains(r#"endpoint="/metrics""#));

    let text = client.get("/metrics").await.text().await.unwrap();
    assert!(text.contains(
        r#"petcare_request_total{endpoint="/metrics",method="GET",status="200"} 1"#
    ));
}

#[tokio::test]
async fn test_request_id_is_echoed_or_generated() {
    let ctx = TestContext::new().await;
    let client = ctx.client();

    let resp = client
        .http
        .get(client.url("/healthz"))
        .header("x-request-id", "trace-123")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["x-request-id"], "trace-123");

    let resp = client.get("/healthz").await;
    let generated = resp.headers()["x-request-id"].to_str().unwrap();
    assert_eq!(generated.len(), 36);
}

#[tokio::test]
async fn test_security_headers() {
    let ctx = TestContext::new().await;
    let resp = ctx.client().get("/login").await;
    let headers = resp.headers();

    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["referrer-policy"], "same-origin");
    assert!(headers.contains_key("content-security-policy"));
}

#[tokio::test]
async fn test_static_assets_are_served() {
    let ctx = TestContext::new().await;
    let resp = ctx.client().get("/static/css/app.css").await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("--accent"));
}
