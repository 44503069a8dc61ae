//! Integration tests for the auth and current-user API.

#![allow(clippy::unwrap_used)]

use petcare_integration_tests::{TestContext, error_message};
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
async fn test_signup_login_logout_flow() {
    let ctx = TestContext::new().await;
    let client = ctx.client();

    let resp = client.signup("alice", "secret").await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["username"], "alice");
    assert!(body["id"].is_i64());

    let resp = client.get("/api/v1/users/me").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client.post_json("/api/v1/auth/logout", &json!({})).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = client.get("/api/v1/users/me").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(resp).await, "authentication required");

    let resp = client
        .post_json(
            "/api/v1/auth/login",
            &json!({ "username": "alice", "password": "secret" }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let me: Value = client.get("/api/v1/users/me").await.json().await.unwrap();
    assert_eq!(me["username"], "alice");
}

#[tokio::test]
async fn test_anonymous_api_requests_get_401() {
    let ctx = TestContext::new().await;
    let client = ctx.client();

    for path in [
        "/api/v1/users/me",
        "/api/v1/households",
        "/api/v1/households/1",
        "/api/v1/households/1/pets",
        "/api/v1/pets/1",
        "/api/v1/pets/1/entries",
        "/api/v1/entries/1",
    ] {
        let resp = client.get(path).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{path}");
        assert_eq!(error_message(resp).await, "authentication required", "{path}");
    }

    let writes = [
        ("/api/v1/households", json!({ "name": "Casa" })),
        ("/api/v1/households/join", json!({ "join_code": "ABC234" })),
        ("/api/v1/pets/1/entries", json!({ "content": "fed" })),
    ];
    for (path, body) in writes {
        let resp = client.post_json(path, &body).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{path}");
        assert_eq!(error_message(resp).await, "authentication required", "{path}");
    }

    let resp = client.delete("/api/v1/entries/1").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signup_validation_and_conflict() {
    let ctx = TestContext::new().await;
    let client = ctx.client();

    let resp = client
        .post_json("/api/v1/auth/signup", &json!({ "username": "alice" }))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(resp).await, "username and password required");

    // Malformed JSON is treated as an empty object
    let resp = client
        .http
        .post(client.url("/api/v1/auth/signup"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert_eq!(client.signup("alice", "secret").await.status(), StatusCode::CREATED);

    let other = ctx.client();
    let resp = other.signup("alice", "different").await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(error_message(resp).await, "username already taken");
}

#[tokio::test]
async fn test_login_with_bad_credentials() {
    let ctx = TestContext::new().await;
    ctx.signed_up("alice").await;
    let client = ctx.client();

    for (username, password) in [("alice", "wrong"), ("nobody", "secret")] {
        let resp = client
            .post_json(
                "/api/v1/auth/login",
                &json!({ "username": username, "password": password }),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_message(resp).await, "invalid credentials");
    }
}

#[tokio::test]
async fn test_rename_current_user() {
    let ctx = TestContext::new().await;
    let alice = ctx.signed_up("alice").await;
    ctx.signed_up("bob").await;

    let resp = alice
        .patch_json("/api/v1/users/me", &json!({ "username": "  " }))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = alice
        .patch_json("/api/v1/users/me", &json!({ "username": "bob" }))
        .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = alice
        .patch_json("/api/v1/users/me", &json!({ "username": "alicia" }))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let me: Value = alice.get("/api/v1/users/me").await.json().await.unwrap();
    assert_eq!(me["username"], "alicia");
}
