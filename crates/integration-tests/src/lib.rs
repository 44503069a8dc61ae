//! Integration tests for PetCare.
//!
//! Each test starts the full application (router, middleware and session
//! store) on an ephemeral port against a fresh in-memory SQLite database and
//! talks to it over HTTP with `reqwest`.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p petcare-integration-tests
//! ```

#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use reqwest::{Client, Response, StatusCode, redirect};
use serde_json::{Value, json};
use sqlx::SqlitePool;

use petcare_server::{build_app, config::PetcareConfig, db, state::AppState};

/// A running server and its database.
pub struct TestContext {
    pub base_url: String,
    pub pool: SqlitePool,
}

impl TestContext {
    /// Start a server on `127.0.0.1:0` backed by a fresh in-memory database.
    pub async fn new() -> Self {
        let config = PetcareConfig::new("sqlite::memory:");
        let pool = db::create_pool(&config.database_url)
            .await
            .expect("Failed to create database pool");
        db::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let state = AppState::new(config, pool.clone()).expect("Failed to create state");
        let app = build_app(state).await.expect("Failed to build app");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Test server failed");
        });

        Self {
            base_url: format!("http://{addr}"),
            pool,
        }
    }

    /// A client with its own cookie jar that does not follow redirects.
    #[must_use]
    pub fn client(&self) -> TestClient {
        let http = Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        TestClient {
            http,
            base_url: self.base_url.clone(),
        }
    }

    /// A client that has signed up (and is logged in) as `username`.
    pub async fn signed_up(&self, username: &str) -> TestClient {
        let client = self.client();
        let resp = client.signup(username, "secret").await;
        assert_eq!(resp.status(), StatusCode::CREATED, "signup {username}");
        client
    }

    /// Count rows in a table.
    pub async fn count(&self, table: &str) -> i64 {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await
            .expect("Failed to count rows");
        count
    }
}

/// HTTP client bound to a test server.
pub struct TestClient {
    pub http: Client,
    pub base_url: String,
}

impl TestClient {
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.http
            .get(self.url(path))
            .send()
            .await
            .expect("GET failed")
    }

    pub async fn delete(&self, path: &str) -> Response {
        self.http
            .delete(self.url(path))
            .send()
            .await
            .expect("DELETE failed")
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Response {
        self.http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("POST failed")
    }

    pub async fn patch_json(&self, path: &str, body: &Value) -> Response {
        self.http
            .patch(self.url(path))
            .json(body)
            .send()
            .await
            .expect("PATCH failed")
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.http
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST form failed")
    }

    pub async fn signup(&self, username: &str, password: &str) -> Response {
        self.post_json(
            "/api/v1/auth/signup",
            &json!({ "username": username, "password": password }),
        )
        .await
    }

    /// Create a household and return its JSON body.
    pub async fn create_household(&self, name: &str) -> Value {
        let resp = self
            .post_json("/api/v1/households", &json!({ "name": name }))
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        resp.json().await.expect("Invalid household JSON")
    }

    /// Add a pet to a household and return its JSON body.
    pub async fn create_pet(&self, household_id: i64, name: &str) -> Value {
        let resp = self
            .post_json(
                &format!("/api/v1/households/{household_id}/pets"),
                &json!({ "name": name }),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        resp.json().await.expect("Invalid pet JSON")
    }

    /// Add an entry to a pet and return its JSON body.
    pub async fn create_entry(&self, pet_id: i64, content: &str) -> Value {
        let resp = self
            .post_json(
                &format!("/api/v1/pets/{pet_id}/entries"),
                &json!({ "content": content }),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        resp.json().await.expect("Invalid entry JSON")
    }

    /// Join a household by code with a nickname.
    pub async fn join(&self, code: &str, nickname: &str) -> Response {
        self.post_json(
            "/api/v1/households/join",
            &json!({ "join_code": code, "nickname": nickname }),
        )
        .await
    }
}

/// Read an `{"error": ...}` body.
pub async fn error_message(resp: Response) -> String {
    let body: Value = resp.json().await.expect("Invalid error JSON");
    body["error"]
        .as_str()
        .expect("Missing error field")
        .to_string()
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location(resp: &Response) -> String {
    resp.headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Extract an integer id from a JSON body.
#[must_use]
pub fn id(value: &Value, field: &str) -> i64 {
    value[field].as_i64().expect("Missing integer id")
}
