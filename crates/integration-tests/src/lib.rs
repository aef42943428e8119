//! Integration tests for Cafe Finder.
//!
//! Tests drive the real axum router with `tower::ServiceExt::oneshot`, backed
//! by in-memory repositories and a `tower_sessions::MemoryStore`, so they run
//! without a database.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cafe-finder-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `auth_flow` - Registration, login, logout
//! - `cafes_flow` - Listing, adding, editing, deleting cafes
//! - `sessions` - Cookie signing and secret rotation
//! - `concurrency` - Simultaneous writes against the uniqueness constraints

use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use cafe_finder::config::DirectoryConfig;
use cafe_finder::db::memory::MemoryStorage;
use cafe_finder::middleware::SESSION_COOKIE_NAME;
use cafe_finder::routes;
use cafe_finder::services::PasswordHasher;
use cafe_finder::state::AppState;

/// Session secret used by [`TestApp::new`].
pub const SECRET: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%";

/// A second valid secret, for rotation tests.
pub const OTHER_SECRET: &str = "Zq8#Lm2!Vx7@Rt4$Np1&Hk6*Gd3^Wf9%";

/// Password used by [`TestClient::register`].
pub const PASSWORD: &str = "espresso-42";

fn config(secret: &str) -> DirectoryConfig {
    DirectoryConfig {
        database_url: SecretString::from("postgres://unused@localhost/unused"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        session_secret: SecretString::from(secret),
        session_expiry: Duration::from_secs(24 * 60 * 60),
        db_statement_timeout: Duration::from_secs(5),
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// The application under test.
#[derive(Clone)]
pub struct TestApp {
    router: Router,
    storage: MemoryStorage,
    sessions: MemoryStore,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Fresh app with empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::build(MemoryStorage::new(), MemoryStore::default(), SECRET)
    }

    /// Same storage and session records as `self`, different signing secret.
    #[must_use]
    pub fn with_secret(&self, secret: &str) -> Self {
        Self::build(self.storage.clone(), self.sessions.clone(), secret)
    }

    /// Build an app over explicit storage, session store and secret.
    #[must_use]
    pub fn build(storage: MemoryStorage, sessions: MemoryStore, secret: &str) -> Self {
        let hasher = PasswordHasher::with_params(1024, 1, 1).expect("valid argon2 params");
        let state = AppState::new(config(secret), storage.clone(), hasher);

        Self {
            router: routes::app(state, sessions.clone()),
            storage,
            sessions,
        }
    }

    /// A new client with no cookie.
    #[must_use]
    pub fn client(&self) -> TestClient {
        TestClient {
            app: self.clone(),
            cookie: Arc::new(Mutex::new(None)),
        }
    }
}

/// A decoded response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    /// The `error` message of an error body.
    #[must_use]
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

/// A caller that keeps its session cookie between requests.
#[derive(Clone)]
pub struct TestClient {
    app: TestApp,
    cookie: Arc<Mutex<Option<String>>>,
}

impl TestClient {
    /// The session cookie (`name=value`) currently held, if any.
    #[must_use]
    pub fn cookie(&self) -> Option<String> {
        self.cookie.lock().expect("cookie lock").clone()
    }

    /// Replace the held cookie.
    pub fn set_cookie(&self, cookie: Option<String>) {
        *self.cookie.lock().expect("cookie lock") = cookie;
    }

    /// The same cookie, presented to a different app.
    #[must_use]
    pub fn against(&self, app: &TestApp) -> Self {
        Self {
            app: app.clone(),
            cookie: Arc::new(Mutex::new(self.cookie())),
        }
    }

    /// Send a request and decode the JSON response.
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(cookie) = self.cookie() {
            request = request.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => request.body(Body::empty()),
        }
        .expect("valid request");

        let response = self
            .app
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        for value in response.headers().get_all(header::SET_COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            let pair = value.split(';').next().unwrap_or_default().trim();
            if !pair.starts_with(&format!("{SESSION_COOKIE_NAME}=")) {
                continue;
            }
            let removed = value.contains("Max-Age=0") || pair.ends_with('=');
            self.set_cookie((!removed).then(|| pair.to_owned()));
        }

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None).await
    }

    /// Register (and thereby log in) with [`PASSWORD`].
    pub async fn register(&self, email: &str, name: &str) -> TestResponse {
        self.post(
            "/auth/register",
            json!({ "email": email, "password": PASSWORD, "name": name }),
        )
        .await
    }

    /// Log in with [`PASSWORD`].
    pub async fn login(&self, email: &str) -> TestResponse {
        self.post(
            "/auth/login",
            json!({ "email": email, "password": PASSWORD }),
        )
        .await
    }

    /// Add a cafe with default details.
    pub async fn add_cafe(&self, name: &str) -> TestResponse {
        self.post("/cafes", cafe_body(name)).await
    }
}

/// A complete cafe submission.
#[must_use]
pub fn cafe_body(name: &str) -> Value {
    json!({
        "name": name,
        "map_url": "https://maps.example.com/?q=bean+there",
        "street_intersection": "Main & 49th",
        "opening_time": "8AM",
        "closing_time": "5:30PM",
        "coffee_rating": "☕☕☕☕",
        "wifi_rating": "💪💪💪",
        "power_rating": "🔌🔌",
    })
}

/// An app with an administrator (registered first) and a member, each with
/// their own logged-in client.
pub async fn app_with_admin_and_member() -> (TestApp, TestClient, TestClient) {
    let app = TestApp::new();

    let admin = app.client();
    assert_eq!(
        admin.register("owner@cafes.test", "Owner").await.status,
        StatusCode::CREATED
    );

    let member = app.client();
    assert_eq!(
        member.register("guest@cafes.test", "Guest").await.status,
        StatusCode::CREATED
    );

    (app, admin, member)
}
