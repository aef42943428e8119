//! Integration tests for registration, login and logout.

use axum::http::StatusCode;
use serde_json::json;

use cafe_finder_integration_tests::{PASSWORD, TestApp};

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
async fn test_register_logs_in() {
    let app = TestApp::new();
    let client = app.client();

    let response = client.register("ada@cafes.test", "Ada").await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["email"], "ada@cafes.test");
    assert_eq!(response.body["name"], "Ada");
    assert!(response.body.get("password_hash").is_none());
    assert!(client.cookie().is_some());

    let me = client.get("/auth/me").await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["kind"], "authenticated");
    assert_eq!(me.body["user"]["email"], "ada@cafes.test");
}

#[tokio::test]
async fn test_first_account_is_admin() {
    let app = TestApp::new();

    let first = app.client().register("first@cafes.test", "First").await;
    let second = app.client().register("second@cafes.test", "Second").await;

    assert_eq!(first.body["role"], "admin");
    assert_eq!(second.body["role"], "member");
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let app = TestApp::new();
    app.client().register("ada@cafes.test", "Ada").await;

    let again = app.client().register("ada@cafes.test", "Imposter").await;
    assert_eq!(again.status, StatusCode::CONFLICT);
    assert_eq!(
        again.error(),
        "This email already exists in our database. Please login"
    );

    // The first password still works; nothing was overwritten.
    let login = app.client().login("ada@cafes.test").await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.body["name"], "Ada");
}

#[tokio::test]
async fn test_register_validation_errors() {
    let app = TestApp::new();
    let client = app.client();

    let weak = client
        .post(
            "/auth/register",
            json!({ "email": "ada@cafes.test", "password": "short", "name": "Ada" }),
        )
        .await;
    assert_eq!(weak.status, StatusCode::BAD_REQUEST);

    let bad_email = client
        .post(
            "/auth/register",
            json!({ "email": "not-an-email", "password": PASSWORD, "name": "Ada" }),
        )
        .await;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);

    let blank_name = client
        .post(
            "/auth/register",
            json!({ "email": "ada@cafes.test", "password": PASSWORD, "name": "  " }),
        )
        .await;
    assert_eq!(blank_name.status, StatusCode::BAD_REQUEST);

    assert!(client.cookie().is_none());
}

// =============================================================================
// Login / Logout
// =============================================================================

#[tokio::test]
async fn test_login_wrong_password_and_unknown_email() {
    let app = TestApp::new();
    app.client().register("ada@cafes.test", "Ada").await;
    let client = app.client();

    let wrong = client
        .post(
            "/auth/login",
            json!({ "email": "ada@cafes.test", "password": "not-the-password" }),
        )
        .await;
    let unknown = client.login("nobody@cafes.test").await;

    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.error(), "Invalid email or password");
    assert_eq!(wrong.body, unknown.body);
    assert!(client.cookie().is_none());
}

#[tokio::test]
async fn test_login_is_case_sensitive_on_email() {
    let app = TestApp::new();
    app.client().register("ada@cafes.test", "Ada").await;

    let response = app.client().login("ADA@cafes.test").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_then_logout() {
    let app = TestApp::new();
    app.client().register("ada@cafes.test", "Ada").await;

    let client = app.client();
    let login = client.login("ada@cafes.test").await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(client.get("/auth/me").await.body["kind"], "authenticated");

    let logout = client.post("/auth/logout", json!({})).await;
    assert_eq!(logout.status, StatusCode::NO_CONTENT);

    let me = client.get("/auth/me").await;
    assert_eq!(me.body["kind"], "anonymous");
}

#[tokio::test]
async fn test_old_cookie_is_dead_after_logout() {
    let app = TestApp::new();
    let client = app.client();
    client.register("ada@cafes.test", "Ada").await;
    let stolen = client.cookie();

    client.post("/auth/logout", json!({})).await;

    let replay = app.client();
    replay.set_cookie(stolen);
    assert_eq!(replay.get("/auth/me").await.body["kind"], "anonymous");
}

#[tokio::test]
async fn test_logout_requires_session() {
    let app = TestApp::new();

    let response = app.client().post("/auth/logout", json!({})).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error(), "Login required");
}

#[tokio::test]
async fn test_login_rotates_session_cookie() {
    let app = TestApp::new();
    app.client().register("ada@cafes.test", "Ada").await;

    let client = app.client();
    client.login("ada@cafes.test").await;
    let first = client.cookie();

    client.login("ada@cafes.test").await;
    let second = client.cookie();

    assert!(first.is_some());
    assert_ne!(first, second);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new();
    let client = app.client();

    assert_eq!(client.get("/health").await.status, StatusCode::OK);
    assert_eq!(client.get("/health/ready").await.status, StatusCode::OK);
}
