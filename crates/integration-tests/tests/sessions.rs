//! Integration tests for session cookie integrity.
//!
//! Session records live server-side; the cookie only carries a signed
//! reference. A cookie that doesn't verify under the current secret is
//! treated as no cookie at all.

use axum::http::StatusCode;

use cafe_finder_integration_tests::{OTHER_SECRET, SECRET, TestApp};

#[tokio::test]
async fn test_session_survives_restart_with_same_secret() {
    let app = TestApp::new();
    let client = app.client();
    client.register("ada@cafes.test", "Ada").await;

    // Same storage, same session records, same secret: a restarted process.
    let restarted = app.with_secret(SECRET);
    let me = client.against(&restarted).get("/auth/me").await;

    assert_eq!(me.body["kind"], "authenticated");
}

#[tokio::test]
async fn test_rotated_secret_invalidates_cookie() {
    let app = TestApp::new();
    let client = app.client();
    client.register("ada@cafes.test", "Ada").await;

    let rotated = app.with_secret(OTHER_SECRET);
    let stale = client.against(&rotated);

    assert_eq!(stale.get("/auth/me").await.body["kind"], "anonymous");
    assert_eq!(
        stale.add_cafe("Bean There").await.status,
        StatusCode::UNAUTHORIZED
    );

    // Logging in again under the new secret works.
    assert_eq!(stale.login("ada@cafes.test").await.status, StatusCode::OK);
    assert_eq!(stale.get("/auth/me").await.body["kind"], "authenticated");
}

#[tokio::test]
async fn test_tampered_cookie_is_anonymous() {
    let app = TestApp::new();
    let client = app.client();
    client.register("ada@cafes.test", "Ada").await;

    let Some(cookie) = client.cookie() else {
        panic!("registration should set a session cookie");
    };
    let mut tampered = cookie.clone();
    let last = tampered.pop().map_or('A', |c| if c == 'A' { 'B' } else { 'A' });
    tampered.push(last);

    let forger = app.client();
    forger.set_cookie(Some(tampered));

    assert_eq!(forger.get("/auth/me").await.body["kind"], "anonymous");
}

#[tokio::test]
async fn test_rotated_secret_revokes_admin_privilege() {
    let app = TestApp::new();
    let admin = app.client();
    admin.register("owner@cafes.test", "Owner").await;
    let member = app.client();
    member.register("guest@cafes.test", "Guest").await;

    let id = member.add_cafe("Bean There").await.body["id"].clone();

    // The admin's cookie was signed under the old secret.
    let rotated = app.with_secret(OTHER_SECRET);
    let response = admin.against(&rotated).delete(&format!("/cafes/{id}")).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = admin.delete(&format!("/cafes/{id}")).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
}
