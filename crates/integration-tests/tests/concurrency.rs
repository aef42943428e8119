//! Integration tests for simultaneous writes.
//!
//! Uniqueness is decided at the storage layer when the row is written, so
//! two callers racing for the same email or cafe name must produce exactly
//! one winner and one conflict.

use axum::http::StatusCode;

use cafe_finder_integration_tests::{TestApp, app_with_admin_and_member};

fn sorted(mut statuses: Vec<StatusCode>) -> Vec<StatusCode> {
    statuses.sort_by_key(StatusCode::as_u16);
    statuses
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_cafe_creates_one_wins() {
    let (app, admin, member) = app_with_admin_and_member().await;

    let a = tokio::spawn(async move { admin.add_cafe("Bean There").await.status });
    let b = tokio::spawn(async move { member.add_cafe("bean there").await.status });

    let statuses = vec![
        a.await.expect("task completes"),
        b.await.expect("task completes"),
    ];
    assert_eq!(
        sorted(statuses),
        [StatusCode::CREATED, StatusCode::CONFLICT]
    );

    let list = app.client().get("/cafes").await;
    assert_eq!(list.body.as_array().map(Vec::len), Some(1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_registrations_same_email() {
    let app = TestApp::new();
    let first = app.client();
    let second = app.client();

    let a = tokio::spawn(async move { first.register("ada@cafes.test", "Ada").await.status });
    let b = tokio::spawn(async move { second.register("ada@cafes.test", "Ada").await.status });

    let statuses = vec![
        a.await.expect("task completes"),
        b.await.expect("task completes"),
    ];
    assert_eq!(
        sorted(statuses),
        [StatusCode::CREATED, StatusCode::CONFLICT]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_first_registrations_yield_one_admin() {
    let app = TestApp::new();
    let first = app.client();
    let second = app.client();

    let a = tokio::spawn(async move { first.register("a@cafes.test", "A").await.body });
    let b = tokio::spawn(async move { second.register("b@cafes.test", "B").await.body });

    let bodies = [
        a.await.expect("task completes"),
        b.await.expect("task completes"),
    ];
    let admins = bodies.iter().filter(|b| b["role"] == "admin").count();
    let members = bodies.iter().filter(|b| b["role"] == "member").count();

    assert_eq!((admins, members), (1, 1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_renames_to_same_name() {
    let (app, admin, member) = app_with_admin_and_member().await;
    let x = member.add_cafe("Cafe X").await.body["id"].clone();
    let y = member.add_cafe("Cafe Y").await.body["id"].clone();

    let a = tokio::spawn(async move {
        admin
            .put(&format!("/cafes/{x}"), cafe_finder_integration_tests::cafe_body("Cafe Z"))
            .await
            .status
    });
    let b = tokio::spawn(async move {
        member
            .put(&format!("/cafes/{y}"), cafe_finder_integration_tests::cafe_body("cafe z"))
            .await
            .status
    });

    let statuses = vec![
        a.await.expect("task completes"),
        b.await.expect("task completes"),
    ];
    assert_eq!(sorted(statuses), [StatusCode::OK, StatusCode::CONFLICT]);

    let names: Vec<_> = app
        .client()
        .get("/cafes")
        .await
        .body
        .as_array()
        .map(|cafes| cafes.iter().map(|c| c["name"].clone()).collect())
        .unwrap_or_default();
    assert_eq!(names.iter().filter(|n| *n == "Cafe Z").count(), 1);
}
