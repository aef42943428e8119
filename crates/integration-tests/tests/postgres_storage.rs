//! Integration tests for the `PostgreSQL` repositories.
//!
//! These tests require:
//! - A running, disposable `PostgreSQL` database
//! - `CAFE_TEST_DATABASE_URL` pointing at it (tables are truncated!)
//!
//! Run with: cargo test -p cafe-finder-integration-tests -- --ignored

use std::time::Duration;

use secrecy::SecretString;
use tokio::sync::Mutex;
use url::Url;

use cafe_finder::db::{
    CAFES_NAME_KEY, CafeRepository, PgStorage, RepositoryError, Storage, USERS_EMAIL_KEY,
    UserRepository, create_pool,
};
use cafe_finder::models::{CafeFields, NewUser};
use cafe_finder_core::{CafeId, CafeName, CoffeeRating, Email, PowerRating, Role, WifiRating};

/// The tests share one schema, so they take turns.
static DB_LOCK: Mutex<()> = Mutex::const_new(());

/// Connect, migrate and empty both relations.
async fn fresh_storage() -> PgStorage {
    let url = std::env::var("CAFE_TEST_DATABASE_URL")
        .map(SecretString::from)
        .expect("CAFE_TEST_DATABASE_URL must point at a disposable database");
    let pool = create_pool(&url, Duration::from_secs(5))
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("../server/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    sqlx::query("TRUNCATE directory.users, directory.cafes RESTART IDENTITY")
        .execute(&pool)
        .await
        .expect("Failed to truncate tables");

    PgStorage::new(pool)
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        email: Email::parse(email).expect("valid email"),
        password_hash: "$argon2id$v=19$m=1024,t=1,p=1$c2FsdHNhbHQ$aGFzaGhhc2g".to_owned(),
        name: "Test".to_owned(),
    }
}

fn fields(name: &str) -> CafeFields {
    CafeFields {
        name: CafeName::parse(name).expect("valid name"),
        map_url: Url::parse("https://maps.example.com/cafe").expect("valid url"),
        street_intersection: "Main & 49th".to_owned(),
        opening_time: "8AM".to_owned(),
        closing_time: "5PM".to_owned(),
        coffee_rating: CoffeeRating::Four,
        wifi_rating: WifiRating::None,
        power_rating: PowerRating::Two,
    }
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_first_user_is_admin_then_members() {
    let _guard = DB_LOCK.lock().await;
    let users = fresh_storage().await.users();

    let first = users.create(&new_user("a@cafes.test")).await.expect("create");
    let second = users.create(&new_user("b@cafes.test")).await.expect("create");

    assert_eq!(first.role, Role::Admin);
    assert_eq!(second.role, Role::Member);
    assert!(first.id < second.id);
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_duplicate_email_maps_to_email_constraint() {
    let _guard = DB_LOCK.lock().await;
    let users = fresh_storage().await.users();

    users.create(&new_user("ada@cafes.test")).await.expect("create");
    let err = users
        .create(&new_user("ada@cafes.test"))
        .await
        .expect_err("duplicate email must fail");

    assert!(err.is_conflict_on(USERS_EMAIL_KEY), "{err:?}");

    // Emails are unique exactly as stored.
    users
        .create(&new_user("ADA@cafes.test"))
        .await
        .expect("different case is a different account");
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_racing_first_registration_retries_as_member() {
    let _guard = DB_LOCK.lock().await;
    let storage = fresh_storage().await;

    // An uncommitted admin row is invisible to the next insert's role check,
    // so that insert also claims admin and then waits on the single-admin index.
    let mut tx = storage.pool().begin().await.expect("begin");
    sqlx::query(
        "INSERT INTO directory.users (email, password_hash, name, role) \
         VALUES ('first@cafes.test', 'x', 'First', 'admin')",
    )
    .execute(&mut *tx)
    .await
    .expect("insert admin");

    let users = storage.users();
    let racer = tokio::spawn(async move { users.create(&new_user("second@cafes.test")).await });

    tokio::time::sleep(Duration::from_millis(200)).await;
    tx.commit().await.expect("commit");

    let second = racer.await.expect("task completes").expect("create");
    assert_eq!(second.role, Role::Member);

    let admins: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM directory.users WHERE role = 'admin'")
            .fetch_one(storage.pool())
            .await
            .expect("count");
    assert_eq!(admins, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "Requires running database"]
async fn test_concurrent_first_registrations_yield_one_admin() {
    let _guard = DB_LOCK.lock().await;
    let storage = fresh_storage().await;

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let users = storage.users();
            tokio::spawn(async move { users.create(&new_user(&format!("u{i}@cafes.test"))).await })
        })
        .collect();

    let mut admins = 0;
    for task in tasks {
        let user = task.await.expect("task completes").expect("create");
        if user.role == Role::Admin {
            admins += 1;
        }
    }
    assert_eq!(admins, 1);
}

// ============================================================================
// Cafes
// ============================================================================

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_duplicate_cafe_name_maps_to_name_constraint() {
    let _guard = DB_LOCK.lock().await;
    let cafes = fresh_storage().await.cafes();

    cafes.insert(&fields("Bean There")).await.expect("insert");
    let err = cafes
        .insert(&fields("bean there"))
        .await
        .expect_err("duplicate name must fail");

    assert!(err.is_conflict_on(CAFES_NAME_KEY), "{err:?}");
    assert_eq!(cafes.list().await.expect("list").len(), 1);
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_rename_into_existing_name_conflicts() {
    let _guard = DB_LOCK.lock().await;
    let cafes = fresh_storage().await.cafes();

    cafes.insert(&fields("Bean There")).await.expect("insert");
    let other = cafes.insert(&fields("Grind House")).await.expect("insert");

    let err = cafes
        .update(other.id, &fields("BEAN THERE"))
        .await
        .expect_err("rename must conflict");
    assert!(err.is_conflict_on(CAFES_NAME_KEY), "{err:?}");

    let unchanged = cafes.get(other.id).await.expect("get").expect("exists");
    assert_eq!(unchanged.name.as_str(), "Grind House");
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_update_keeping_own_name_succeeds() {
    let _guard = DB_LOCK.lock().await;
    let cafes = fresh_storage().await.cafes();

    let cafe = cafes.insert(&fields("Bean There")).await.expect("insert");
    let mut edited = fields("bean there");
    edited.closing_time = "9PM".to_owned();

    let updated = cafes.update(cafe.id, &edited).await.expect("update");
    assert_eq!(updated.id, cafe.id);
    assert_eq!(updated.name.as_str(), "Bean There");
    assert_eq!(updated.closing_time, "9PM");
    assert_eq!(updated.wifi_rating, WifiRating::None);
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_update_missing_cafe_is_not_found() {
    let _guard = DB_LOCK.lock().await;
    let cafes = fresh_storage().await.cafes();
    cafes.insert(&fields("Bean There")).await.expect("insert");

    let err = cafes
        .update(CafeId::new(999), &fields("Somewhere"))
        .await
        .expect_err("missing id");
    assert!(matches!(err, RepositoryError::NotFound), "{err:?}");
    assert_eq!(cafes.list().await.expect("list").len(), 1);
}

#[tokio::test]
#[ignore = "Requires running database"]
async fn test_list_order_and_delete() {
    let _guard = DB_LOCK.lock().await;
    let cafes = fresh_storage().await.cafes();

    let zebra = cafes.insert(&fields("Zebra Cafe")).await.expect("insert");
    let apple = cafes.insert(&fields("Apple Cafe")).await.expect("insert");

    let ids: Vec<_> = cafes
        .list()
        .await
        .expect("list")
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, [zebra.id, apple.id]);

    assert!(cafes.delete(zebra.id).await.expect("delete"));
    assert!(!cafes.delete(zebra.id).await.expect("delete again"));
    assert_eq!(
        cafes.find_by_name(&apple.name).await.expect("find").map(|c| c.id),
        Some(apple.id)
    );
}
