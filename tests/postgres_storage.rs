//! Runs against a live database: `DATABASE_URL=... cargo test -- --ignored`.

use std::path::Path;

use taskhub::{
    config::DatabaseConfig,
    migrate::{self, MigrationMode},
    storage::{PgStorage, Storage, StorageError},
};

async fn storage() -> PgStorage {
    let cfg = DatabaseConfig {
        url: Some(std::env::var("DATABASE_URL").expect("DATABASE_URL must be set")),
        host: String::new(),
        port: 5432,
        user: String::new(),
        password: String::new(),
        name: String::new(),
        max_connections: 2,
    };
    let pool = PgStorage::connect(&cfg).await.unwrap();
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations");
    migrate::run(&pool, &dir, MigrationMode::Up).await.unwrap();
    PgStorage::new(pool)
}

fn unique_name(prefix: &str) -> String {
    format!("{prefix}-{}", &uuid::Uuid::new_v4().simple().to_string()[..12])
}

#[tokio::test]
#[ignore]
async fn users_and_tasks_round_trip() {
    let store = storage().await;
    store.ping().await.unwrap();

    let username = unique_name("pg");
    let user_id = store.save_user(&username, "hash-1").await.unwrap();
    assert!(store.username_exists(&username).await.unwrap());

    let user = store.get_user_by_username(&username).await.unwrap();
    assert_eq!(user.user_id, user_id);
    assert_eq!(user.password_hash, "hash-1");

    assert!(matches!(
        store.save_user(&username, "hash-2").await,
        Err(StorageError::DuplicateUsername)
    ));

    let first = store.save_task(user_id, "one").await.unwrap();
    let second = store.save_task(user_id, "two").await.unwrap();
    let tasks = store.get_tasks_by_user_id(user_id).await.unwrap();
    assert_eq!(
        tasks.iter().map(|t| t.task_id).collect::<Vec<_>>(),
        vec![first, second]
    );

    assert!(matches!(
        store.delete_user(user_id).await,
        Err(StorageError::ForeignKeyViolation)
    ));

    store.update_task_content(first, "uno").await.unwrap();
    assert_eq!(store.get_task_by_id(first).await.unwrap().task_content, "uno");

    store.delete_task(first).await.unwrap();
    store.delete_task(second).await.unwrap();
    store.delete_user(user_id).await.unwrap();

    assert!(matches!(
        store.get_user_by_id(user_id).await,
        Err(StorageError::UserNotFound)
    ));
}

#[tokio::test]
#[ignore]
async fn missing_rows_map_to_not_found() {
    let store = storage().await;
    let missing = i64::MAX;

    assert!(matches!(
        store.save_task(missing, "orphan").await,
        Err(StorageError::ForeignKeyViolation)
    ));
    assert!(matches!(
        store.get_tasks_by_user_id(missing).await,
        Err(StorageError::UserNotFound)
    ));
    assert!(matches!(
        store.update_task_content(missing, "x").await,
        Err(StorageError::TaskNotFound)
    ));
    assert!(matches!(
        store.delete_task(missing).await,
        Err(StorageError::TaskNotFound)
    ));
    assert!(matches!(
        store.update_user_password(missing, "h").await,
        Err(StorageError::UserNotFound)
    ));

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE user_id = $1")
        .bind(missing)
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(count, 0);
}
