use sqlx::SqlitePool;

/// Helper to create an in-memory test database with migrations applied
pub async fn create_test_db() -> SqlitePool {
    // A single connection: every new connection to `sqlite::memory:` is a fresh database
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    // The path is relative to the crate root (ws-activity/migrations)
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}
