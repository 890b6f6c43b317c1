pub mod repositories;

/// Pool for the Postgres-backed tests, or `None` when `TEST_DATABASE_URL` is
/// unset so those tests skip themselves on machines without a database.
#[cfg(test)]
pub async fn create_test_pool() -> Option<crate::DbPool> {
    let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
        tracing::warn!("TEST_DATABASE_URL not set; skipping Postgres test");
        return None;
    };

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    // Initialize test schema
    crate::schema::initialize_database(&pool).await
        .expect("Failed to initialize test database schema");

    Some(pool)
}
