use eyre::Result;
use pawbook_core::models::service::default_catalogue;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create users table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            full_name VARCHAR(255) NOT NULL,
            email VARCHAR(255) NOT NULL UNIQUE,
            password_hash VARCHAR(255) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create dogs table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS dogs (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id UUID NOT NULL REFERENCES users(id),
            name VARCHAR(255) NOT NULL,
            breed VARCHAR(255) NULL,
            age INTEGER NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create services table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS services (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(255) NOT NULL,
            description TEXT NULL,
            price DOUBLE PRECISION NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create availability table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS availability (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            date DATE NOT NULL,
            time_slot TIME NOT NULL,
            is_available BOOLEAN NOT NULL DEFAULT TRUE,
            CONSTRAINT uq_date_time_slot UNIQUE (date, time_slot)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create appointments table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS appointments (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id UUID NOT NULL REFERENCES users(id),
            dog_id UUID NOT NULL REFERENCES dogs(id),
            service_id UUID NOT NULL REFERENCES services(id),
            date DATE NOT NULL,
            time TIME NOT NULL,
            status VARCHAR(32) NOT NULL DEFAULT 'upcoming',
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_status CHECK (status IN ('upcoming', 'cancelled'))
        );
        "#,
    )
    .execute(pool)
    .await?;

    // At most one upcoming appointment per slot
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS uq_appointments_upcoming_slot
            ON appointments(date, time) WHERE status = 'upcoming';
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    for statement in [
        "CREATE INDEX IF NOT EXISTS idx_dogs_user_id ON dogs(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_appointments_user_id ON appointments(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_appointments_dog_id ON appointments(dog_id)",
        "CREATE INDEX IF NOT EXISTS idx_availability_date ON availability(date)",
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}

/// Inserts the default service catalogue when the table is empty.
pub async fn populate_services(pool: &Pool<Postgres>) -> Result<u64> {
    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM services")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        info!("Service catalogue already has {} entries. Skipping.", existing);
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    let mut inserted = 0;
    for service in default_catalogue() {
        inserted += sqlx::query(
            r#"
            INSERT INTO services (name, description, price)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&service.name)
        .bind(&service.description)
        .bind(service.price)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }
    tx.commit().await?;

    info!("Seeded {} services", inserted);
    Ok(inserted)
}
