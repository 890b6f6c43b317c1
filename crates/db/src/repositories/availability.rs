use crate::models::{DbSlot, DbSlotWrite};
use chrono::{NaiveDate, NaiveTime};
use eyre::Result;
use sqlx::{PgExecutor, Pool, Postgres};
use uuid::Uuid;

pub async fn slots_exist_on(pool: &Pool<Postgres>, date: NaiveDate) -> Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (SELECT 1 FROM availability WHERE date = $1)
        "#,
    )
    .bind(date)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

pub async fn insert_slots(
    pool: &Pool<Postgres>,
    date: NaiveDate,
    times: &[NaiveTime],
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        INSERT INTO availability (date, time_slot, is_available)
        SELECT $1, t, TRUE FROM UNNEST($2::time[]) AS t
        ON CONFLICT (date, time_slot) DO NOTHING
        "#,
    )
    .bind(date)
    .bind(times)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub async fn list_available(pool: &Pool<Postgres>, date: NaiveDate) -> Result<Vec<DbSlot>> {
    let slots = sqlx::query_as::<_, DbSlot>(
        r#"
        SELECT id, date, time_slot, is_available
        FROM availability
        WHERE date = $1 AND is_available
        ORDER BY time_slot ASC
        "#,
    )
    .bind(date)
    .fetch_all(pool)
    .await?;

    Ok(slots)
}

pub async fn find_slot(
    pool: &Pool<Postgres>,
    date: NaiveDate,
    time: NaiveTime,
) -> Result<Option<DbSlot>> {
    let slot = sqlx::query_as::<_, DbSlot>(
        r#"
        SELECT id, date, time_slot, is_available
        FROM availability
        WHERE date = $1 AND time_slot = $2
        "#,
    )
    .bind(date)
    .bind(time)
    .fetch_optional(pool)
    .await?;

    Ok(slot)
}

/// Flips an available slot to unavailable. Returns the slot id, or `None`
/// when the slot is missing or already taken. Concurrent claimers of the same
/// row are serialised by its row lock; the loser re-evaluates `is_available`
/// and matches nothing.
pub async fn claim_slot<'e>(
    executor: impl PgExecutor<'e>,
    date: NaiveDate,
    time: NaiveTime,
) -> Result<Option<Uuid>> {
    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        UPDATE availability
        SET is_available = FALSE
        WHERE date = $1 AND time_slot = $2 AND is_available
        RETURNING id
        "#,
    )
    .bind(date)
    .bind(time)
    .fetch_optional(executor)
    .await?;

    Ok(id)
}

/// Sets the availability flag, recreating the slot if its row is gone.
pub async fn set_slot_available<'e>(
    executor: impl PgExecutor<'e>,
    date: NaiveDate,
    time: NaiveTime,
    available: bool,
) -> Result<DbSlotWrite> {
    // xmax is zero only on a freshly inserted row version.
    let slot = sqlx::query_as::<_, DbSlotWrite>(
        r#"
        INSERT INTO availability (date, time_slot, is_available)
        VALUES ($1, $2, $3)
        ON CONFLICT (date, time_slot)
        DO UPDATE SET is_available = EXCLUDED.is_available
        RETURNING id, date, time_slot, is_available, (xmax = 0) AS inserted
        "#,
    )
    .bind(date)
    .bind(time)
    .bind(available)
    .fetch_one(executor)
    .await?;

    Ok(slot)
}
