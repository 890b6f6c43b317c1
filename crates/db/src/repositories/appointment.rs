use crate::models::{DbAppointment, DbAppointmentDetails};
use crate::repositories::{availability, is_unique_violation};
use pawbook_core::models::appointment::{AppointmentStatus, NewAppointment};
use eyre::Result;
use sqlx::{PgExecutor, Pool, Postgres};
use tracing::{debug, warn};
use uuid::Uuid;

const APPOINTMENT_COLUMNS: &str = "id, user_id, dog_id, service_id, date, time, status, created_at";

/// What a transactional cancel found and did.
#[derive(Debug, Clone)]
pub enum CancelRow {
    Cancelled(DbAppointment),
    AlreadyCancelled(DbAppointment),
}

pub async fn insert_appointment<'e>(
    executor: impl PgExecutor<'e>,
    new: &NewAppointment,
) -> Result<DbAppointment> {
    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        INSERT INTO appointments (user_id, dog_id, service_id, date, time, status)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {APPOINTMENT_COLUMNS}
        "#
    ))
    .bind(new.user_id)
    .bind(new.dog_id)
    .bind(new.service_id)
    .bind(new.date)
    .bind(new.time)
    .bind(AppointmentStatus::Upcoming.as_str())
    .fetch_one(executor)
    .await?;

    Ok(appointment)
}

pub async fn get_appointment_for_user<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<DbAppointment>> {
    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {APPOINTMENT_COLUMNS}
        FROM appointments
        WHERE id = $1 AND user_id = $2
        "#
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(executor)
    .await?;

    Ok(appointment)
}

async fn lock_appointment_for_user<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<DbAppointment>> {
    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {APPOINTMENT_COLUMNS}
        FROM appointments
        WHERE id = $1 AND user_id = $2
        FOR UPDATE
        "#
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(executor)
    .await?;

    Ok(appointment)
}

/// Claims the slot and inserts the appointment in one transaction.
/// `None` when the slot is missing, already taken, or an upcoming
/// appointment already occupies the pair.
pub async fn book_appointment(
    pool: &Pool<Postgres>,
    new: &NewAppointment,
) -> Result<Option<DbAppointment>> {
    let mut tx = pool.begin().await?;

    if availability::claim_slot(&mut *tx, new.date, new.time).await?.is_none() {
        debug!("Slot {} {} is not available", new.date, new.time);
        return Ok(None);
    }

    let appointment = match insert_appointment(&mut *tx, new).await {
        Ok(appointment) => appointment,
        Err(report) if is_unique_violation(&report) => {
            warn!(
                "Slot {} {} was free but an upcoming appointment already holds it",
                new.date, new.time
            );
            return Ok(None);
        }
        Err(report) => return Err(report),
    };

    tx.commit().await?;
    Ok(Some(appointment))
}

/// Marks the appointment cancelled and releases its slot in one transaction.
pub async fn cancel_appointment(
    pool: &Pool<Postgres>,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<CancelRow>> {
    let mut tx = pool.begin().await?;

    let Some(appointment) = lock_appointment_for_user(&mut *tx, id, user_id).await? else {
        return Ok(None);
    };
    if appointment.status == AppointmentStatus::Cancelled.as_str() {
        return Ok(Some(CancelRow::AlreadyCancelled(appointment)));
    }

    let cancelled = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        UPDATE appointments
        SET status = $2
        WHERE id = $1
        RETURNING {APPOINTMENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(AppointmentStatus::Cancelled.as_str())
    .fetch_one(&mut *tx)
    .await?;

    release_slot(&mut tx, &cancelled).await?;

    tx.commit().await?;
    Ok(Some(CancelRow::Cancelled(cancelled)))
}

/// Deletes the appointment in one transaction, releasing its slot when the
/// appointment was still upcoming.
pub async fn delete_appointment(
    pool: &Pool<Postgres>,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<DbAppointment>> {
    let mut tx = pool.begin().await?;

    let Some(appointment) = lock_appointment_for_user(&mut *tx, id, user_id).await? else {
        return Ok(None);
    };
    if appointment.status == AppointmentStatus::Upcoming.as_str() {
        release_slot(&mut tx, &appointment).await?;
    }

    sqlx::query(
        r#"
        DELETE FROM appointments
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Some(appointment))
}

async fn release_slot(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    appointment: &DbAppointment,
) -> Result<()> {
    let slot =
        availability::set_slot_available(&mut **tx, appointment.date, appointment.time, true)
            .await?;
    if slot.inserted {
        warn!(
            "Slot {} {} was missing while releasing appointment {}; recreated it",
            appointment.date, appointment.time, appointment.id
        );
    }
    Ok(())
}

pub async fn list_appointments_for_user(
    pool: &Pool<Postgres>,
    user_id: Uuid,
) -> Result<Vec<DbAppointmentDetails>> {
    let appointments = sqlx::query_as::<_, DbAppointmentDetails>(
        r#"
        SELECT a.id, a.user_id, a.dog_id, a.service_id, a.date, a.time, a.status,
               d.name AS dog_name, s.name AS service_name
        FROM appointments a
        JOIN dogs d ON d.id = a.dog_id
        JOIN services s ON s.id = a.service_id
        WHERE a.user_id = $1
        ORDER BY a.date ASC, a.time ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}
