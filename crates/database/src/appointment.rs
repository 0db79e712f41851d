//! Appointment storage keyed by `(scheduled_at, barber_id)`.
//!
//! Single-statement helpers are generic over the executor so the booking
//! flows can run them inside a transaction.

use chrono::NaiveDateTime;
use sqlx::{SqliteExecutor, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::{ceil_to_seconds, Appointment, AppointmentKey};

const ENTITY: &str = "Appointment";

/// Get the appointment stored under a key.
pub async fn get_appointment<'e, E>(executor: E, key: &AppointmentKey) -> Result<Option<Appointment>>
where
    E: SqliteExecutor<'e>,
{
    let record = sqlx::query_as::<_, Appointment>(
        r#"
        SELECT scheduled_at, barber_id, customer_name, customer_phone, comment
        FROM appointments
        WHERE barber_id = ? AND scheduled_at = ?
        "#,
    )
    .bind(key.barber_id)
    .bind(key.scheduled_at)
    .fetch_optional(executor)
    .await?;

    Ok(record)
}

/// Insert a new appointment.
///
/// Fails with `AlreadyExists` when the key is taken.
pub async fn insert_appointment<'e, E>(executor: E, appointment: &Appointment) -> Result<()>
where
    E: SqliteExecutor<'e>,
{
    let key = appointment.key();
    sqlx::query(
        r#"
        INSERT INTO appointments (scheduled_at, barber_id, customer_name, customer_phone, comment)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(key.scheduled_at)
    .bind(key.barber_id)
    .bind(&appointment.customer_name)
    .bind(&appointment.customer_phone)
    .bind(&appointment.comment)
    .execute(executor)
    .await
    .map_err(|e| DatabaseError::on_unique_violation(e, ENTITY, key.to_string()))?;

    Ok(())
}

/// Delete the appointment stored under a key.
pub async fn delete_appointment<'e, E>(executor: E, key: &AppointmentKey) -> Result<()>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        DELETE FROM appointments
        WHERE barber_id = ? AND scheduled_at = ?
        "#,
    )
    .bind(key.barber_id)
    .bind(key.scheduled_at)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: ENTITY,
            id: key.to_string(),
        });
    }

    Ok(())
}

/// List a barber's appointments, earliest first.
pub async fn list_by_barber(pool: &SqlitePool, barber_id: i64) -> Result<Vec<Appointment>> {
    let rows = sqlx::query_as::<_, Appointment>(
        r#"
        SELECT scheduled_at, barber_id, customer_name, customer_phone, comment
        FROM appointments
        WHERE barber_id = ?
        ORDER BY scheduled_at
        "#,
    )
    .bind(barber_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// List every appointment, earliest first.
pub async fn list_appointments(pool: &SqlitePool) -> Result<Vec<Appointment>> {
    let rows = sqlx::query_as::<_, Appointment>(
        r#"
        SELECT scheduled_at, barber_id, customer_name, customer_phone, comment
        FROM appointments
        ORDER BY scheduled_at, barber_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Count stored appointments.
pub async fn count_appointments(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM appointments
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Delete every appointment scheduled strictly before `cutoff`.
///
/// Runs as a single statement, so readers never see a partial purge.
/// Stored instants are whole seconds, so a fractional cutoff is rounded up:
/// an appointment at second `S` is older than `S + 0.25s`.
pub async fn purge_older_than(pool: &SqlitePool, cutoff: NaiveDateTime) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM appointments
        WHERE scheduled_at < ?
        "#,
    )
    .bind(ceil_to_seconds(cutoff))
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
