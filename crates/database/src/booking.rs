//! Booking, editing and cancelling appointments.
//!
//! An appointment is identified by `(scheduled_at, barber_id)`. Every flow
//! here validates its input before touching the store and either completes
//! fully or leaves the store unchanged.

use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::info;

use crate::appointment;
use crate::clock::Clock;
use crate::error::DatabaseError;
use crate::models::{Appointment, AppointmentKey};
use crate::validation::{validate_booking_input, ValidationError};
use crate::Database;

/// Why a booking was rejected.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Appointment already exists for barber {barber_id} at {when}")]
    Conflict { barber_id: i64, when: NaiveDateTime },

    #[error(transparent)]
    Persistence(#[from] DatabaseError),
}

/// Why an edit was rejected.
#[derive(Debug, Error)]
pub enum EditError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Appointment not found: {0}")]
    NotFound(AppointmentKey),

    #[error("Appointment already exists for barber {barber_id} at {when}")]
    Conflict { barber_id: i64, when: NaiveDateTime },

    #[error(transparent)]
    Persistence(#[from] DatabaseError),
}

/// Why a cancellation was rejected.
#[derive(Debug, Error)]
pub enum DeleteError {
    #[error("Appointment not found: {0}")]
    NotFound(AppointmentKey),

    #[error(transparent)]
    Persistence(#[from] DatabaseError),
}

/// A customer's booking form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingRequest {
    pub name: String,
    pub phone: String,
    pub barber_id: Option<i64>,
    /// `yyyy-MM-dd HH:mm`
    pub date_time: String,
    pub comment: Option<String>,
}

/// An edit of an existing appointment. The barber stays the same.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    pub original: AppointmentKey,
    pub name: String,
    pub phone: String,
    /// `yyyy-MM-dd HH:mm`
    pub new_date_time: String,
    pub comment: Option<String>,
}

/// Fail with `Conflict` if the slot is already booked.
pub async fn check_conflict<'e, E>(executor: E, key: &AppointmentKey) -> Result<(), BookingError>
where
    E: sqlx::SqliteExecutor<'e>,
{
    if appointment::get_appointment(executor, key).await?.is_some() {
        return Err(BookingError::Conflict {
            barber_id: key.barber_id,
            when: key.scheduled_at,
        });
    }
    Ok(())
}

/// Book a new appointment.
pub async fn book(
    db: &Database,
    clock: &dyn Clock,
    request: &BookingRequest,
) -> Result<Appointment, BookingError> {
    let booking = validate_booking_input(
        &request.name,
        &request.phone,
        request.barber_id,
        &request.date_time,
        clock,
    )?;

    let new = Appointment {
        scheduled_at: booking.scheduled_at,
        barber_id: booking.barber_id,
        customer_name: booking.customer_name,
        customer_phone: booking.customer_phone,
        comment: normalize_comment(request.comment.as_deref()),
    };
    let key = new.key();

    check_conflict(db.pool(), &key).await?;
    insert_booking(db.pool(), &new).await?;

    info!(barber_id = key.barber_id, when = %key.scheduled_at, "Appointment booked");
    Ok(new)
}

/// Store a validated booking.
///
/// The primary key still guards against a concurrent booking that slipped
/// in after [`check_conflict`].
async fn insert_booking<'e, E>(executor: E, new: &Appointment) -> Result<(), BookingError>
where
    E: sqlx::SqliteExecutor<'e>,
{
    appointment::insert_appointment(executor, new)
        .await
        .map_err(|e| match e {
            DatabaseError::AlreadyExists { .. } => BookingError::Conflict {
                barber_id: new.barber_id,
                when: new.scheduled_at,
            },
            e if is_unknown_barber(&e) => BookingError::Validation(unknown_barber()),
            e => BookingError::Persistence(e),
        })
}

/// Edit an appointment: validate the new fields, then move it to its new
/// key.
pub async fn edit(
    db: &Database,
    clock: &dyn Clock,
    request: &EditRequest,
) -> Result<Appointment, EditError> {
    let booking = validate_booking_input(
        &request.name,
        &request.phone,
        Some(request.original.barber_id),
        &request.new_date_time,
        clock,
    )?;

    let updated = Appointment {
        scheduled_at: booking.scheduled_at,
        barber_id: booking.barber_id,
        customer_name: booking.customer_name,
        customer_phone: booking.customer_phone,
        comment: normalize_comment(request.comment.as_deref()),
    };

    rebind(db, &request.original, &updated).await
}

/// Replace the appointment at `original` with `updated`, which may live
/// under a different key.
///
/// The key is immutable, so this is a delete followed by an insert inside
/// one transaction: on any failure the original row stays in place.
pub async fn rebind(
    db: &Database,
    original: &AppointmentKey,
    updated: &Appointment,
) -> Result<Appointment, EditError> {
    let mut tx = db.pool().begin().await.map_err(DatabaseError::from)?;

    if appointment::get_appointment(&mut *tx, original).await?.is_none() {
        return Err(EditError::NotFound(*original));
    }

    appointment::delete_appointment(&mut *tx, original).await?;

    let new_key = updated.key();
    let conflict = EditError::Conflict {
        barber_id: new_key.barber_id,
        when: new_key.scheduled_at,
    };

    if appointment::get_appointment(&mut *tx, &new_key).await?.is_some() {
        return Err(conflict);
    }

    match appointment::insert_appointment(&mut *tx, updated).await {
        Ok(()) => {}
        Err(DatabaseError::AlreadyExists { .. }) => return Err(conflict),
        Err(e) => return Err(e.into()),
    }

    tx.commit().await.map_err(DatabaseError::from)?;

    info!(
        barber_id = new_key.barber_id,
        from = %original.scheduled_at,
        to = %new_key.scheduled_at,
        "Appointment updated"
    );

    Ok(Appointment {
        scheduled_at: new_key.scheduled_at,
        ..updated.clone()
    })
}

/// Cancel an appointment.
pub async fn delete(db: &Database, key: &AppointmentKey) -> Result<(), DeleteError> {
    appointment::delete_appointment(db.pool(), key)
        .await
        .map_err(|e| match e {
            DatabaseError::NotFound { .. } => DeleteError::NotFound(*key),
            e => DeleteError::Persistence(e),
        })?;

    info!(barber_id = key.barber_id, when = %key.scheduled_at, "Appointment deleted");
    Ok(())
}

fn normalize_comment(comment: Option<&str>) -> Option<String> {
    comment
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

fn is_unknown_barber(err: &DatabaseError) -> bool {
    matches!(
        err,
        DatabaseError::Sqlx(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation()
    )
}

fn unknown_barber() -> ValidationError {
    ValidationError::InvalidFormat {
        field: "barberId",
        expected: "an existing barber",
    }
}
