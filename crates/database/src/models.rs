//! Database models.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Identity of an appointment: one barber can only be booked once per instant.
///
/// The timestamp is normalized to whole seconds so that keys built from
/// form input and keys read back from the store compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AppointmentKey {
    pub scheduled_at: NaiveDateTime,
    pub barber_id: i64,
}

impl AppointmentKey {
    pub fn new(scheduled_at: NaiveDateTime, barber_id: i64) -> Self {
        Self {
            scheduled_at: truncate_to_seconds(scheduled_at),
            barber_id,
        }
    }
}

impl fmt::Display for AppointmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "barber {} at {}",
            self.barber_id,
            self.scheduled_at.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

pub(crate) fn truncate_to_seconds(at: NaiveDateTime) -> NaiveDateTime {
    at.with_nanosecond(0).unwrap_or(at)
}

/// Smallest whole second not earlier than `at`.
pub(crate) fn ceil_to_seconds(at: NaiveDateTime) -> NaiveDateTime {
    if at.nanosecond() == 0 {
        at
    } else {
        truncate_to_seconds(at) + Duration::seconds(1)
    }
}

/// A booked appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Appointment {
    /// Booked instant (shop-local time).
    pub scheduled_at: NaiveDateTime,
    /// Barber the appointment is with.
    pub barber_id: i64,
    /// Customer's name.
    pub customer_name: String,
    /// Customer's phone number.
    pub customer_phone: String,
    /// Optional note left by the customer.
    pub comment: Option<String>,
}

impl Appointment {
    pub fn key(&self) -> AppointmentKey {
        AppointmentKey::new(self.scheduled_at, self.barber_id)
    }
}

/// A barber's public profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Barber {
    /// Store-assigned ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Photo path relative to the static root (e.g. "images/barber/1_a.png").
    pub photo: Option<String>,
    /// Branch the barber works at.
    pub branch: String,
    /// Free-text blurb.
    pub information: String,
}

/// Fields for a barber that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBarber {
    pub name: String,
    pub photo: Option<String>,
    pub branch: String,
    pub information: String,
}

/// Access level of a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Barber,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Barber => "BARBER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "BARBER" => Ok(Role::Barber),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Login identity of a barber.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Credential {
    /// Email address used to log in.
    pub username: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Disabled credentials cannot log in.
    pub enabled: bool,
    /// Barber this credential belongs to.
    pub barber_id: i64,
    /// Access level.
    pub role: Role,
}

/// Fields for a credential created together with its barber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCredential {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}
