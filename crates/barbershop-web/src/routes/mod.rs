//! Route handlers for the booking site, dashboard and admin console.

pub mod admin;
pub mod appointments;
pub mod dashboard;
pub mod health;
pub mod public;
pub mod session;

use axum::extract::DefaultBodyLimit;
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::Router;
use chrono::NaiveDateTime;
use database::validation::{validate_barber_id, MAX_PHOTO_BYTES};
use database::ValidationError;
use serde::Deserialize;

use crate::error::WebError;
use crate::state::AppState;

/// Request bodies may carry a full-size photo plus the other form fields.
const MAX_BODY_BYTES: usize = MAX_PHOTO_BYTES as usize + 1024 * 1024;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Public pages
        .route("/", get(public::index))
        .route("/appointments/booking", post(public::book))
        .route("/login", get(session::login))
        .route("/logout", get(session::logout))
        // Barber dashboard
        .route("/dashboard", get(dashboard::dashboard_page))
        .route("/appointments/edit", post(appointments::edit))
        .route("/appointments/delete", post(appointments::delete))
        // Admin console
        .route("/admin", get(admin::admin_page))
        .route("/admin/barbers", post(admin::create_barber))
        .route("/admin/barbers/:id", post(admin::update_barber))
        .route("/admin/barbers/:id/delete", post(admin::delete_barber))
        // Admin API endpoints
        .route("/admin/api/barbers/:id", get(admin::barber_api))
        .route(
            "/admin/api/barbers/:id/appointments",
            get(admin::barber_appointments_api),
        )
        .route(
            "/admin/api/barbers/:id/appointments/delete",
            post(admin::delete_appointment_api),
        )
        // Health check
        .route("/health", get(health::health))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

/// Outcome of the previous form submission, carried in the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Flash {
    pub success: Option<String>,
    pub error: Option<String>,
}

/// Redirect to `path` with a success message.
pub(crate) fn redirect_success(path: &str, message: &str) -> Redirect {
    Redirect::to(&format!("{}?success={}", path, urlencoding::encode(message)))
}

/// Redirect to `path` with the user-facing text of `err`.
pub(crate) fn redirect_error(path: &str, err: impl Into<WebError>) -> Redirect {
    let message = err.into().public_message();
    Redirect::to(&format!("{}?error={}", path, urlencoding::encode(&message)))
}

/// Parse a stored appointment timestamp echoed back by a form.
///
/// Accepts `yyyy-MM-dd HH:mm:ss` (optionally with fractional seconds),
/// `yyyy-MM-dd HH:mm` and the `T`-separated variants browsers send.
pub(crate) fn parse_form_timestamp(text: &str) -> Result<NaiveDateTime, ValidationError> {
    let normalized = normalize_date_input(text);
    NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M"))
        .map_err(|_| ValidationError::InvalidDate(text.trim().to_string()))
}

/// Turn a `datetime-local` value (`2030-01-01T10:00`) into the booking
/// format (`2030-01-01 10:00`).
pub(crate) fn normalize_date_input(text: &str) -> String {
    text.trim().replacen('T', " ", 1)
}

/// Parse a barber id form field.
pub(crate) fn parse_barber_id(text: Option<&str>) -> Result<i64, ValidationError> {
    let id = match text.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => Some(t.parse::<i64>().map_err(|_| ValidationError::InvalidFormat {
            field: "barberId",
            expected: "positive number",
        })?),
        None => None,
    };
    validate_barber_id(id)
}
