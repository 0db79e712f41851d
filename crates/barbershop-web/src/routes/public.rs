//! Public booking page.

use askama::Template;
use axum::extract::{Query, State};
use axum::response::Redirect;
use axum::Form;
use database::{barber, booking, Barber, BookingRequest};
use serde::Deserialize;

use crate::error::Result;
use crate::routes::{normalize_date_input, parse_barber_id, redirect_error, redirect_success, Flash};
use crate::state::AppState;

/// Landing page template.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub barbers: Vec<Barber>,
    pub branches: Vec<String>,
    pub flash: Flash,
}

/// Customer booking form.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BookingForm {
    pub name: String,
    pub phone: String,
    /// `yyyy-MM-dd HH:mm` or a `datetime-local` value.
    pub date: String,
    pub message: Option<String>,
    pub barber: Option<String>,
}

/// Render the landing page with the barbers to choose from.
pub async fn index(State(state): State<AppState>, Query(flash): Query<Flash>) -> Result<IndexTemplate> {
    let barbers = barber::list_barbers(state.db.pool()).await?;
    Ok(IndexTemplate {
        barbers,
        branches: state.config.branches.clone(),
        flash,
    })
}

/// Book an appointment and redirect back to the landing page.
pub async fn book(State(state): State<AppState>, Form(form): Form<BookingForm>) -> Redirect {
    let barber_id = match parse_barber_id(form.barber.as_deref()) {
        Ok(id) => Some(id),
        Err(e) => return redirect_error("/", e),
    };

    let request = BookingRequest {
        name: form.name,
        phone: form.phone,
        barber_id,
        date_time: normalize_date_input(&form.date),
        comment: form.message,
    };

    match booking::book(&state.db, state.clock.as_ref(), &request).await {
        Ok(_) => redirect_success("/", "Appointment booked successfully!"),
        Err(e) => redirect_error("/", e),
    }
}
