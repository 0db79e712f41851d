//! Appointment edits and cancellations from the dashboard.

use axum::extract::State;
use axum::response::Redirect;
use axum::Form;
use database::{booking, AppointmentKey, EditRequest};
use serde::Deserialize;
use tracing::warn;

use crate::auth::AuthUser;
use crate::error::{Result, WebError};
use crate::routes::{
    normalize_date_input, parse_barber_id, parse_form_timestamp, redirect_error, redirect_success,
};
use crate::state::AppState;

const DASHBOARD: &str = "/dashboard";

/// Edit form posted from the dashboard.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditForm {
    pub original_date: String,
    pub barber_id: Option<String>,
    pub name: String,
    pub phone: String,
    pub new_date: String,
    pub comment: Option<String>,
}

/// Cancel form posted from the dashboard.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeleteForm {
    pub appointment_date: String,
    pub barber_id: Option<String>,
}

/// Edit an appointment and redirect back to the dashboard.
pub async fn edit(State(state): State<AppState>, user: AuthUser, Form(form): Form<EditForm>) -> Redirect {
    match edit_appointment(&state, &user, form).await {
        Ok(()) => redirect_success(DASHBOARD, "Appointment updated successfully!"),
        Err(e) => redirect_error(DASHBOARD, e),
    }
}

/// Cancel an appointment and redirect back to the dashboard.
pub async fn delete(State(state): State<AppState>, user: AuthUser, Form(form): Form<DeleteForm>) -> Redirect {
    match delete_appointment(&state, &user, form).await {
        Ok(()) => redirect_success(DASHBOARD, "Appointment deleted successfully!"),
        Err(e) => redirect_error(DASHBOARD, e),
    }
}

async fn edit_appointment(state: &AppState, user: &AuthUser, form: EditForm) -> Result<()> {
    let original = appointment_key(user, &form.original_date, form.barber_id.as_deref())?;

    let request = EditRequest {
        original,
        name: form.name,
        phone: form.phone,
        new_date_time: normalize_date_input(&form.new_date),
        comment: form.comment,
    };
    booking::edit(&state.db, state.clock.as_ref(), &request).await?;
    Ok(())
}

async fn delete_appointment(state: &AppState, user: &AuthUser, form: DeleteForm) -> Result<()> {
    let key = appointment_key(user, &form.appointment_date, form.barber_id.as_deref())?;
    booking::delete(&state.db, &key).await?;
    Ok(())
}

/// Build the key of an appointment the user is allowed to manage.
fn appointment_key(user: &AuthUser, date: &str, barber_id: Option<&str>) -> Result<AppointmentKey> {
    let barber_id = parse_barber_id(barber_id)?;
    if !user.can_manage(barber_id) {
        warn!(username = %user.username, barber_id, "Rejected change to another barber's appointment");
        return Err(WebError::Forbidden);
    }
    Ok(AppointmentKey::new(parse_form_timestamp(date)?, barber_id))
}
