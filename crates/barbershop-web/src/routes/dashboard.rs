//! Barber dashboard.

use askama::Template;
use axum::extract::{Query, State};
use chrono::{NaiveDateTime, NaiveTime};
use database::{appointment, barber, Appointment, Barber, Clock};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::error::Result;
use crate::routes::Flash;
use crate::state::AppState;

/// Most appointments shown per dashboard section.
pub const SECTION_LIMIT: usize = 10;

/// Dashboard page template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub username: String,
    pub is_admin: bool,
    pub barber: Barber,
    /// Today, upcoming and past, in that order.
    pub sections: Vec<Section>,
    pub flash: Flash,
}

/// A titled table of appointments.
#[derive(Debug, Clone)]
pub struct Section {
    pub title: &'static str,
    pub appointments: Vec<AppointmentView>,
}

impl Section {
    pub fn new(title: &'static str, appointments: &[Appointment]) -> Self {
        Self {
            title,
            appointments: appointments.iter().map(AppointmentView::from).collect(),
        }
    }
}

/// An appointment as rendered in tables and edit forms.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentView {
    pub barber_id: i64,
    /// Exact stored timestamp, echoed back to identify the appointment.
    pub key: String,
    /// Value for a `datetime-local` input.
    pub date_input: String,
    pub display: String,
    pub name: String,
    pub phone: String,
    pub comment: String,
}

impl From<&Appointment> for AppointmentView {
    fn from(appointment: &Appointment) -> Self {
        let at = appointment.scheduled_at;
        Self {
            barber_id: appointment.barber_id,
            key: at.format("%Y-%m-%d %H:%M:%S").to_string(),
            date_input: at.format("%Y-%m-%dT%H:%M").to_string(),
            display: at.format("%a %d %b %Y, %H:%M").to_string(),
            name: appointment.customer_name.clone(),
            phone: appointment.customer_phone.clone(),
            comment: appointment.comment.clone().unwrap_or_default(),
        }
    }
}

/// A barber's appointments relative to now.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Schedule {
    /// From now until midnight, earliest first.
    pub today: Vec<Appointment>,
    /// From tomorrow on, earliest first.
    pub upcoming: Vec<Appointment>,
    /// Before now, most recent first.
    pub past: Vec<Appointment>,
}

/// Split appointments into today, upcoming and past, keeping at most
/// [`SECTION_LIMIT`] in each.
pub fn split_schedule(mut appointments: Vec<Appointment>, now: NaiveDateTime) -> Schedule {
    appointments.sort_by_key(|a| a.scheduled_at);

    let end_of_day = now
        .date()
        .succ_opt()
        .map(|d| d.and_time(NaiveTime::MIN))
        .unwrap_or(NaiveDateTime::MAX);

    let mut schedule = Schedule::default();
    for appointment in appointments {
        if appointment.scheduled_at < now {
            schedule.past.push(appointment);
        } else if appointment.scheduled_at < end_of_day {
            schedule.today.push(appointment);
        } else {
            schedule.upcoming.push(appointment);
        }
    }

    schedule.past.reverse();
    schedule.today.truncate(SECTION_LIMIT);
    schedule.upcoming.truncate(SECTION_LIMIT);
    schedule.past.truncate(SECTION_LIMIT);
    schedule
}

/// Render the logged-in barber's dashboard.
pub async fn dashboard_page(
    State(state): State<AppState>,
    user: AuthUser,
    Query(flash): Query<Flash>,
) -> Result<DashboardTemplate> {
    let pool = state.db.pool();
    let profile = barber::get_barber(pool, user.barber_id).await?;
    let appointments = appointment::list_by_barber(pool, user.barber_id).await?;
    let schedule = split_schedule(appointments, state.clock.now());

    Ok(DashboardTemplate {
        is_admin: user.is_admin(),
        username: user.username,
        barber: profile,
        sections: vec![
            Section::new("Today", &schedule.today),
            Section::new("Upcoming", &schedule.upcoming),
            Section::new("Past", &schedule.past),
        ],
        flash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{at, seed_user, test_state, NOW};
    use database::Role;

    fn appt(when: &str) -> Appointment {
        Appointment {
            scheduled_at: at(when),
            barber_id: 1,
            customer_name: "John Doe".to_string(),
            customer_phone: "1234567890".to_string(),
            comment: None,
        }
    }

    #[test]
    fn test_split_schedule() {
        let schedule = split_schedule(
            vec![
                appt("2030-06-02 09:00:00"),
                appt("2030-06-01 12:00:00"),
                appt("2030-06-01 23:59:00"),
                appt("2030-05-30 10:00:00"),
                appt("2030-06-01 11:00:00"),
            ],
            at(NOW),
        );

        let times = |list: &[Appointment]| {
            list.iter()
                .map(|a| a.scheduled_at.format("%m-%d %H:%M").to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(times(&schedule.today), vec!["06-01 12:00", "06-01 23:59"]);
        assert_eq!(times(&schedule.upcoming), vec!["06-02 09:00"]);
        assert_eq!(times(&schedule.past), vec!["06-01 11:00", "05-30 10:00"]);
    }

    #[test]
    fn test_split_schedule_caps_sections() {
        let past = (1..=15)
            .map(|day| appt(&format!("2030-05-{:02} 10:00:00", day)))
            .collect();
        let schedule = split_schedule(past, at(NOW));

        assert_eq!(schedule.past.len(), SECTION_LIMIT);
        assert_eq!(schedule.past[0].scheduled_at, at("2030-05-15 10:00:00"));
    }

    #[test]
    fn test_view_formats() {
        let mut a = appt("2030-06-02 09:30:00");
        a.comment = Some("Fade".to_string());
        let view = AppointmentView::from(&a);
        assert_eq!(view.key, "2030-06-02 09:30:00");
        assert_eq!(view.date_input, "2030-06-02T09:30");
        assert_eq!(view.comment, "Fade");
    }

    #[tokio::test]
    async fn test_dashboard_shows_own_appointments() {
        let state = test_state().await;
        let sam = seed_user(&state, "Sam", "sam@shop.com", Role::Barber).await;
        let alex = seed_user(&state, "Alex", "alex@shop.com", Role::Barber).await;

        for (barber_id, name) in [(sam.barber_id, "Mine"), (alex.barber_id, "Theirs")] {
            let mut a = appt("2030-06-03 10:00:00");
            a.barber_id = barber_id;
            a.customer_name = name.to_string();
            appointment::insert_appointment(state.db.pool(), &a).await.unwrap();
        }

        let page = dashboard_page(State(state), sam, Query(Flash::default()))
            .await
            .unwrap();
        assert_eq!(page.barber.name, "Sam");
        let upcoming = &page.sections[1];
        assert_eq!(upcoming.title, "Upcoming");
        assert_eq!(upcoming.appointments.len(), 1);
        assert_eq!(upcoming.appointments[0].name, "Mine");
        assert!(page.render().unwrap().contains("Mine"));
    }
}
