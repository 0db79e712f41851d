//! Shared helpers for the handler tests.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::header::LOCATION;
use axum::response::IntoResponse;
use chrono::{NaiveDateTime, NaiveTime};
use database::{barber, Database, FixedClock, NewBarber, NewCredential, Role};

use crate::auth::{hash_password, AuthUser};
use crate::config::Config;
use crate::state::AppState;

/// "Now" for every handler test.
pub(crate) const NOW: &str = "2030-06-01 12:00:00";

pub(crate) fn at(text: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").unwrap()
}

pub(crate) async fn test_state() -> AppState {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    db.migrate().await.unwrap();

    let config = Config {
        addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        database_url: "sqlite::memory:".to_string(),
        upload_dir: std::env::temp_dir().join(format!("barbershop_web_{}", std::process::id())),
        branches: vec!["Central".to_string(), "North".to_string()],
        purge_at: NaiveTime::from_hms_opt(12, 30, 0).unwrap(),
        admin_user: "admin@shop.com".to_string(),
        admin_password: "letmein".to_string(),
    };

    AppState::new(db, config, Arc::new(FixedClock(at(NOW))))
}

pub(crate) async fn seed_barber(state: &AppState, name: &str) -> i64 {
    let new = NewBarber {
        name: name.to_string(),
        photo: None,
        branch: "Central".to_string(),
        information: String::new(),
    };
    barber::create_barber(state.db.pool(), &new).await.unwrap().id
}

/// Create a barber with a login and return the authenticated user.
pub(crate) async fn seed_user(state: &AppState, name: &str, username: &str, role: Role) -> AuthUser {
    let new = NewBarber {
        name: name.to_string(),
        photo: None,
        branch: "Central".to_string(),
        information: String::new(),
    };
    let login = NewCredential {
        username: username.to_string(),
        password_hash: hash_password("secret1").unwrap(),
        role,
    };
    let stored = barber::create_barber_with_credential(&state.db, &new, &login)
        .await
        .unwrap();

    AuthUser {
        username: username.to_string(),
        barber_id: stored.id,
        role,
    }
}

/// `Location` header of a redirect.
pub(crate) fn location(response: impl IntoResponse) -> String {
    response
        .into_response()
        .headers()
        .get(LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}
