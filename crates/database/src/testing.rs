//! Shared helpers for the unit tests.

use chrono::NaiveDateTime;

use crate::barber;
use crate::models::NewBarber;
use crate::Database;

pub(crate) async fn test_db() -> Database {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    db.migrate().await.unwrap();
    db
}

pub(crate) async fn seed_barber(db: &Database, name: &str) -> i64 {
    let new = NewBarber {
        name: name.to_string(),
        photo: None,
        branch: "Central".to_string(),
        information: String::new(),
    };
    barber::create_barber(db.pool(), &new).await.unwrap().id
}

/// Parse `yyyy-MM-dd HH:mm:ss`.
pub(crate) fn at(text: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").unwrap()
}
