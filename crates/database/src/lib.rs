//! SQLite persistence layer for the barbershop booking service.
//!
//! This crate stores barbers, their login credentials and their
//! appointments using SQLx with SQLite, and implements the booking rules:
//! an appointment is identified by `(scheduled_at, barber_id)`, input is
//! validated before anything is written, and a taken slot is rejected.
//!
//! # Example
//!
//! ```no_run
//! use database::{booking, Database, SystemClock};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:barbershop.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Book an appointment
//!     let request = booking::BookingRequest {
//!         name: "John Doe".to_string(),
//!         phone: "1234567890".to_string(),
//!         barber_id: Some(1),
//!         date_time: "2099-01-01 10:00".to_string(),
//!         comment: None,
//!     };
//!     booking::book(&db, &SystemClock, &request).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod appointment;
pub mod barber;
pub mod booking;
pub mod clock;
pub mod credential;
pub mod error;
pub mod models;
pub mod retention;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use booking::{BookingError, BookingRequest, DeleteError, EditError, EditRequest};
pub use clock::{Clock, FixedClock, SystemClock};
pub use credential::CredentialUpdate;
pub use error::{DatabaseError, Result};
pub use models::{
    Appointment, AppointmentKey, Barber, Credential, NewBarber, NewCredential, Role,
};
pub use validation::ValidationError;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 10;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/barbershop.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = database::Database::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    ///
    /// Foreign keys are enforced on every connection: appointments and
    /// credentials must point at an existing barber.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
