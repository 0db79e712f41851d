//! Barbershop booking site.
//!
//! Serves the public booking page, the barber dashboard and the admin
//! console as server-rendered HTML, and purges old appointments daily.

mod auth;
mod config;
mod error;
mod routes;
mod scheduler;
mod seed;
mod state;
mod uploads;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use database::{Clock, Database, SystemClock};
use tower_http::services::ServeDir;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting barbershop web server");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    let default_branch = config.branches.first().cloned().unwrap_or_default();
    seed::seed_admin(&db, &config.admin_user, &config.admin_password, &default_branch).await?;

    // Daily purge of appointments past the retention window
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    scheduler::start_purge_task(db.clone(), clock.clone(), config.purge_at);

    // Build application state
    let addr = config.addr;
    let state = AppState::new(db, config, clock);

    // Build router
    let app = routes::router()
        .nest_service("/images/barber", ServeDir::new(state.photos.dir()))
        .nest_service("/static", ServeDir::new("static"))
        .with_state(state);

    // Start server
    info!(%addr, "Barbershop web server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
