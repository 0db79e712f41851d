//! Application state shared across handlers.

use std::sync::Arc;

use database::{Clock, Database};

use crate::config::Config;
use crate::uploads::PhotoStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    pub config: Arc<Config>,
    /// Source of "now" for booking validation and the dashboard split.
    pub clock: Arc<dyn Clock>,
    /// Barber photo directory.
    pub photos: PhotoStore,
}

impl AppState {
    /// Create new application state.
    pub fn new(db: Database, config: Config, clock: Arc<dyn Clock>) -> Self {
        let photos = PhotoStore::new(config.upload_dir.clone());
        Self {
            db,
            config: Arc::new(config),
            clock,
            photos,
        }
    }
}
