//! Database error types.

use thiserror::Error;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Record already exists
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },
}

impl DatabaseError {
    /// Convert a unique-constraint violation into `AlreadyExists`, passing
    /// every other error through.
    pub(crate) fn on_unique_violation(
        err: sqlx::Error,
        entity: &'static str,
        id: impl Into<String>,
    ) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity,
                    id: id.into(),
                };
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
