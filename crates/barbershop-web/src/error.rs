//! Error types for the web interface.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use database::{BookingError, DatabaseError, DeleteError, EditError, ValidationError};
use thiserror::Error;

use crate::auth::AUTH_REALM;

/// Errors that can occur while handling a request.
#[derive(Debug, Error)]
pub enum WebError {
    /// Database error.
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Delete(#[from] DeleteError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Missing or wrong credentials.
    #[error("Authentication required")]
    Unauthorized,

    /// Logged in, but the role does not allow this.
    #[error("Access denied. Insufficient permissions.")]
    Forbidden,

    #[error("{0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WebError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::Database(err) => database_status(err),
            WebError::Booking(BookingError::Validation(_)) => StatusCode::BAD_REQUEST,
            WebError::Booking(BookingError::Conflict { .. }) => StatusCode::CONFLICT,
            WebError::Booking(BookingError::Persistence(err)) => database_status(err),
            WebError::Edit(EditError::Validation(_)) => StatusCode::BAD_REQUEST,
            WebError::Edit(EditError::NotFound(_)) => StatusCode::NOT_FOUND,
            WebError::Edit(EditError::Conflict { .. }) => StatusCode::CONFLICT,
            WebError::Edit(EditError::Persistence(err)) => database_status(err),
            WebError::Delete(DeleteError::NotFound(_)) => StatusCode::NOT_FOUND,
            WebError::Delete(DeleteError::Persistence(err)) => database_status(err),
            WebError::Validation(_) | WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WebError::Unauthorized => StatusCode::UNAUTHORIZED,
            WebError::Forbidden => StatusCode::FORBIDDEN,
            WebError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the user. Server-side failures are logged
    /// and replaced by a generic message.
    pub fn public_message(&self) -> String {
        if self.status().is_server_error() {
            tracing::error!("Request failed: {}", self);
            return "An unexpected error occurred. Please try again later.".to_string();
        }
        self.to_string()
    }
}

fn database_status(err: &DatabaseError) -> StatusCode {
    match err {
        DatabaseError::NotFound { .. } => StatusCode::NOT_FOUND,
        DatabaseError::AlreadyExists { .. } => StatusCode::CONFLICT,
        DatabaseError::Sqlx(_) | DatabaseError::Migration(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({
            "error": self.public_message()
        });

        if status == StatusCode::UNAUTHORIZED {
            let challenge = format!("Basic realm=\"{}\"", AUTH_REALM);
            return (status, [(header::WWW_AUTHENTICATE, challenge)], Json(body)).into_response();
        }

        (status, Json(body)).into_response()
    }
}

/// Result type for web handlers.
pub type Result<T> = std::result::Result<T, WebError>;

#[cfg(test)]
mod tests {
    use super::*;
    use database::AppointmentKey;

    #[test]
    fn test_status_mapping() {
        let conflict = WebError::from(BookingError::Conflict {
            barber_id: 1,
            when: chrono::NaiveDateTime::default(),
        });
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let invalid = WebError::from(BookingError::Validation(ValidationError::Required {
            field: "name",
        }));
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.public_message(), "name is required");

        let missing = WebError::from(DeleteError::NotFound(AppointmentKey::new(
            chrono::NaiveDateTime::default(),
            3,
        )));
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let broken = WebError::Internal("pool closed".to_string());
        assert_eq!(broken.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!broken.public_message().contains("pool"));
    }

    #[test]
    fn test_unauthorized_carries_challenge() {
        let response = WebError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let challenge = response.headers().get(header::WWW_AUTHENTICATE).unwrap();
        assert_eq!(challenge, "Basic realm=\"Barbershop\"");
    }
}
