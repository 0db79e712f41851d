//! Login and logout.
//!
//! Logins use HTTP Basic authentication, so "logging in" means answering
//! the browser's challenge and "logging out" means issuing a fresh one.

use askama::Template;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect};

use crate::auth::{AuthUser, AUTH_REALM};

/// Shown after logging out.
#[derive(Template)]
#[template(path = "logout.html")]
pub struct LogoutTemplate {
    pub login_url: &'static str,
}

/// Send the user to the page for their role.
pub async fn login(user: AuthUser) -> Redirect {
    tracing::info!(username = %user.username, role = %user.role, "Login");
    if user.is_admin() {
        Redirect::to("/admin")
    } else {
        Redirect::to("/dashboard")
    }
}

/// Make the browser forget its cached credentials.
pub async fn logout() -> impl IntoResponse {
    (
        StatusCode::UNAUTHORIZED,
        [(
            header::WWW_AUTHENTICATE,
            format!("Basic realm=\"{}\"", AUTH_REALM),
        )],
        LogoutTemplate {
            login_url: "/login",
        },
    )
}
