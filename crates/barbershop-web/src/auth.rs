//! HTTP Basic authentication against the credentials table.
//!
//! The `Authorization` header is decoded by `axum_extra`'s typed headers.

use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Basic;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use database::{credential, Database, Role};
use rand_core::OsRng;

use crate::error::WebError;
use crate::state::AppState;

pub const AUTH_REALM: &str = "Barbershop";

/// A logged-in barber or admin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub username: String,
    pub barber_id: i64,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admins manage every barber's appointments, barbers only their own.
    pub fn can_manage(&self, barber_id: i64) -> bool {
        self.is_admin() || self.barber_id == barber_id
    }
}

/// A logged-in user with the `ADMIN` role.
#[derive(Clone, Debug)]
pub struct AdminUser(pub AuthUser);

pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(hash) => Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok(),
        Err(_) => false,
    }
}

/// Check a username and password against the stored credentials.
///
/// Disabled credentials never authenticate.
pub async fn authenticate(
    db: &Database,
    username: &str,
    password: &str,
) -> database::Result<Option<AuthUser>> {
    let Some(cred) = credential::get_by_username(db.pool(), username).await? else {
        return Ok(None);
    };

    if !cred.enabled || !verify_password(password, &cred.password_hash) {
        tracing::debug!(username, "Rejected login");
        return Ok(None);
    }

    Ok(Some(AuthUser {
        username: cred.username,
        barber_id: cred.barber_id,
        role: cred.role,
    }))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(basic)) =
            TypedHeader::<Authorization<Basic>>::from_request_parts(parts, state)
                .await
                .map_err(|_| WebError::Unauthorized)?;

        authenticate(&state.db, basic.username(), basic.password())
            .await?
            .ok_or(WebError::Unauthorized)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(WebError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}
