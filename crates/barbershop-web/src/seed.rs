//! First-run admin account.

use database::{barber, credential, Database, NewBarber, NewCredential, Role};
use tracing::info;

use crate::auth::hash_password;
use crate::error::{Result, WebError};

/// Create an admin barber with the given login when no enabled admin exists.
///
/// Returns `true` if an admin was created.
pub async fn seed_admin(db: &Database, username: &str, password: &str, branch: &str) -> Result<bool> {
    if credential::count_admins(db.pool()).await? > 0 {
        return Ok(false);
    }

    let password_hash = hash_password(password)
        .map_err(|e| WebError::Internal(format!("Failed to hash admin password: {}", e)))?;

    let profile = NewBarber {
        name: "Administrator".to_string(),
        photo: None,
        branch: branch.to_string(),
        information: String::new(),
    };
    let login = NewCredential {
        username: username.to_string(),
        password_hash,
        role: Role::Admin,
    };
    barber::create_barber_with_credential(db, &profile, &login).await?;

    info!(username, "Seeded admin account");
    Ok(true)
}
