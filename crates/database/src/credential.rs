//! Login credentials, one per barber.

use sqlx::{SqliteExecutor, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::{Credential, NewCredential, Role};

const ENTITY: &str = "Credential";

/// Changes applied to a barber's credential by an admin edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialUpdate {
    /// New login email, if it changes.
    pub username: Option<String>,
    /// New password hash, if the password changes.
    pub password_hash: Option<String>,
    pub role: Role,
    pub enabled: bool,
}

/// Create the credential for a barber.
pub async fn create_credential<'e, E>(executor: E, barber_id: i64, login: &NewCredential) -> Result<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO credentials (username, password_hash, enabled, barber_id, role)
        VALUES (?, ?, 1, ?, ?)
        "#,
    )
    .bind(&login.username)
    .bind(&login.password_hash)
    .bind(barber_id)
    .bind(login.role)
    .execute(executor)
    .await
    .map_err(|e| DatabaseError::on_unique_violation(e, ENTITY, login.username.clone()))?;

    Ok(())
}

/// Get a credential by username.
pub async fn get_by_username(pool: &SqlitePool, username: &str) -> Result<Option<Credential>> {
    let record = sqlx::query_as::<_, Credential>(
        r#"
        SELECT username, password_hash, enabled, barber_id, role
        FROM credentials
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Get the credential bound to a barber.
pub async fn get_by_barber_id<'e, E>(executor: E, barber_id: i64) -> Result<Option<Credential>>
where
    E: SqliteExecutor<'e>,
{
    let record = sqlx::query_as::<_, Credential>(
        r#"
        SELECT username, password_hash, enabled, barber_id, role
        FROM credentials
        WHERE barber_id = ?
        "#,
    )
    .bind(barber_id)
    .fetch_optional(executor)
    .await?;

    Ok(record)
}

/// Change the role of an existing credential.
pub async fn set_role(pool: &SqlitePool, username: &str, role: Role) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE credentials
        SET role = ?
        WHERE username = ?
        "#,
    )
    .bind(role)
    .bind(username)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: ENTITY,
            id: username.to_string(),
        });
    }

    Ok(())
}

/// Apply an admin edit to a barber's credential.
pub async fn update_credential<'e, E>(
    executor: E,
    barber_id: i64,
    update: &CredentialUpdate,
) -> Result<()>
where
    E: SqliteExecutor<'e>,
{
    let id = update
        .username
        .clone()
        .unwrap_or_else(|| format!("barber {}", barber_id));

    let result = sqlx::query(
        r#"
        UPDATE credentials
        SET username = COALESCE(?, username),
            password_hash = COALESCE(?, password_hash),
            role = ?,
            enabled = ?
        WHERE barber_id = ?
        "#,
    )
    .bind(&update.username)
    .bind(&update.password_hash)
    .bind(update.role)
    .bind(update.enabled)
    .bind(barber_id)
    .execute(executor)
    .await
    .map_err(|e| DatabaseError::on_unique_violation(e, ENTITY, id))?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: ENTITY,
            id: format!("barber {}", barber_id),
        });
    }

    Ok(())
}

/// Count enabled admin credentials.
pub async fn count_admins(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM credentials
        WHERE role = 'ADMIN' AND enabled = 1
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}
