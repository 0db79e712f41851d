//! Barber CRUD operations.

use sqlx::{SqliteExecutor, SqlitePool};

use crate::credential::{self, CredentialUpdate};
use crate::error::{DatabaseError, Result};
use crate::models::{Barber, NewBarber, NewCredential};
use crate::Database;

const ENTITY: &str = "Barber";

/// Create a barber profile without a credential.
pub async fn create_barber<'e, E>(executor: E, barber: &NewBarber) -> Result<Barber>
where
    E: SqliteExecutor<'e>,
{
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO barbers (name, photo, branch, information)
        VALUES (?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&barber.name)
    .bind(&barber.photo)
    .bind(&barber.branch)
    .bind(&barber.information)
    .fetch_one(executor)
    .await?;

    Ok(Barber {
        id,
        name: barber.name.clone(),
        photo: barber.photo.clone(),
        branch: barber.branch.clone(),
        information: barber.information.clone(),
    })
}

/// Create a barber together with the credential they log in with.
///
/// Both rows are written in one transaction; a taken username leaves
/// neither behind.
pub async fn create_barber_with_credential(
    db: &Database,
    barber: &NewBarber,
    login: &NewCredential,
) -> Result<Barber> {
    let mut tx = db.pool().begin().await?;

    let stored = create_barber(&mut *tx, barber).await?;
    credential::create_credential(&mut *tx, stored.id, login).await?;

    tx.commit().await?;

    tracing::info!(barber_id = stored.id, username = %login.username, "Barber created");
    Ok(stored)
}

/// Get a barber by ID.
pub async fn get_barber<'e, E>(executor: E, id: i64) -> Result<Barber>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Barber>(
        r#"
        SELECT id, name, photo, branch, information
        FROM barbers
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: ENTITY,
        id: id.to_string(),
    })
}

/// List all barbers by name.
pub async fn list_barbers(pool: &SqlitePool) -> Result<Vec<Barber>> {
    let barbers = sqlx::query_as::<_, Barber>(
        r#"
        SELECT id, name, photo, branch, information
        FROM barbers
        ORDER BY name, id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(barbers)
}

/// Update an existing barber's profile.
pub async fn update_barber<'e, E>(executor: E, barber: &Barber) -> Result<()>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE barbers
        SET name = ?, photo = ?, branch = ?, information = ?
        WHERE id = ?
        "#,
    )
    .bind(&barber.name)
    .bind(&barber.photo)
    .bind(&barber.branch)
    .bind(&barber.information)
    .bind(barber.id)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: ENTITY,
            id: barber.id.to_string(),
        });
    }

    Ok(())
}

/// Save an edited barber profile and credential together.
pub async fn update_barber_with_credential(
    db: &Database,
    barber: &Barber,
    login: &CredentialUpdate,
) -> Result<()> {
    let mut tx = db.pool().begin().await?;

    update_barber(&mut *tx, barber).await?;
    credential::update_credential(&mut *tx, barber.id, login).await?;

    tx.commit().await?;

    tracing::info!(barber_id = barber.id, "Barber updated");
    Ok(())
}

/// Delete a barber, their credential and their appointments.
///
/// Returns the deleted profile so the caller can remove its photo.
pub async fn delete_barber(db: &Database, id: i64) -> Result<Barber> {
    let mut tx = db.pool().begin().await?;

    let barber = get_barber(&mut *tx, id).await?;

    sqlx::query(
        r#"
        DELETE FROM credentials
        WHERE barber_id = ?
        "#,
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        DELETE FROM barbers
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(barber_id = id, "Barber deleted");
    Ok(barber)
}

/// Count barbers.
pub async fn count_barbers(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM barbers
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}
