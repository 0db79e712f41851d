//! Admin console: barber management and per-barber appointment APIs.

use askama::Template;
use axum::body::Bytes;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::{Form, Json};
use database::validation::{
    validate_barber_id, validate_email, validate_length, validate_password, validate_required,
    MAX_NAME_LENGTH, MIN_NAME_LENGTH,
};
use database::{
    appointment, barber, booking, credential, Appointment, AppointmentKey, Barber, CredentialUpdate,
    DatabaseError, NewBarber, NewCredential, Role, ValidationError,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{hash_password, AdminUser};
use crate::config::Config;
use crate::error::{Result, WebError};
use crate::routes::dashboard::Section;
use crate::routes::{parse_form_timestamp, redirect_error, redirect_success, Flash};
use crate::state::AppState;

const ADMIN: &str = "/admin";

/// Admin page template.
#[derive(Template)]
#[template(path = "admin.html")]
pub struct AdminTemplate {
    pub username: String,
    pub barber: Barber,
    pub barbers: Vec<Barber>,
    pub branches: Vec<String>,
    /// The admin's own appointments, newest first.
    pub sections: Vec<Section>,
    pub flash: Flash,
}

/// An uploaded photo.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Fields of the add and edit barber forms.
#[derive(Debug, Default)]
pub struct BarberForm {
    pub name: String,
    pub branch: String,
    pub information: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub photo: Option<Upload>,
}

impl BarberForm {
    /// Read the form from a `multipart/form-data` body. Unknown fields are
    /// ignored and an empty file input counts as no photo.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut form = BarberForm::default();

        while let Some(field) = multipart.next_field().await.map_err(invalid_form)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == "barberPhoto" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(invalid_form)?;
                if !file_name.is_empty() && !bytes.is_empty() {
                    form.photo = Some(Upload { file_name, bytes });
                }
                continue;
            }

            let value = field.text().await.map_err(invalid_form)?;
            match name.as_str() {
                "barberName" => form.name = value,
                "barberBranch" => form.branch = value,
                "barberInformation" => form.information = value,
                "barberEmail" => form.email = value,
                "barberPassword" => form.password = value,
                "barberRole" => form.role = value,
                _ => {}
            }
        }

        Ok(form)
    }
}

fn invalid_form(err: axum::extract::multipart::MultipartError) -> WebError {
    WebError::BadRequest(format!("Invalid form data: {}", err))
}

/// Barber details for the edit dialog. Never carries the password hash.
#[derive(Debug, Serialize)]
pub struct BarberDetails {
    pub id: i64,
    pub name: String,
    pub photo: Option<String>,
    pub branch: String,
    pub information: String,
    pub email: Option<String>,
    pub role: Option<Role>,
}

/// Body of the admin appointment delete call.
#[derive(Debug, Deserialize)]
pub struct DateForm {
    pub date: String,
}

/// Render the admin console.
pub async fn admin_page(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Query(flash): Query<Flash>,
) -> Result<AdminTemplate> {
    let pool = state.db.pool();
    let profile = barber::get_barber(pool, user.barber_id).await?;
    let barbers = barber::list_barbers(pool).await?;
    let mut appointments = appointment::list_by_barber(pool, user.barber_id).await?;
    appointments.reverse();

    Ok(AdminTemplate {
        username: user.username,
        barber: profile,
        barbers,
        branches: state.config.branches.clone(),
        sections: vec![Section::new("My appointments", &appointments)],
        flash,
    })
}

/// Add a barber with a login.
pub async fn create_barber(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    multipart: Multipart,
) -> Redirect {
    let result = match BarberForm::from_multipart(multipart).await {
        Ok(form) => add_barber(&state, form).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(_) => redirect_success(ADMIN, "Barber added successfully!"),
        Err(e) => redirect_error(ADMIN, e),
    }
}

/// Edit a barber's profile and login.
pub async fn update_barber(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Redirect {
    let result = match BarberForm::from_multipart(multipart).await {
        Ok(form) => edit_barber(&state, id, form).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(_) => redirect_success(ADMIN, "Barber updated successfully!"),
        Err(e) => redirect_error(ADMIN, e),
    }
}

/// Delete a barber with their login, appointments and photo.
pub async fn delete_barber(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<i64>,
) -> Redirect {
    match remove_barber(&state, id).await {
        Ok(()) => redirect_success(ADMIN, "Barber deleted successfully!"),
        Err(e) => redirect_error(ADMIN, e),
    }
}

/// Get a barber's details as JSON.
pub async fn barber_api(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<BarberDetails>> {
    let pool = state.db.pool();
    let profile = barber::get_barber(pool, id).await?;
    let login = credential::get_by_barber_id(pool, id).await?;

    Ok(Json(BarberDetails {
        id: profile.id,
        name: profile.name,
        photo: profile.photo,
        branch: profile.branch,
        information: profile.information,
        email: login.as_ref().map(|l| l.username.clone()),
        role: login.map(|l| l.role),
    }))
}

/// Get a barber's appointments as JSON, earliest first.
pub async fn barber_appointments_api(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Appointment>>> {
    let pool = state.db.pool();
    barber::get_barber(pool, id).await?;
    let appointments = appointment::list_by_barber(pool, id).await?;
    Ok(Json(appointments))
}

/// Cancel one of a barber's appointments.
pub async fn delete_appointment_api(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<i64>,
    Form(form): Form<DateForm>,
) -> Result<StatusCode> {
    let barber_id = validate_barber_id(Some(id))?;
    let key = AppointmentKey::new(parse_form_timestamp(&form.date)?, barber_id);
    booking::delete(&state.db, &key).await?;
    Ok(StatusCode::OK)
}

async fn add_barber(state: &AppState, form: BarberForm) -> Result<Barber> {
    let name = validate_required(&form.name, "name")?;
    let email = validate_required(&form.email, "email")?;
    validate_required(&form.password, "password")?;
    let branch = validate_required(&form.branch, "branch")?;
    validate_email(email)?;
    validate_length(name, "name", MIN_NAME_LENGTH, MAX_NAME_LENGTH)?;
    validate_password(&form.password)?;
    let branch = configured_branch(&state.config, branch)?;
    let role = parse_role(&form.role, Role::Barber)?;

    let password_hash = hash(&form.password)?;
    let photo = match &form.photo {
        Some(upload) => Some(state.photos.save(&upload.file_name, &upload.bytes).await?),
        None => None,
    };

    let profile = NewBarber {
        name: name.to_string(),
        photo: photo.clone(),
        branch,
        information: form.information.trim().to_string(),
    };
    let login = NewCredential {
        username: email.to_string(),
        password_hash,
        role,
    };

    match barber::create_barber_with_credential(&state.db, &profile, &login).await {
        Ok(stored) => Ok(stored),
        Err(e) => {
            if let Some(photo) = &photo {
                state.photos.remove(photo).await;
            }
            Err(e.into())
        }
    }
}

async fn edit_barber(state: &AppState, id: i64, form: BarberForm) -> Result<Barber> {
    let name = validate_required(&form.name, "name")?;
    let branch = validate_required(&form.branch, "branch")?;
    validate_length(name, "name", MIN_NAME_LENGTH, MAX_NAME_LENGTH)?;

    let email = Some(form.email.trim()).filter(|e| !e.is_empty());
    if let Some(email) = email {
        validate_email(email)?;
    }
    let password = Some(form.password.as_str()).filter(|p| !p.is_empty());
    if let Some(password) = password {
        validate_password(password)?;
    }
    let branch = configured_branch(&state.config, branch)?;

    let pool = state.db.pool();
    let mut profile = barber::get_barber(pool, id).await?;
    let login = credential::get_by_barber_id(pool, id)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "Credential",
            id: format!("barber {}", id),
        })?;

    let role = parse_role(&form.role, login.role)?;
    if login.role == Role::Admin && role != Role::Admin {
        ensure_other_admin(state).await?;
    }

    let update = CredentialUpdate {
        username: email.map(str::to_string),
        password_hash: password.map(hash).transpose()?,
        role,
        enabled: true,
    };

    let new_photo = match &form.photo {
        Some(upload) => Some(state.photos.save(&upload.file_name, &upload.bytes).await?),
        None => None,
    };
    let old_photo = match &new_photo {
        Some(photo) => profile.photo.replace(photo.clone()),
        None => None,
    };
    profile.name = name.to_string();
    profile.branch = branch;
    profile.information = form.information.trim().to_string();

    if let Err(e) = barber::update_barber_with_credential(&state.db, &profile, &update).await {
        if let Some(photo) = &new_photo {
            state.photos.remove(photo).await;
        }
        return Err(e.into());
    }

    if let Some(photo) = &old_photo {
        state.photos.remove(photo).await;
    }
    Ok(profile)
}

async fn remove_barber(state: &AppState, id: i64) -> Result<()> {
    let barber_id = validate_barber_id(Some(id))?;

    if let Some(login) = credential::get_by_barber_id(state.db.pool(), barber_id).await? {
        if login.role == Role::Admin && login.enabled {
            ensure_other_admin(state).await?;
        }
    }

    let removed = barber::delete_barber(&state.db, barber_id).await?;
    if let Some(photo) = &removed.photo {
        state.photos.remove(photo).await;
    }

    info!(barber_id, name = %removed.name, "Barber removed by admin");
    Ok(())
}

/// Refuse to demote or delete the only enabled admin.
async fn ensure_other_admin(state: &AppState) -> Result<()> {
    if credential::count_admins(state.db.pool()).await? <= 1 {
        return Err(WebError::BadRequest("Cannot remove the last admin".to_string()));
    }
    Ok(())
}

fn configured_branch(config: &Config, branch: &str) -> std::result::Result<String, ValidationError> {
    if !config.has_branch(branch) {
        return Err(ValidationError::InvalidFormat {
            field: "branch",
            expected: "one of the configured branches",
        });
    }
    Ok(branch.to_string())
}

/// Parse a role field, falling back to `default` when it is left blank.
fn parse_role(text: &str, default: Role) -> std::result::Result<Role, ValidationError> {
    if text.trim().is_empty() {
        return Ok(default);
    }
    text.parse().map_err(|_| ValidationError::InvalidFormat {
        field: "role",
        expected: "ADMIN or BARBER",
    })
}

fn hash(password: &str) -> Result<String> {
    hash_password(password).map_err(|e| WebError::Internal(format!("Failed to hash password: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{authenticate, AuthUser};
    use crate::testing::{at, seed_user, test_state};

    fn form(name: &str, email: &str) -> BarberForm {
        BarberForm {
            name: name.to_string(),
            branch: "North".to_string(),
            information: " Fades and beards ".to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
            role: String::new(),
            photo: None,
        }
    }

    fn photo(file_name: &str) -> Option<Upload> {
        Some(Upload {
            file_name: file_name.to_string(),
            bytes: Bytes::from_static(b"fake image"),
        })
    }

    fn photo_path(state: &AppState, photo: &str) -> std::path::PathBuf {
        state
            .photos
            .dir()
            .join(photo.trim_start_matches(crate::uploads::PHOTO_URL_PREFIX))
    }

    async fn admin(state: &AppState) -> AuthUser {
        seed_user(state, "Boss", "boss@shop.com", Role::Admin).await
    }

    #[tokio::test]
    async fn test_add_barber_with_photo() {
        let state = test_state().await;

        let mut new = form("Sam", "sam@shop.com");
        new.photo = photo("add_sam.png");
        let stored = add_barber(&state, new).await.unwrap();

        assert_eq!(stored.branch, "North");
        assert_eq!(stored.information, "Fades and beards");
        let photo = stored.photo.unwrap();
        assert!(photo_path(&state, &photo).exists());

        let user = authenticate(&state.db, "sam@shop.com", "secret1").await.unwrap().unwrap();
        assert_eq!(user.role, Role::Barber);
        assert_eq!(user.barber_id, stored.id);

        remove_barber(&state, stored.id).await.unwrap();
        assert!(!photo_path(&state, &photo).exists());
    }

    #[tokio::test]
    async fn test_add_barber_validation() {
        let state = test_state().await;

        let err = add_barber(&state, form("S", "sam@shop.com")).await.unwrap_err();
        assert!(matches!(err, WebError::Validation(ValidationError::Length { field: "name", .. })));

        let err = add_barber(&state, form("Sam", "not-an-email")).await.unwrap_err();
        assert!(matches!(err, WebError::Validation(ValidationError::InvalidEmail(_))));

        let mut short = form("Sam", "sam@shop.com");
        short.password = "abc".to_string();
        let err = add_barber(&state, short).await.unwrap_err();
        assert!(matches!(err, WebError::Validation(ValidationError::Length { field: "password", .. })));

        let mut elsewhere = form("Sam", "sam@shop.com");
        elsewhere.branch = "Mars".to_string();
        let err = add_barber(&state, elsewhere).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        assert_eq!(barber::count_barbers(state.db.pool()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_email_discards_photo() {
        let state = test_state().await;
        add_barber(&state, form("Sam", "sam@shop.com")).await.unwrap();

        let mut dup = form("Other Sam", "sam@shop.com");
        dup.photo = photo("dup_sam.png");
        let err = add_barber(&state, dup).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(barber::count_barbers(state.db.pool()).await.unwrap(), 1);

        let leftovers = std::fs::read_dir(state.photos.dir())
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_name().to_string_lossy().ends_with("_dup_sam.png"))
                    .count()
            })
            .unwrap_or(0);
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_edit_barber_login() {
        let state = test_state().await;
        let sam = add_barber(&state, form("Sam", "sam@shop.com")).await.unwrap();

        let mut edit = form("Samuel", "samuel@shop.com");
        edit.password = "newpass".to_string();
        edit.role = "admin".to_string();
        let updated = edit_barber(&state, sam.id, edit).await.unwrap();
        assert_eq!(updated.name, "Samuel");

        assert!(authenticate(&state.db, "sam@shop.com", "secret1").await.unwrap().is_none());
        let user = authenticate(&state.db, "samuel@shop.com", "newpass").await.unwrap().unwrap();
        assert!(user.is_admin());

        // Blank email and password keep the current login.
        let mut keep = form("Samuel", "");
        keep.password = String::new();
        edit_barber(&state, sam.id, keep).await.unwrap();
        assert!(authenticate(&state.db, "samuel@shop.com", "newpass").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_last_admin_is_protected() {
        let state = test_state().await;
        let boss = admin(&state).await;

        let mut demote = form("Boss", "");
        demote.password = String::new();
        demote.role = "BARBER".to_string();
        let err = edit_barber(&state, boss.barber_id, demote).await.unwrap_err();
        assert!(matches!(err, WebError::BadRequest(_)));

        let err = remove_barber(&state, boss.barber_id).await.unwrap_err();
        assert!(matches!(err, WebError::BadRequest(_)));
        assert_eq!(credential::count_admins(state.db.pool()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_barber_api_hides_hash() {
        let state = test_state().await;
        let boss = admin(&state).await;

        let Json(details) = barber_api(State(state.clone()), AdminUser(boss.clone()), Path(boss.barber_id))
            .await
            .unwrap();
        assert_eq!(details.email.as_deref(), Some("boss@shop.com"));
        assert_eq!(details.role, Some(Role::Admin));

        let json = serde_json::to_string(&details).unwrap();
        assert!(!json.contains("argon2"));

        let err = barber_api(State(state), AdminUser(boss), Path(999)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_appointment_apis() {
        let state = test_state().await;
        let boss = admin(&state).await;
        let sam = seed_user(&state, "Sam", "sam@shop.com", Role::Barber).await;

        let appt = Appointment {
            scheduled_at: at("2030-07-01 10:00:00"),
            barber_id: sam.barber_id,
            customer_name: "John Doe".to_string(),
            customer_phone: "1234567890".to_string(),
            comment: None,
        };
        appointment::insert_appointment(state.db.pool(), &appt).await.unwrap();

        let Json(listed) = barber_appointments_api(
            State(state.clone()),
            AdminUser(boss.clone()),
            Path(sam.barber_id),
        )
        .await
        .unwrap();
        assert_eq!(listed, vec![appt]);

        let status = delete_appointment_api(
            State(state.clone()),
            AdminUser(boss.clone()),
            Path(sam.barber_id),
            Form(DateForm {
                date: "2030-07-01 10:00:00.0".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::OK);

        let err = delete_appointment_api(
            State(state),
            AdminUser(boss),
            Path(sam.barber_id),
            Form(DateForm {
                date: "2030-07-01 10:00".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_page_lists_barbers() {
        let state = test_state().await;
        let boss = admin(&state).await;
        seed_user(&state, "Sam", "sam@shop.com", Role::Barber).await;

        let page = admin_page(State(state), AdminUser(boss), Query(Flash::default()))
            .await
            .unwrap();
        assert_eq!(page.barbers.len(), 2);
        let html = page.render().unwrap();
        assert!(html.contains("Sam"));
        assert!(html.contains("North"));
    }
}
