//! Input validation for bookings, barber profiles and credentials.

use std::fmt;

use chrono::NaiveDateTime;

use crate::clock::Clock;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Missing or blank value where one is required.
    Required { field: &'static str },
    /// Value length outside the allowed range.
    Length {
        field: &'static str,
        min: usize,
        max: usize,
        actual: usize,
    },
    /// Value does not have the expected shape.
    InvalidFormat {
        field: &'static str,
        expected: &'static str,
    },
    /// Invalid email format.
    InvalidEmail(String),
    /// Appointment date could not be parsed.
    InvalidDate(String),
    /// Appointment date is not in the future.
    PastDate(String),
    /// Rejected photo upload.
    InvalidUpload(String),
}

impl ValidationError {
    /// Name of the offending form field.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Required { field }
            | ValidationError::Length { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field,
            ValidationError::InvalidEmail(_) => "email",
            ValidationError::InvalidDate(_) | ValidationError::PastDate(_) => "date",
            ValidationError::InvalidUpload(_) => "photo",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Required { field } => write!(f, "{} is required", field),
            ValidationError::Length {
                field,
                min,
                max,
                actual,
            } => write!(
                f,
                "{} must be between {} and {} characters (got {})",
                field, min, max, actual
            ),
            ValidationError::InvalidFormat { field, expected } => {
                write!(f, "{} has an invalid format, expected {}", field, expected)
            }
            ValidationError::InvalidEmail(email) => write!(f, "Invalid email: {}", email),
            ValidationError::InvalidDate(text) => write!(f, "Invalid appointment date: {}", text),
            ValidationError::PastDate(text) => {
                write!(f, "Cannot book appointment in the past: {}", text)
            }
            ValidationError::InvalidUpload(msg) => write!(f, "Invalid photo upload: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Textual format of appointment dates in booking forms.
pub const APPOINTMENT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Customer and barber names.
pub const MIN_NAME_LENGTH: usize = 2;
pub const MAX_NAME_LENGTH: usize = 50;

/// Phone numbers, not counting a leading `+`.
pub const MIN_PHONE_LENGTH: usize = 8;
pub const MAX_PHONE_LENGTH: usize = 15;

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_PASSWORD_LENGTH: usize = 100;

/// Largest accepted photo upload (10 MiB).
pub const MAX_PHOTO_BYTES: u64 = 10 * 1024 * 1024;

const PHOTO_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// A booking request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedBooking {
    pub customer_name: String,
    pub customer_phone: String,
    pub barber_id: i64,
    pub scheduled_at: NaiveDateTime,
}

/// Validate the fields of a booking (or of an edit, which carries the same
/// fields). The first failing field wins, checked in the order name,
/// phone, barber, date.
pub fn validate_booking_input(
    name: &str,
    phone: &str,
    barber_id: Option<i64>,
    date_time_text: &str,
    clock: &dyn Clock,
) -> Result<ValidatedBooking, ValidationError> {
    let name = validate_required(name, "name")?;
    validate_length(name, "name", MIN_NAME_LENGTH, MAX_NAME_LENGTH)?;
    validate_phone_field(phone)?;
    let phone = phone.trim();
    let barber_id = validate_barber_id(barber_id)?;
    let scheduled_at = parse_appointment_date(date_time_text, clock.now())?;

    Ok(ValidatedBooking {
        customer_name: name.to_string(),
        customer_phone: phone.to_string(),
        barber_id,
        scheduled_at,
    })
}

/// Require a non-blank value and return it trimmed.
pub fn validate_required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(value)
}

/// Check a length in characters against an inclusive range.
pub fn validate_length(
    value: &str,
    field: &'static str,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual < min || actual > max {
        return Err(ValidationError::Length {
            field,
            min,
            max,
            actual,
        });
    }
    Ok(())
}

/// Required check on the trimmed value, format check on the value as
/// submitted: surrounding whitespace counts toward the length limit.
fn validate_phone_field(phone: &str) -> Result<(), ValidationError> {
    validate_required(phone, "phone")?;
    validate_phone(phone)
}

/// Validate a phone number: an optional leading `+` followed by 8 to 15
/// digits, whitespace, dashes or parentheses.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let invalid = ValidationError::InvalidFormat {
        field: "phone",
        expected: "8-15 digits, spaces, dashes or parentheses",
    };

    let body = phone.strip_prefix('+').unwrap_or(phone);
    let len = body.chars().count();
    if !(MIN_PHONE_LENGTH..=MAX_PHONE_LENGTH).contains(&len) {
        return Err(invalid);
    }

    let allowed = |c: char| c.is_ascii_digit() || " \t\n\x0B\x0C\r-()".contains(c);
    if !body.chars().all(allowed) {
        return Err(invalid);
    }

    Ok(())
}

/// Barber IDs must be present and positive.
pub fn validate_barber_id(barber_id: Option<i64>) -> Result<i64, ValidationError> {
    match barber_id {
        Some(id) if id > 0 => Ok(id),
        _ => Err(ValidationError::InvalidFormat {
            field: "barberId",
            expected: "positive number",
        }),
    }
}

/// Parse a `yyyy-MM-dd HH:mm` appointment date that must lie strictly
/// after `now`.
pub fn parse_appointment_date(
    text: &str,
    now: NaiveDateTime,
) -> Result<NaiveDateTime, ValidationError> {
    let at = NaiveDateTime::parse_from_str(text.trim(), APPOINTMENT_DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(text.to_string()))?;

    if at <= now {
        return Err(ValidationError::PastDate(text.to_string()));
    }

    Ok(at)
}

/// Validate an email address of the form `local@domain.tld`.
///
/// - local part: letters, digits and `+ _ . -`
/// - domain: letters, digits, `.` and `-`, ending in a dot and a
///   top-level label of at least two letters
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required { field: "email" });
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::InvalidEmail(email.to_string()));
    };

    let local_ok = !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "+_.-".contains(c));

    let domain_ok = match domain.rsplit_once('.') {
        Some((host, tld)) => {
            !host.is_empty()
                && host
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || ".-".contains(c))
                && tld.len() >= 2
                && tld.chars().all(|c| c.is_ascii_alphabetic())
        }
        None => false,
    };

    if !local_ok || !domain_ok {
        return Err(ValidationError::InvalidEmail(email.to_string()));
    }

    Ok(())
}

/// Passwords are checked for length only.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::Required { field: "password" });
    }
    validate_length(password, "password", MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH)
}

/// Validate an uploaded photo's name and size.
pub fn validate_photo_upload(file_name: &str, size: u64) -> Result<(), ValidationError> {
    let file_name = file_name.trim();

    if file_name.is_empty() {
        return Err(ValidationError::InvalidUpload("missing file name".to_string()));
    }

    if file_name.contains("..") || file_name.contains('/') || file_name.contains('\\') {
        return Err(ValidationError::InvalidUpload(format!(
            "invalid file name: {}",
            file_name
        )));
    }

    if size > MAX_PHOTO_BYTES {
        return Err(ValidationError::InvalidUpload(format!(
            "{} exceeds the maximum size of {} bytes",
            file_name, MAX_PHOTO_BYTES
        )));
    }

    let extension = file_name
        .rsplit_once('.')
        .filter(|(stem, _)| !stem.is_empty())
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    if !PHOTO_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ValidationError::InvalidUpload(format!(
            "{} is not a JPG, PNG or GIF image",
            file_name
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::NaiveDate;

    fn clock() -> FixedClock {
        FixedClock(
            NaiveDate::from_ymd_opt(2030, 6, 1)
                .unwrap()
                .and_hms_opt(9, 30, 15)
                .unwrap(),
        )
    }

    #[test]
    fn test_valid_booking() {
        let booking =
            validate_booking_input(" John Doe ", "1234567890", Some(1), "2099-01-01 10:00", &clock())
                .unwrap();
        assert_eq!(booking.customer_name, "John Doe");
        assert_eq!(booking.customer_phone, "1234567890");
        assert_eq!(booking.barber_id, 1);
        assert_eq!(
            booking.scheduled_at,
            NaiveDate::from_ymd_opt(2099, 1, 1).unwrap().and_hms_opt(10, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_name_rules() {
        let err = validate_booking_input("J", "1234567890", Some(1), "2099-01-01 10:00", &clock())
            .unwrap_err();
        assert_eq!(err.field(), "name");
        assert!(matches!(err, ValidationError::Length { actual: 1, .. }));

        let err = validate_booking_input("   ", "1234567890", Some(1), "2099-01-01 10:00", &clock())
            .unwrap_err();
        assert_eq!(err, ValidationError::Required { field: "name" });

        let long_name = "a".repeat(51);
        let err =
            validate_booking_input(&long_name, "1234567890", Some(1), "2099-01-01 10:00", &clock())
                .unwrap_err();
        assert_eq!(err.field(), "name");

        // Length counts characters, not bytes.
        assert!(validate_length("Žiga", "name", 2, 4).is_ok());
    }

    #[test]
    fn test_phone_rules() {
        assert!(validate_phone("1234567890").is_ok());
        assert!(validate_phone("+1 (555) 123-45").is_ok());
        assert!(validate_phone("12345678").is_ok());
        // The leading plus is not counted.
        assert!(validate_phone("+123456789012345").is_ok());

        assert!(validate_phone("1234567").is_err());
        assert!(validate_phone("1234567890123456").is_err());
        assert!(validate_phone("12345abc90").is_err());
        assert!(validate_phone("12+3456789").is_err());
        assert!(validate_phone("1234\x0B5678").is_ok());

        let err = validate_booking_input("John", "", Some(1), "2099-01-01 10:00", &clock())
            .unwrap_err();
        assert_eq!(err, ValidationError::Required { field: "phone" });

        // Surrounding whitespace counts toward the limit but is not stored.
        let booking =
            validate_booking_input("John", " 1234567890123 ", Some(1), "2099-01-01 10:00", &clock())
                .unwrap();
        assert_eq!(booking.customer_phone, "1234567890123");

        let err =
            validate_booking_input("John", "  12345678901234 ", Some(1), "2099-01-01 10:00", &clock())
                .unwrap_err();
        assert_eq!(err.field(), "phone");
    }

    #[test]
    fn test_barber_id_rules() {
        assert_eq!(validate_barber_id(Some(7)), Ok(7));
        for bad in [None, Some(0), Some(-3)] {
            let err = validate_barber_id(bad).unwrap_err();
            assert_eq!(err.field(), "barberId");
        }
    }

    #[test]
    fn test_date_rules() {
        let now = clock().0;

        assert!(matches!(
            parse_appointment_date("01/01/2099 10:00", now),
            Err(ValidationError::InvalidDate(_))
        ));
        assert!(matches!(
            parse_appointment_date("2099-01-01T10:00", now),
            Err(ValidationError::InvalidDate(_))
        ));
        assert!(matches!(
            parse_appointment_date("2099-13-01 10:00", now),
            Err(ValidationError::InvalidDate(_))
        ));
        assert!(matches!(
            parse_appointment_date("2020-01-01 10:00", now),
            Err(ValidationError::PastDate(_))
        ));
        // Still in the past: the clock is 15 seconds past 09:30.
        assert!(matches!(
            parse_appointment_date("2030-06-01 09:30", now),
            Err(ValidationError::PastDate(_))
        ));
        assert!(parse_appointment_date("2030-06-01 09:31", now).is_ok());

        let exactly_now = NaiveDate::from_ymd_opt(2030, 6, 1).unwrap().and_hms_opt(9, 31, 0).unwrap();
        assert!(matches!(
            parse_appointment_date("2030-06-01 09:31", exactly_now),
            Err(ValidationError::PastDate(_))
        ));
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("barber@shop.com").is_ok());
        assert!(validate_email("first.last+tag@mail.example.org").is_ok());

        assert!(matches!(validate_email(""), Err(ValidationError::Required { .. })));
        assert!(validate_email("barber.shop.com").is_err());
        assert!(validate_email("@shop.com").is_err());
        assert!(validate_email("barber@shop").is_err());
        assert!(validate_email("barber@shop.c").is_err());
        assert!(validate_email("barber@shop.c0m").is_err());
        assert!(validate_email("bar ber@shop.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret").is_ok());
        assert!(matches!(validate_password("12345"), Err(ValidationError::Length { .. })));
        assert!(matches!(validate_password(""), Err(ValidationError::Required { .. })));
    }

    #[test]
    fn test_validate_photo_upload() {
        assert!(validate_photo_upload("face.png", 1024).is_ok());
        assert!(validate_photo_upload("FACE.JPEG", 1024).is_ok());

        assert!(validate_photo_upload("", 10).is_err());
        assert!(validate_photo_upload("../etc/passwd.png", 10).is_err());
        assert!(validate_photo_upload("face.bmp", 10).is_err());
        assert!(validate_photo_upload(".png", 10).is_err());
        assert!(validate_photo_upload("face.png", MAX_PHOTO_BYTES + 1).is_err());
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::Length {
            field: "name",
            min: 2,
            max: 50,
            actual: 1,
        };
        assert_eq!(err.to_string(), "name must be between 2 and 50 characters (got 1)");

        let err = ValidationError::PastDate("2020-01-01 10:00".to_string());
        assert_eq!(
            err.to_string(),
            "Cannot book appointment in the past: 2020-01-01 10:00"
        );
    }
}
