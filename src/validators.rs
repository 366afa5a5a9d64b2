/// Input validators for request payloads
///
/// Run at the HTTP boundary before anything reaches the authority.
/// Lengths follow the column sizes of the `accounts` table.

use regex::Regex;
use lazy_static::lazy_static;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 100;
const MAX_EMPLOYEE_ID_LENGTH: usize = 50;
const MIN_PASSWORD_LENGTH: usize = 8;
// bcrypt ignores everything past 72 bytes
const MAX_PASSWORD_LENGTH: usize = 72;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$"
    ).unwrap();
}

/// Validates an email address and returns it trimmed
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email".to_string()));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email".to_string(), MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Validates an employee ID and returns it trimmed
pub fn is_valid_employee_id(employee_id: &str) -> Result<String, ValidationError> {
    let trimmed = employee_id.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("employeeId".to_string()));
    }

    if trimmed.len() > MAX_EMPLOYEE_ID_LENGTH {
        return Err(ValidationError::TooLong(
            "employeeId".to_string(),
            MAX_EMPLOYEE_ID_LENGTH,
        ));
    }

    if trimmed.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err(ValidationError::InvalidFormat("employeeId".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Validates a new password's length
pub fn is_valid_new_password(password: &str) -> Result<(), ValidationError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort(
            "password".to_string(),
            MIN_PASSWORD_LENGTH,
        ));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong(
            "password".to_string(),
            MAX_PASSWORD_LENGTH,
        ));
    }

    Ok(())
}

/// A presented login password only needs to be non-empty
pub fn is_present_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyField("password".to_string()));
    }
    Ok(())
}

/// Department ids start at 1; zero or below counts as no department, which
/// the registration policy then rejects for HOD and Employee accounts.
pub fn normalize_department_id(department_id: Option<i32>) -> Option<i32> {
    department_id.filter(|id| *id > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert!(is_valid_email("user@example.com").is_ok());
        assert!(is_valid_email("test.email@domain.co.uk").is_ok());
        assert!(is_valid_email("user+tag@example.com").is_ok());
        assert_eq!(is_valid_email("  hr@company.com ").unwrap(), "hr@company.com");
    }

    #[test]
    fn test_invalid_email_format() {
        assert!(is_valid_email("invalid").is_err());
        assert!(is_valid_email("user@").is_err());
        assert!(is_valid_email("@example.com").is_err());
        assert!(is_valid_email("user@@example.com").is_err());
        assert!(is_valid_email("user@localhost").is_err());
        assert!(is_valid_email("").is_err());
    }

    #[test]
    fn test_email_length_limit() {
        let too_long = format!("{}@example.com", "a".repeat(90));
        assert!(is_valid_email(&too_long).is_err());
    }

    #[test]
    fn test_employee_id() {
        assert_eq!(is_valid_employee_id(" EMP001 ").unwrap(), "EMP001");
        assert!(is_valid_employee_id("").is_err());
        assert!(is_valid_employee_id("EMP 001").is_err());
        assert!(is_valid_employee_id("EMP\0").is_err());
        assert!(is_valid_employee_id(&"E".repeat(51)).is_err());
    }

    #[test]
    fn test_new_password_length() {
        assert!(is_valid_new_password("password123").is_ok());
        assert!(is_valid_new_password("short").is_err());
        assert!(is_valid_new_password(&"a".repeat(73)).is_err());
        // the limit counts bytes: 36 two-byte chars fit, 37 do not
        assert!(is_valid_new_password(&"é".repeat(36)).is_ok());
        assert!(is_valid_new_password(&"é".repeat(37)).is_err());
    }

    #[test]
    fn test_login_password_presence() {
        assert!(is_present_password("x").is_ok());
        assert!(is_present_password("").is_err());
    }

    #[test]
    fn test_department_id() {
        assert_eq!(normalize_department_id(None), None);
        assert_eq!(normalize_department_id(Some(3)), Some(3));
        assert_eq!(normalize_department_id(Some(0)), None);
        assert_eq!(normalize_department_id(Some(-1)), None);
    }
}
